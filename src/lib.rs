//! This crate provides an interface for talking to a RIMS (recirculating infusion mash system)
//! temperature controller: a PID loop driving a heating element.
//!
//! It supports `no_std` environments by use of the `no_std` feature flag.
//!
//! The controller exposes numbered 32-bit registers (system id, PID setpoint and gains, PID
//! mode, measured temperature, heater duty cycle, alarms). They are read and written with a
//! small ASCII protocol where every frame carries an additive checksum. Lost or corrupted
//! responses are retried up to three times before an error is returned.
//!
//! The layers, from the wire up:
//! * [`codec`] - frame encoding, decoding and checksums.
//! * [`channel`] - one exchange per call, with input flushing and retries.
//! * [`client`] - register reads and writes.
//! * [`rims`] - PID configuration, temperature and duty cycle in engineering units.
//!
//! The serial port used for controller comms should be configured like so:
//! * Baud rate: 57600
//! * Data bits: 8
//! * Stop bits: 1
//! * Parity: None
//! * Read timeout: 1 second

#![cfg_attr(feature = "no_std", no_std)]

pub mod channel;
pub mod client;
pub mod codec;
pub mod error;
pub mod register;
pub mod rims;
pub mod scaling;
pub mod transport;
pub mod types;

pub use rims::Rims;

#[cfg(test)]
mod mock_serial;
