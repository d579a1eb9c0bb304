//! Our error types for the RIMS controller link.

use thiserror::Error;

pub type Result<T, I> = core::result::Result<T, Error<I>>;

/// Problems found while decoding or encoding a single frame.
///
/// These never reach the caller of a register operation on their own: the channel
/// treats them as a failed attempt and retries.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    #[error("Frame too short ({length} bytes)")]
    FrameTooShort { length: usize },
    #[error("Checksum mismatch: computed {computed:#04X}, received {received:#04X}")]
    ChecksumMismatch { computed: u8, received: u8 },
    #[error("Checksum field is not two hex digits")]
    InvalidChecksumField,
    #[error("Frame does not fit the buffer")]
    FrameTooLong,
}

/// Why a single request/response attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptFailure {
    /// Nothing arrived before the read timeout.
    NoResponse,
    /// A line arrived but did not decode.
    Frame(FrameError),
}

impl core::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AttemptFailure::NoResponse => write!(f, "no response"),
            AttemptFailure::Frame(err) => write!(f, "{err}"),
        }
    }
}

impl From<FrameError> for AttemptFailure {
    fn from(err: FrameError) -> Self {
        AttemptFailure::Frame(err)
    }
}

/// Custom error type for RIMS controller communications.
///
/// Every protocol level variant names the register it concerns, so a caller running a
/// multi-register update can tell how far it got.
#[derive(Error, Debug)]
pub enum Error<I: embedded_io::Error> {
    #[error("Serial communication error")]
    Serial(I),
    #[error("No valid response for register {register:#04X} after {attempts} attempts ({last})")]
    CommunicationFailure {
        register: u8,
        attempts: u8,
        last: AttemptFailure,
    },
    #[error("Write to register {register:#04X} was not acknowledged")]
    WriteRejected { register: u8 },
    #[error("Response for register {register:#04X} is too short ({length} bytes)")]
    InvalidResponseLength { register: u8, length: usize },
    #[error("Invalid response type for register {register:#04X}")]
    InvalidResponseType { register: u8 },
    #[error("Value out of range for register {register:#04X}")]
    InvalidRange { register: u8 },
}

impl<I: embedded_io::Error> Error<I> {
    /// The register address this error concerns, if any.
    pub fn register(&self) -> Option<u8> {
        match *self {
            Error::Serial(_) => None,
            Error::CommunicationFailure { register, .. }
            | Error::WriteRejected { register }
            | Error::InvalidResponseLength { register, .. }
            | Error::InvalidResponseType { register }
            | Error::InvalidRange { register } => Some(register),
        }
    }
}
