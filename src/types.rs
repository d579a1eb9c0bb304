//! This module contains types for the values held in the controller registers.

use crate::scaling::{FixedPoint, RangeError};

/// The four character system identifier, packed most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemId(pub u32);

impl SystemId {
    /// The identifier as four ASCII bytes, first character first.
    pub fn as_ascii(&self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl core::fmt::Display for SystemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "0x{:08X} (", self.0)?;
        for byte in self.as_ascii() {
            let c = if byte.is_ascii_graphic() || byte == b' ' {
                byte as char
            } else {
                '.'
            };
            write!(f, "{c}")?;
        }
        write!(f, ")")
    }
}

/// Control codes for the non-volatile settings register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum NvCommand {
    /// Persist the active PID configuration to EEPROM.
    Save = 1,
    /// Restore the PID configuration from EEPROM.
    Load = 2,
}

impl From<NvCommand> for u32 {
    fn from(value: NvCommand) -> Self {
        value as u32
    }
}

/// Raw alarm flags.
// Bit assignments are firmware specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Alarms(pub u32);

impl Alarms {
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// True when no alarm is raised.
    pub fn is_clear(&self) -> bool {
        self.0 == 0
    }

    /// Whether alarm bit `bit` (0 - 31) is set.
    pub fn is_set(&self, bit: u8) -> bool {
        bit < 32 && self.0 & (1 << bit) != 0
    }
}

/// PID configuration as read back from the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PidConfig {
    /// Setpoint in degrees Celsius.
    pub setpoint: FixedPoint,
    pub kp: FixedPoint,
    pub ki: FixedPoint,
    pub kd: FixedPoint,
    /// Value of the PID set mode register.
    pub mode: u32,
}

/// A partial PID configuration update.
///
/// Only the fields that were set are written. A value of zero is a real value and is
/// written like any other.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PidUpdate {
    setpoint: Option<f64>,
    kp: Option<f64>,
    ki: Option<f64>,
    kd: Option<f64>,
    mode: Option<u32>,
}

/// An update with every present field already converted to its register word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct EncodedPidUpdate {
    pub setpoint: Option<FixedPoint>,
    pub kp: Option<FixedPoint>,
    pub ki: Option<FixedPoint>,
    pub kd: Option<FixedPoint>,
    pub mode: Option<u32>,
}

/// Which field of a [`PidUpdate`] could not be encoded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FieldRangeError {
    pub register: crate::register::Register,
    pub source: RangeError,
}

impl PidUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the setpoint in degrees Celsius.
    pub fn with_setpoint(mut self, celsius: f64) -> Self {
        self.setpoint = Some(celsius);
        self
    }

    pub fn with_kp(mut self, kp: f64) -> Self {
        self.kp = Some(kp);
        self
    }

    pub fn with_ki(mut self, ki: f64) -> Self {
        self.ki = Some(ki);
        self
    }

    pub fn with_kd(mut self, kd: f64) -> Self {
        self.kd = Some(kd);
        self
    }

    /// Set the raw PID set mode value.
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }

    /// True if no field is set, so applying it writes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn encode(&self) -> Result<EncodedPidUpdate, FieldRangeError> {
        use crate::register::Register as R;

        let field = |value: Option<f64>, register| {
            value
                .map(FixedPoint::from_f64)
                .transpose()
                .map_err(|source| FieldRangeError { register, source })
        };

        Ok(EncodedPidUpdate {
            setpoint: field(self.setpoint, R::PidSetpoint)?,
            kp: field(self.kp, R::PidKp)?,
            ki: field(self.ki, R::PidKi)?,
            kd: field(self.kd, R::PidKd)?,
            mode: self.mode,
        })
    }
}
