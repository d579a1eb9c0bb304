//! This module is used to define the registers on the RIMS controller.

use strum_macros::{EnumCount, EnumIter};

#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, EnumCount)]
#[repr(u8)]
pub enum Register {
    /// __R__ - System ID.
    ///
    /// Four ASCII characters packed most significant first. See [`SystemId`](crate::types::SystemId).
    SystemId = 0x00,
    /// __R__ - Firmware version.
    FirmwareVersion = 0x01,
    /// __R/W__ - PID setpoint.
    ///
    /// Value is Q16.16 degrees Celsius. E.g. 65.0 => `0x0041_0000`.
    PidSetpoint = 0x08,
    /// __R/W__ - Proportional gain, Q16.16.
    PidKp = 0x09,
    /// __R/W__ - Integral gain, Q16.16.
    PidKi = 0x0A,
    /// __R/W__ - Derivative gain, Q16.16.
    PidKd = 0x0B,
    /// __R/W__ - PID set mode.
    PidSetMode = 0x0C,
    /// __R__ - PID operating mode.
    PidOperatingMode = 0x0D,
    /// __W__ - PID non-volatile settings read/write control.
    ///
    /// See [`NvCommand`](crate::types::NvCommand) for the control codes.
    PidNvSettings = 0x0F,
    /// __R__ - Measured output temperature, Q16.16 degrees Celsius.
    OutputTemperature = 0x80,
    /// __R__ - Heater PWM duty cycle, Q16.16.
    HeaterPwm = 0x81,
    /// __R__ - Alarm flags.
    Alarms = 0x82,
}

impl From<Register> for u8 {
    fn from(value: Register) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for Register {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use Register as R;
        match value {
            0x00 => Ok(R::SystemId),
            0x01 => Ok(R::FirmwareVersion),
            0x08 => Ok(R::PidSetpoint),
            0x09 => Ok(R::PidKp),
            0x0A => Ok(R::PidKi),
            0x0B => Ok(R::PidKd),
            0x0C => Ok(R::PidSetMode),
            0x0D => Ok(R::PidOperatingMode),
            0x0F => Ok(R::PidNvSettings),
            0x80 => Ok(R::OutputTemperature),
            0x81 => Ok(R::HeaterPwm),
            0x82 => Ok(R::Alarms),
            other => Err(other),
        }
    }
}
