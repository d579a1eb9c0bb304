use crate::{
    channel::LinkConfig,
    client::RegisterClient,
    error::{Error, Result},
    register::Register,
    scaling::FixedPoint,
    transport::Transport,
    types::{Alarms, NvCommand, PidConfig, PidUpdate, SystemId},
};

/// You can create a Rims using any interface which implements [`Transport`].
///
/// For its methods, "set" writes a configuration value and "get" reads a configuration
/// or measured value back. Every method blocks until the controller answered or the
/// retry budget of the channel is spent.
pub struct Rims<S: Transport, const L: usize = 64> {
    client: RegisterClient<S, L>,
}

impl<S: Transport, const L: usize> Rims<S, L> {
    /// Open the link on `interface`.
    pub fn open(interface: S, config: &LinkConfig) -> Result<Self, S::Error> {
        Ok(Self::new(RegisterClient::open(interface, config)?))
    }

    pub fn new(client: RegisterClient<S, L>) -> Self {
        Self { client }
    }

    /// Release the link and give the transport back.
    pub fn close(self) -> S {
        self.client.close()
    }

    /// Read the system identifier.
    pub fn get_system_id(&mut self) -> Result<SystemId, S::Error> {
        self.client.read_register(Register::SystemId).map(SystemId)
    }

    /// Read the raw firmware version word.
    pub fn get_firmware_version(&mut self) -> Result<u32, S::Error> {
        self.client.read_register(Register::FirmwareVersion)
    }

    /// Apply a partial PID configuration.
    ///
    /// Fields are written one register at a time in the order setpoint, Kp, Ki, Kd, mode.
    /// This is not atomic: if a write fails, the registers before it keep their new
    /// value, and [`Error::register`] on the returned error names the one that failed.
    /// Values out of Q16.16 range are refused before anything is written.
    pub fn set_pid_config(&mut self, update: PidUpdate) -> Result<(), S::Error> {
        if update.is_empty() {
            log::debug!("empty PID update, nothing to write");
            return Ok(());
        }
        let encoded = update.encode().map_err(|err| {
            log::warn!("{:?}: {}", err.register, err.source);
            Error::InvalidRange {
                register: err.register.into(),
            }
        })?;

        let fixed_writes = [
            (Register::PidSetpoint, encoded.setpoint),
            (Register::PidKp, encoded.kp),
            (Register::PidKi, encoded.ki),
            (Register::PidKd, encoded.kd),
        ];
        for (register, value) in fixed_writes {
            if let Some(value) = value {
                self.client.write_register(register, value.raw())?;
            }
        }
        if let Some(mode) = encoded.mode {
            self.client.write_register(Register::PidSetMode, mode)?;
        }
        Ok(())
    }

    /// Read setpoint, gains and set mode.
    pub fn get_pid_config(&mut self) -> Result<PidConfig, S::Error> {
        Ok(PidConfig {
            setpoint: self.read_fixed(Register::PidSetpoint)?,
            kp: self.read_fixed(Register::PidKp)?,
            ki: self.read_fixed(Register::PidKi)?,
            kd: self.read_fixed(Register::PidKd)?,
            mode: self.client.read_register(Register::PidSetMode)?,
        })
    }

    /// Read the mode the PID loop is currently running in.
    pub fn get_pid_operating_mode(&mut self) -> Result<u32, S::Error> {
        self.client.read_register(Register::PidOperatingMode)
    }

    /// Ask the controller to persist its PID configuration to EEPROM.
    pub fn save_config(&mut self) -> Result<(), S::Error> {
        self.write_nv_command(NvCommand::Save)
    }

    /// Ask the controller to restore its PID configuration from EEPROM.
    pub fn load_config(&mut self) -> Result<(), S::Error> {
        self.write_nv_command(NvCommand::Load)
    }

    /// Return the measured output temperature in degrees Celsius.
    pub fn get_temperature(&mut self) -> Result<FixedPoint, S::Error> {
        self.read_fixed(Register::OutputTemperature)
    }

    /// Return the heater PWM duty cycle.
    pub fn get_heater_duty_cycle(&mut self) -> Result<FixedPoint, S::Error> {
        self.read_fixed(Register::HeaterPwm)
    }

    pub fn get_alarms(&mut self) -> Result<Alarms, S::Error> {
        self.client.read_register(Register::Alarms).map(Alarms)
    }

    /// Read any register by address.
    pub fn read_register(&mut self, register: impl Into<u8>) -> Result<u32, S::Error> {
        self.client.read_register(register)
    }

    /// Write any register by address.
    pub fn write_register(&mut self, register: impl Into<u8>, value: u32) -> Result<(), S::Error> {
        self.client.write_register(register, value)
    }

    fn read_fixed(&mut self, register: Register) -> Result<FixedPoint, S::Error> {
        self.client
            .read_register(register)
            .map(FixedPoint::from_raw)
    }

    fn write_nv_command(&mut self, command: NvCommand) -> Result<(), S::Error> {
        self.client
            .write_register(Register::PidNvSettings, command.into())
    }
}
