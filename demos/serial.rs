use std::{
    env, io,
    time::{Duration, Instant},
};

use fugit::MillisDurationU32;
use inquire::Confirm;
use rims_controller::{
    Rims,
    channel::LinkConfig,
    transport::{BAUD_RATE, READ_TIMEOUT, Transport},
    types::PidUpdate,
};
use serialport::{ClearBuffer, SerialPort};

// Configuration constants - adjust these for your setup
const SETPOINT_C: f64 = 66.5;
const KP: f64 = 8.0;

pub struct PortWrapper(Box<dyn SerialPort>);

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct IoError(#[from] std::io::Error);

impl From<serialport::Error> for IoError {
    fn from(err: serialport::Error) -> Self {
        IoError(err.into())
    }
}

impl embedded_io::Error for IoError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self.0.kind() {
            std::io::ErrorKind::TimedOut => embedded_io::ErrorKind::TimedOut,
            _ => embedded_io::ErrorKind::Other,
        }
    }
}

impl embedded_io::ErrorType for PortWrapper {
    type Error = IoError;
}

impl embedded_io::Read for PortWrapper {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(io::Read::read(&mut self.0, buf)?)
    }
}

impl embedded_io::Write for PortWrapper {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        Ok(io::Write::write(&mut self.0, buf)?)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(io::Write::flush(&mut self.0)?)
    }
}

impl Transport for PortWrapper {
    fn discard_input(&mut self) -> Result<(), Self::Error> {
        Ok(self.0.clear(ClearBuffer::Input)?)
    }

    fn set_read_timeout(&mut self, timeout: MillisDurationU32) -> Result<(), Self::Error> {
        Ok(self.0.set_timeout(to_duration(timeout))?)
    }

    fn read_line(
        &mut self,
        line: &mut [u8],
        timeout: MillisDurationU32,
    ) -> Result<usize, Self::Error> {
        let deadline = Instant::now() + to_duration(timeout);
        let mut length = 0;
        while length < line.len() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            self.0.set_timeout(remaining)?;
            match io::Read::read(&mut self.0, &mut line[length..=length]) {
                Ok(0) => break,
                Ok(_) => {
                    length += 1;
                    if line[length - 1] == b'\n' {
                        break;
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::TimedOut => break,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(length)
    }
}

fn to_duration(timeout: MillisDurationU32) -> Duration {
    Duration::from_millis(timeout.to_millis().into())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _log_handle = flexi_logger::Logger::try_with_env_or_str("info")?.start()?;

    let Some(port_name) = env::args().nth(1) else {
        eprintln!("Usage: serial <port>, e.g. /dev/ttyUSB0 or COM3");
        std::process::exit(1);
    };
    println!("Using port: {}", port_name);

    // Open serial port
    let port = serialport::new(&port_name, BAUD_RATE)
        .timeout(to_duration(READ_TIMEOUT))
        .open()?;

    let mut rims: Rims<PortWrapper> = Rims::open(PortWrapper(port), &LinkConfig::default())?;

    println!("System ID = {}", rims.get_system_id()?);
    println!("Firmware version: 0x{:08X}", rims.get_firmware_version()?);

    let config = rims.get_pid_config()?;
    println!("  SV = {:.2}", config.setpoint);
    println!("  Kp = {:.2}", config.kp);
    println!("  Ki = {:.2}", config.ki);
    println!("  Kd = {:.2}", config.kd);
    println!("Mode = {}", config.mode);

    println!("{:.2} degC", rims.get_temperature()?);
    println!("{:.1}%", rims.get_heater_duty_cycle()?);

    let alarms = rims.get_alarms()?;
    if !alarms.is_clear() {
        println!("Alarms: 0x{:08X}", alarms.bits());
    }

    // Change setpoint and Kp, leaving the other gains alone.
    rims.set_pid_config(PidUpdate::new().with_setpoint(SETPOINT_C).with_kp(KP))?;
    println!("Set SV = {SETPOINT_C}, Kp = {KP}");

    if Confirm::new("Save configuration to EEPROM?")
        .with_default(false)
        .prompt()?
    {
        rims.save_config()?;
        println!("Configuration saved");
    }

    Ok(())
}
