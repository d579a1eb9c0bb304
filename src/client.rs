//! Register reads and writes on top of the command channel.

use crate::{
    channel::{CommandChannel, DataWidth, LinkConfig},
    codec::{Opcode, ResponseKind},
    error::{Error, Result},
    transport::Transport,
};

/// Most hex digits a read result may carry, one 32-bit word.
const MAX_VALUE_DIGITS: usize = 8;

/// Typed access to the controller registers.
pub struct RegisterClient<S: Transport, const L: usize = 64> {
    channel: CommandChannel<S, L>,
    data_width: DataWidth,
}

impl<S: Transport, const L: usize> RegisterClient<S, L> {
    /// Open a channel on `interface` and wrap it.
    pub fn open(interface: S, config: &LinkConfig) -> Result<Self, S::Error> {
        let channel = CommandChannel::open(interface, config)?;
        Ok(Self::new(channel, config.data_width))
    }

    pub fn new(channel: CommandChannel<S, L>, data_width: DataWidth) -> Self {
        Self {
            channel,
            data_width,
        }
    }

    /// Give the transport back.
    pub fn close(self) -> S {
        self.channel.close()
    }

    /// Write `value` to a register and wait for the acknowledgement.
    pub fn write_register(&mut self, register: impl Into<u8>, value: u32) -> Result<(), S::Error> {
        let register = register.into();
        let bytes = value.to_le_bytes();
        let data = match self.data_width {
            DataWidth::Quad => &bytes[..],
            DataWidth::Byte if value <= 0xFF => &bytes[..1],
            DataWidth::Byte => return Err(Error::InvalidRange { register }),
        };

        let payload = self.channel.execute(Opcode::Write, register, Some(data))?;
        match payload.first().copied().map(ResponseKind::from_marker) {
            Some(ResponseKind::Ack) => Ok(()),
            kind => {
                log::warn!("register {register:#04X}: write of {value:#010X} rejected ({kind:?})");
                Err(Error::WriteRejected { register })
            }
        }
    }

    /// Read the 32-bit value of a register.
    pub fn read_register(&mut self, register: impl Into<u8>) -> Result<u32, S::Error> {
        let register = register.into();
        let payload = self.channel.execute(Opcode::Read, register, None)?;

        if payload.len() < 2 {
            return Err(Error::InvalidResponseLength {
                register,
                length: payload.len(),
            });
        }

        let kind = ResponseKind::from_marker(payload[0]);
        if kind != ResponseKind::ReadResult {
            log::warn!("register {register:#04X}: unexpected response {kind:?}");
            return Err(Error::InvalidResponseType { register });
        }

        parse_hex_value(&payload[1..]).ok_or_else(|| {
            log::warn!(
                "register {register:#04X}: malformed value {}",
                payload[1..].escape_ascii()
            );
            Error::InvalidResponseType { register }
        })
    }
}

/// Parse one to eight hex digits, most significant first.
fn parse_hex_value(digits: &[u8]) -> Option<u32> {
    if digits.is_empty() || digits.len() > MAX_VALUE_DIGITS {
        return None;
    }
    digits.iter().try_fold(0u32, |value, digit| {
        let nibble = (*digit as char).to_digit(16)?;
        Some(value << 4 | nibble)
    })
}
