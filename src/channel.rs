//! One request/response exchange per call, with bounded retry.

use fugit::MillisDurationU32;

use crate::{
    codec::{self, Opcode},
    error::{AttemptFailure, Error, FrameError, Result},
    transport::{READ_TIMEOUT, Transport},
};

/// Attempts made for one exchange before giving up.
pub const MAX_ATTEMPTS: u8 = 3;

/// How register values are laid out in the data field of a write request.
///
/// The on-wire width of the data field has not been confirmed against a real device,
/// so it is configurable instead of assumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataWidth {
    /// One byte. Values above `0xFF` are refused.
    Byte,
    /// Four bytes, least significant first.
    #[default]
    Quad,
}

/// Link configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkConfig {
    /// Bound on waiting for one response line.
    pub read_timeout: MillisDurationU32,
    /// Layout of written register values.
    pub data_width: DataWidth,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            read_timeout: READ_TIMEOUT,
            data_width: DataWidth::default(),
        }
    }
}

/// Owns the transport and runs exchanges over it.
///
/// `L` is the capacity of the response line buffer.
pub struct CommandChannel<S: Transport, const L: usize = 64> {
    interface: S,
    read_timeout: MillisDurationU32,
}

impl<S: Transport, const L: usize> CommandChannel<S, L> {
    /// Take ownership of the transport, apply the read timeout and drop stale input.
    pub fn open(mut interface: S, config: &LinkConfig) -> Result<Self, S::Error> {
        interface
            .set_read_timeout(config.read_timeout)
            .map_err(Error::Serial)?;
        interface.discard_input().map_err(Error::Serial)?;
        Ok(Self {
            interface,
            read_timeout: config.read_timeout,
        })
    }

    /// Give the transport back.
    pub fn close(self) -> S {
        self.interface
    }

    /// Run one exchange, retrying lost or corrupted responses.
    ///
    /// Returns the decoded payload. Only transport errors end the exchange early; a
    /// missing or undecodable response is retried up to [`MAX_ATTEMPTS`] times in total, so
    /// waiting for answers takes at most [`MAX_ATTEMPTS`] read timeouts.
    pub fn execute(
        &mut self,
        opcode: Opcode,
        address: u8,
        data: Option<&[u8]>,
    ) -> Result<heapless::Vec<u8, L>, S::Error> {
        let request = codec::encode_command(opcode, address, data)
            .map_err(|_| Error::InvalidRange { register: address })?;

        let mut last = AttemptFailure::NoResponse;
        for attempt in 1..=MAX_ATTEMPTS {
            self.interface.discard_input().map_err(Error::Serial)?;
            log::trace!("request {}", request.as_slice().escape_ascii());
            self.interface.write_all(&request).map_err(Error::Serial)?;
            self.interface.flush().map_err(Error::Serial)?;

            let mut line = [0u8; L];
            let length = self
                .interface
                .read_line(&mut line, self.read_timeout)
                .map_err(Error::Serial)?;
            let line = &line[..length];

            let failure = if line.is_empty() {
                AttemptFailure::NoResponse
            } else if length == L && line[length - 1] != b'\n' {
                AttemptFailure::Frame(FrameError::FrameTooLong)
            } else {
                log::trace!("response {}", line.escape_ascii());
                match codec::decode_response(line).map(heapless::Vec::from_slice) {
                    Ok(Ok(payload)) => {
                        log::debug!(
                            "register {address:#04X}: {opcode:?} succeeded on attempt {attempt}"
                        );
                        return Ok(payload);
                    }
                    Ok(Err(_)) => AttemptFailure::Frame(FrameError::FrameTooLong),
                    Err(err) => err.into(),
                }
            };

            log::warn!(
                "register {address:#04X}: attempt {attempt}/{MAX_ATTEMPTS} failed: {failure}"
            );
            last = failure;
        }

        log::error!("register {address:#04X}: giving up after {MAX_ATTEMPTS} attempts");
        Err(Error::CommunicationFailure {
            register: address,
            attempts: MAX_ATTEMPTS,
            last,
        })
    }
}
