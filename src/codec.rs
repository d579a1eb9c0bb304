//! Framing of requests and responses on the wire.
//!
//! A request looks like `?W0800004100` + checksum + `\r\n`: a start character, the
//! opcode, the register address and (for writes) the data bytes, all as two uppercase
//! hex digits per byte. The checksum is the sum of every preceding character modulo 256.
//!
//! A response is a lead-in byte, the payload, two checksum digits and `\r\n`. The
//! payload starts with a marker character, `K` for an acknowledged write or `R` for a
//! read result followed by the value in hex.

use crate::error::FrameError;

/// First character of every request.
pub const START: u8 = b'?';

/// Line terminator on both directions.
pub const TERMINATOR: &[u8; 2] = b"\r\n";

/// Most data bytes a single request can carry.
pub const MAX_DATA_LEN: usize = 4;

/// Length of the longest request, `?` + opcode + address + data + checksum + CR LF.
pub const MAX_REQUEST_LEN: usize = 2 + 2 + 2 * MAX_DATA_LEN + 2 + 2;

/// Lead-in byte, two checksum digits and CR LF.
pub const MIN_RESPONSE_LEN: usize = 6;

/// Checksum digits plus CR LF at the end of a response.
const TRAILER_LEN: usize = 4;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Request operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Write,
    Read,
}

impl Opcode {
    pub const fn as_char(&self) -> u8 {
        match self {
            Opcode::Write => b'W',
            Opcode::Read => b'R',
        }
    }
}

/// Meaning of the first payload byte of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// `K` - write acknowledged.
    Ack,
    /// `R` - read result, value follows.
    ReadResult,
    /// Anything else is an error reported by the device.
    Error(u8),
}

impl ResponseKind {
    pub const ACK_MARKER: u8 = b'K';
    pub const READ_MARKER: u8 = b'R';

    pub fn from_marker(marker: u8) -> Self {
        match marker {
            Self::ACK_MARKER => ResponseKind::Ack,
            Self::READ_MARKER => ResponseKind::ReadResult,
            other => ResponseKind::Error(other),
        }
    }
}

/// One request, ready to be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame<'a> {
    opcode: Opcode,
    address: u8,
    data: &'a [u8],
}

impl<'a> CommandFrame<'a> {
    pub fn read(address: u8) -> Self {
        Self {
            opcode: Opcode::Read,
            address,
            data: &[],
        }
    }

    pub fn write(address: u8, data: &'a [u8]) -> Self {
        Self {
            opcode: Opcode::Write,
            address,
            data,
        }
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// The checksum that [`Self::encode`] appends.
    pub fn checksum(&self) -> u8 {
        let mut sum = START.wrapping_add(self.opcode.as_char());
        for byte in core::iter::once(&self.address).chain(self.data) {
            let [hi, lo] = hex2(*byte);
            sum = sum.wrapping_add(hi).wrapping_add(lo);
        }
        sum
    }

    /// Render the exact bytes to transmit.
    pub fn encode(&self) -> Result<heapless::Vec<u8, MAX_REQUEST_LEN>, FrameError> {
        if self.data.len() > MAX_DATA_LEN {
            return Err(FrameError::FrameTooLong);
        }

        let mut frame: heapless::Vec<u8, MAX_REQUEST_LEN> = heapless::Vec::new();
        let mut push = |bytes: &[u8]| {
            frame
                .extend_from_slice(bytes)
                .map_err(|_| FrameError::FrameTooLong)
        };
        push(&[START, self.opcode.as_char()])?;
        push(&hex2(self.address))?;
        for byte in self.data {
            push(&hex2(*byte))?;
        }
        push(&hex2(self.checksum()))?;
        push(TERMINATOR)?;
        Ok(frame)
    }
}

/// Build a request frame. `data` is only sent for writes.
pub fn encode_command(
    opcode: Opcode,
    address: u8,
    data: Option<&[u8]>,
) -> Result<heapless::Vec<u8, MAX_REQUEST_LEN>, FrameError> {
    match opcode {
        Opcode::Write => CommandFrame::write(address, data.unwrap_or(&[])).encode(),
        Opcode::Read => CommandFrame::read(address).encode(),
    }
}

/// Validate a response line and return its payload.
///
/// The lead-in byte, the checksum and the line terminator are stripped. An
/// acknowledgement therefore decodes to `K` and a read result to `R` plus the value.
pub fn decode_response(raw: &[u8]) -> Result<&[u8], FrameError> {
    if raw.len() < MIN_RESPONSE_LEN {
        return Err(FrameError::FrameTooShort { length: raw.len() });
    }

    let (body, trailer) = raw.split_at(raw.len() - TRAILER_LEN);
    let received = parse_hex2([trailer[0], trailer[1]]).ok_or(FrameError::InvalidChecksumField)?;
    let computed = checksum(body);
    if computed != received {
        return Err(FrameError::ChecksumMismatch { computed, received });
    }

    Ok(&body[1..])
}

/// Sum of all bytes, modulo 256.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, byte| sum.wrapping_add(*byte))
}

/// Two uppercase hex digits for one byte.
pub fn hex2(byte: u8) -> [u8; 2] {
    [
        HEX_DIGITS[(byte >> 4) as usize],
        HEX_DIGITS[(byte & 0x0F) as usize],
    ]
}

fn parse_hex2(digits: [u8; 2]) -> Option<u8> {
    let hi = (digits[0] as char).to_digit(16)?;
    let lo = (digits[1] as char).to_digit(16)?;
    Some((hi << 4 | lo) as u8)
}
