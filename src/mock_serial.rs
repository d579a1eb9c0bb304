//! We use this mocking module in unit tests to emulate the controller on a serial port.

use fugit::MillisDurationU32;

use crate::{codec, transport::Transport};

/// One scripted reply. Empty means the controller stays silent.
pub type Reply = heapless::Vec<u8, 64>;

/// Our mock type used to emulate a serial port.
///
/// Replies are queued up front. Each flush of the write side stands for one complete
/// request and releases the next queued reply into the read buffer.
pub struct MockSerial {
    /// Buffer to store data written to the mock serial port
    write_buffer: heapless::Vec<u8, 512>,
    /// Bytes received but not yet read
    read_buffer: heapless::Vec<u8, 128>,
    /// Current position in the read buffer
    read_position: usize,
    /// Replies released one per request
    replies: heapless::Deque<Reply, 16>,
    /// Number of flushes, i.e. requests sent
    requests: usize,
    /// Number of times pending input was discarded
    discards: usize,
    /// Timeout applied through [`Transport::set_read_timeout`]
    read_timeout: Option<MillisDurationU32>,
    /// Simulated gap before each received byte, in milliseconds
    byte_delay_ms: u32,
    /// Simulated time spent waiting in [`Transport::read_line`], in milliseconds
    waited_ms: u32,
    /// Number of line reads
    line_reads: usize,
    /// Flag to simulate write errors
    should_error_on_write: bool,
    /// Flag to simulate read errors
    should_error_on_read: bool,
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum MockSerialError {
    /// Nothing arrived in time
    #[error("timed out")]
    Timeout,
    /// Simulated buffer overflow
    #[error("buffer overflow")]
    BufferOverflow,
    /// Generic simulated error for testing
    #[error("simulated error")]
    SimulatedError,
}

impl embedded_io::Error for MockSerialError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            MockSerialError::Timeout => embedded_io::ErrorKind::TimedOut,
            MockSerialError::BufferOverflow => embedded_io::ErrorKind::OutOfMemory,
            MockSerialError::SimulatedError => embedded_io::ErrorKind::Other,
        }
    }
}

impl embedded_io::ErrorType for MockSerial {
    type Error = MockSerialError;
}

impl embedded_io::Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.should_error_on_write {
            return Err(MockSerialError::SimulatedError);
        }

        self.write_buffer
            .extend_from_slice(buf)
            .map_err(|_| MockSerialError::BufferOverflow)?;

        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if self.should_error_on_write {
            return Err(MockSerialError::SimulatedError);
        }
        self.requests += 1;
        if let Some(reply) = self.replies.pop_front() {
            self.read_buffer
                .extend_from_slice(&reply)
                .map_err(|_| MockSerialError::BufferOverflow)?;
        }
        Ok(())
    }
}

impl embedded_io::Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.should_error_on_read {
            return Err(MockSerialError::SimulatedError);
        }

        if self.read_position >= self.read_buffer.len() {
            return Err(MockSerialError::Timeout);
        }

        let available = &self.read_buffer[self.read_position..];
        let bytes_to_read = core::cmp::min(buf.len(), available.len());
        buf[..bytes_to_read].copy_from_slice(&available[..bytes_to_read]);

        self.read_position += bytes_to_read;
        Ok(bytes_to_read)
    }
}

impl Transport for MockSerial {
    fn discard_input(&mut self) -> Result<(), Self::Error> {
        self.discards += 1;
        self.read_buffer.clear();
        self.read_position = 0;
        Ok(())
    }

    fn set_read_timeout(&mut self, timeout: MillisDurationU32) -> Result<(), Self::Error> {
        self.read_timeout = Some(timeout);
        Ok(())
    }

    fn read_line(
        &mut self,
        line: &mut [u8],
        timeout: MillisDurationU32,
    ) -> Result<usize, Self::Error> {
        if self.should_error_on_read {
            return Err(MockSerialError::SimulatedError);
        }
        self.line_reads += 1;

        let limit = timeout.to_millis();
        let mut waited = 0;
        let mut length = 0;
        while length < line.len() {
            match self.read_buffer.get(self.read_position) {
                Some(&byte) if waited + self.byte_delay_ms <= limit => {
                    waited += self.byte_delay_ms;
                    self.read_position += 1;
                    line[length] = byte;
                    length += 1;
                    if byte == b'\n' {
                        break;
                    }
                }
                // Nothing more arrives before the deadline.
                _ => {
                    waited = limit;
                    break;
                }
            }
        }
        self.waited_ms += waited;
        Ok(length)
    }
}

impl MockSerial {
    /// Create a new MockSerial instance with empty buffers
    pub fn new() -> Self {
        Self {
            write_buffer: heapless::Vec::new(),
            read_buffer: heapless::Vec::new(),
            read_position: 0,
            replies: heapless::Deque::new(),
            requests: 0,
            discards: 0,
            read_timeout: None,
            byte_delay_ms: 0,
            waited_ms: 0,
            line_reads: 0,
            should_error_on_write: false,
            should_error_on_read: false,
        }
    }

    /// Queue the raw bytes sent back after the next request.
    pub fn queue_reply(&mut self, raw: &[u8]) -> Result<(), MockSerialError> {
        let mut reply = Reply::new();
        reply
            .extend_from_slice(raw)
            .map_err(|_| MockSerialError::BufferOverflow)?;
        self.replies
            .push_back(reply)
            .map_err(|_| MockSerialError::BufferOverflow)
    }

    /// Queue a well formed reply carrying `payload`, with lead-in, checksum and CR LF added.
    pub fn queue_payload(&mut self, payload: &[u8]) -> Result<(), MockSerialError> {
        let mut raw = Reply::new();
        let mut push = |bytes: &[u8]| {
            raw.extend_from_slice(bytes)
                .map_err(|_| MockSerialError::BufferOverflow)
        };
        push(b"!")?;
        push(payload)?;
        push(&codec::hex2(codec::checksum(b"!").wrapping_add(codec::checksum(payload))))?;
        push(codec::TERMINATOR)?;
        self.queue_reply(&raw)
    }

    /// Put bytes in the read buffer as if they arrived before any request.
    pub fn set_stale_data(&mut self, data: &[u8]) -> Result<(), MockSerialError> {
        self.read_buffer
            .extend_from_slice(data)
            .map_err(|_| MockSerialError::BufferOverflow)
    }

    /// Get a reference to the data that was written to this mock serial port
    pub fn written_data(&self) -> &[u8] {
        &self.write_buffer
    }

    /// Clear the write buffer
    pub fn clear_written_data(&mut self) {
        self.write_buffer.clear();
    }

    /// Number of requests sent so far.
    pub fn request_count(&self) -> usize {
        self.requests
    }

    pub fn discard_count(&self) -> usize {
        self.discards
    }

    /// Replies not yet handed out.
    pub fn queued_replies(&self) -> usize {
        self.replies.len()
    }

    pub fn has_pending_input(&self) -> bool {
        self.read_position < self.read_buffer.len()
    }

    pub fn read_timeout(&self) -> Option<MillisDurationU32> {
        self.read_timeout
    }

    /// Make every received byte arrive `delay_ms` after the previous one.
    pub fn set_byte_delay(&mut self, delay_ms: u32) {
        self.byte_delay_ms = delay_ms;
    }

    /// Simulated time spent blocked in line reads.
    pub fn waited_ms(&self) -> u32 {
        self.waited_ms
    }

    pub fn line_reads(&self) -> usize {
        self.line_reads
    }

    /// Configure whether write operations should fail with an error
    pub fn set_write_error(&mut self, should_error: bool) {
        self.should_error_on_write = should_error;
    }

    /// Configure whether read operations should fail with an error
    pub fn set_read_error(&mut self, should_error: bool) {
        self.should_error_on_read = should_error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{Error, Read, Write};

    #[test]
    fn test_new_mock_serial() {
        let mock = MockSerial::new();
        assert_eq!(mock.written_data().len(), 0);
        assert_eq!(mock.request_count(), 0);
        assert!(!mock.has_pending_input());
        assert_eq!(mock.read_timeout(), None);
    }

    #[test]
    fn test_write_multiple_times() {
        let mut mock = MockSerial::new();
        mock.write_all(b"?R0").unwrap();
        mock.write_all(b"0F1\r\n").unwrap();
        assert_eq!(mock.written_data(), b"?R00F1\r\n");

        mock.clear_written_data();
        assert!(mock.written_data().is_empty());
    }

    #[test]
    fn test_reply_released_on_flush() {
        let mut mock = MockSerial::new();
        mock.queue_reply(b"!K6C\r\n").unwrap();

        let mut buffer = [0u8; 10];
        assert!(matches!(mock.read(&mut buffer), Err(MockSerialError::Timeout)));

        mock.flush().unwrap();
        assert_eq!(mock.read(&mut buffer).unwrap(), 6);
        assert_eq!(&buffer[..6], b"!K6C\r\n");
        assert_eq!(mock.request_count(), 1);
        assert_eq!(mock.queued_replies(), 0);
    }

    #[test]
    fn test_read_partial_data() {
        let mut mock = MockSerial::new();
        mock.set_stale_data(b"Long response data").unwrap();

        let mut buffer = [0u8; 5];
        assert_eq!(mock.read(&mut buffer).unwrap(), 5);
        assert_eq!(&buffer, b"Long ");
        assert!(mock.has_pending_input());
    }

    #[test]
    fn test_discard_input() {
        let mut mock = MockSerial::new();
        mock.set_stale_data(b"stale").unwrap();
        mock.discard_input().unwrap();

        let mut buffer = [0u8; 10];
        assert!(matches!(mock.read(&mut buffer), Err(MockSerialError::Timeout)));
        assert_eq!(mock.discard_count(), 1);
    }

    #[test]
    fn test_queue_payload_frames_reply() {
        let mut mock = MockSerial::new();
        mock.queue_payload(b"R1234ABCD").unwrap();
        mock.flush().unwrap();

        let mut buffer = [0u8; 20];
        let read = mock.read(&mut buffer).unwrap();
        assert_eq!(&buffer[..read], b"!R1234ABCD47\r\n");
    }

    #[test]
    fn test_error_simulation() {
        let mut mock = MockSerial::new();
        mock.set_write_error(true);
        assert!(matches!(mock.write(b"test"), Err(MockSerialError::SimulatedError)));
        assert!(matches!(mock.flush(), Err(MockSerialError::SimulatedError)));
        assert_eq!(mock.written_data().len(), 0);

        mock.set_write_error(false);
        mock.set_read_error(true);
        mock.set_stale_data(b"data").unwrap();
        let mut buffer = [0u8; 10];
        assert!(matches!(mock.read(&mut buffer), Err(MockSerialError::SimulatedError)));
    }

    #[test]
    fn test_read_line_stops_at_newline() {
        let mut mock = MockSerial::new();
        mock.set_stale_data(b"!K6C\r\n!R").unwrap();

        let mut line = [0u8; 16];
        let length = mock.read_line(&mut line, MillisDurationU32::secs(1)).unwrap();
        assert_eq!(&line[..length], b"!K6C\r\n");
        assert!(mock.has_pending_input());
        assert_eq!(mock.waited_ms(), 0);
    }

    #[test]
    fn test_read_line_deadline_covers_whole_line() {
        let mut mock = MockSerial::new();
        mock.set_stale_data(b"!R1234ABCD47\r\n").unwrap();
        mock.set_byte_delay(250);

        let mut line = [0u8; 16];
        let length = mock.read_line(&mut line, MillisDurationU32::secs(1)).unwrap();
        assert_eq!(&line[..length], b"!R12");
        assert_eq!(mock.waited_ms(), 1000);

        // Silence waits out the full timeout.
        mock.discard_input().unwrap();
        assert_eq!(mock.read_line(&mut line, MillisDurationU32::secs(1)).unwrap(), 0);
        assert_eq!(mock.waited_ms(), 2000);
        assert_eq!(mock.line_reads(), 2);
    }

    #[test]
    fn test_error_kinds() {
        assert!(matches!(MockSerialError::Timeout.kind(), embedded_io::ErrorKind::TimedOut));
        assert!(matches!(MockSerialError::BufferOverflow.kind(), embedded_io::ErrorKind::OutOfMemory));
        assert!(matches!(MockSerialError::SimulatedError.kind(), embedded_io::ErrorKind::Other));
    }
}
