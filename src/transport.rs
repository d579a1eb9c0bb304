//! The byte link to the controller.
//!
//! Any interface implementing [`embedded_io::Read`] and [`embedded_io::Write`] can be used,
//! as long as it can also drop unread input and read one line under a deadline.

use fugit::MillisDurationU32;

/// Serial link parameters expected by the controller.
pub const BAUD_RATE: u32 = 57_600;

/// How long one response line may take before the attempt is considered lost.
pub const READ_TIMEOUT: MillisDurationU32 = MillisDurationU32::secs(1);

pub trait Transport: embedded_io::Read + embedded_io::Write {
    /// Throw away any bytes received but not yet read.
    fn discard_input(&mut self) -> Result<(), Self::Error>;

    /// Bound how long a read may block.
    fn set_read_timeout(&mut self, timeout: MillisDurationU32) -> Result<(), Self::Error>;

    /// Read bytes into `line` up to and including `\n`.
    ///
    /// `timeout` bounds the whole line, not each byte. Running out of time is not an
    /// error: the bytes received so far are returned, none at all meaning silence. Stops
    /// early when `line` is full. Returns the number of bytes stored.
    fn read_line(
        &mut self,
        line: &mut [u8],
        timeout: MillisDurationU32,
    ) -> Result<usize, Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn discard_input(&mut self) -> Result<(), Self::Error> {
        T::discard_input(self)
    }

    fn set_read_timeout(&mut self, timeout: MillisDurationU32) -> Result<(), Self::Error> {
        T::set_read_timeout(self, timeout)
    }

    fn read_line(
        &mut self,
        line: &mut [u8],
        timeout: MillisDurationU32,
    ) -> Result<usize, Self::Error> {
        T::read_line(self, line, timeout)
    }
}
