//! We use this mocking module in unit tests to emulate a serial port whose driver
//! hands back replies in scripted chunks.

use crate::transport::{DeliveryMode, Transport};

/// What a single `read()` call on the mock produces.
#[derive(Debug, Clone)]
pub enum ReadStep {
    /// Return these bytes (split across calls if the caller's buffer is smaller).
    Data(heapless::Vec<u8, 256>),
    /// Return `Ok(0)`.
    Empty,
    /// Return a timeout error.
    Timeout,
    /// Return a hard fault.
    Fault,
}

impl ReadStep {
    pub fn data(bytes: &[u8]) -> Self {
        let mut chunk = heapless::Vec::new();
        chunk
            .extend_from_slice(bytes)
            .expect("mock chunk larger than 256 bytes");
        ReadStep::Data(chunk)
    }
}

/// Our mock type used to emulate a serial port.
pub struct MockSerial {
    /// Buffer to store data written to the mock serial port
    write_buffer: heapless::Vec<u8, 256>,
    /// Scripted results for successive reads
    steps: heapless::Vec<ReadStep, 16>,
    /// Index of the step the next read consumes
    step: usize,
    /// Bytes of the current data step already handed out
    offset: usize,
    /// Number of read calls made so far
    reads: usize,
    should_error_on_write: bool,
    mode: DeliveryMode,
}

#[derive(Debug)]
pub enum MockSerialError {
    /// Simulated timeout error
    Timeout,
    /// Simulated buffer overflow
    BufferOverflow,
    /// Generic simulated error for testing
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
        Ok(())
    }
}

impl embedded_io::Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.reads += 1;

        // Once the script runs out the line stays silent.
        let Some(step) = self.steps.get(self.step) else {
            return Err(MockSerialError::Timeout);
        };

        match step {
            ReadStep::Data(chunk) => {
                let remaining = &chunk[self.offset..];
                let count = core::cmp::min(buf.len(), remaining.len());
                buf[..count].copy_from_slice(&remaining[..count]);

                if count == remaining.len() {
                    self.step += 1;
                    self.offset = 0;
                } else {
                    self.offset += count;
                }
                Ok(count)
            }
            ReadStep::Empty => {
                self.step += 1;
                Ok(0)
            }
            ReadStep::Timeout => {
                self.step += 1;
                Err(MockSerialError::Timeout)
            }
            ReadStep::Fault => {
                self.step += 1;
                Err(MockSerialError::SimulatedError)
            }
        }
    }
}

impl Transport for MockSerial {
    fn delivery_mode(&self) -> DeliveryMode {
        self.mode
    }
}

impl MockSerial {
    pub fn new(mode: DeliveryMode) -> Self {
        Self {
            write_buffer: heapless::Vec::new(),
            steps: heapless::Vec::new(),
            step: 0,
            offset: 0,
            reads: 0,
            should_error_on_write: false,
            mode,
        }
    }

    /// Replace the read script and rewind it.
    pub fn script(&mut self, steps: &[ReadStep]) {
        self.steps.clear();
        for step in steps {
            self.steps
                .push(step.clone())
                .expect("mock script longer than 16 steps");
        }
        self.step = 0;
        self.offset = 0;
        self.reads = 0;
    }

    /// Get a reference to the data that was written to this mock serial port
    pub fn written_data(&self) -> &[u8] {
        &self.write_buffer
    }

    pub fn clear_written_data(&mut self) {
        self.write_buffer.clear();
    }

    /// How many times `read()` has been called since the last [`script`](Self::script).
    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn set_write_error(&mut self, should_error: bool) {
        self.should_error_on_write = should_error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{Error, Read, Write};

    #[test]
    fn test_write_data() {
        let mut mock = MockSerial::new(DeliveryMode::Streaming);
        mock.write(b"Hello, ").unwrap();
        mock.write(b"World!").unwrap();
        assert_eq!(mock.written_data(), b"Hello, World!");

        mock.clear_written_data();
        assert!(mock.written_data().is_empty());
    }

    #[test]
    fn test_write_error_simulation() {
        let mut mock = MockSerial::new(DeliveryMode::Streaming);
        mock.set_write_error(true);
        assert!(matches!(mock.write(b"test"), Err(MockSerialError::SimulatedError)));
        assert!(mock.flush().is_err());
        assert!(mock.written_data().is_empty());
    }

    #[test]
    fn test_scripted_reads() {
        let mut mock = MockSerial::new(DeliveryMode::Streaming);
        mock.script(&[
            ReadStep::Empty,
            ReadStep::data(b"Hello World"),
            ReadStep::Timeout,
            ReadStep::Fault,
        ]);

        let mut buffer = [0u8; 5];
        assert_eq!(mock.read(&mut buffer).unwrap(), 0);
        assert_eq!(mock.read(&mut buffer).unwrap(), 5);
        assert_eq!(&buffer, b"Hello");
        assert_eq!(mock.read(&mut buffer).unwrap(), 5);
        assert_eq!(&buffer, b" Worl");
        assert_eq!(mock.read(&mut buffer).unwrap(), 1);
        assert_eq!(buffer[0], b'd');

        let timeout = mock.read(&mut buffer).unwrap_err();
        assert!(matches!(timeout.kind(), embedded_io::ErrorKind::TimedOut));
        let fault = mock.read(&mut buffer).unwrap_err();
        assert!(matches!(fault.kind(), embedded_io::ErrorKind::Other));
        assert_eq!(mock.reads(), 6);
    }

    #[test]
    fn test_silent_after_script() {
        let mut mock = MockSerial::new(DeliveryMode::Chunked);
        let mut buffer = [0u8; 4];
        assert!(matches!(mock.read(&mut buffer), Err(MockSerialError::Timeout)));
        assert_eq!(mock.delivery_mode(), DeliveryMode::Chunked);
    }

    #[test]
    fn test_script_rewinds() {
        let mut mock = MockSerial::new(DeliveryMode::Streaming);
        mock.script(&[ReadStep::data(b"first")]);
        let mut buffer = [0u8; 10];
        mock.read(&mut buffer).unwrap();

        mock.script(&[ReadStep::data(b"second")]);
        assert_eq!(mock.reads(), 0);
        assert_eq!(mock.read(&mut buffer).unwrap(), 6);
        assert_eq!(&buffer[..6], b"second");
    }
}
