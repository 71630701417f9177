//! The byte channel an exchange runs over.
//!
//! Any [embedded_io::Read] + [embedded_io::Write] type can act as a transport once it
//! says how its driver hands back received data. [`SerialTransport`] does this for a
//! host serial port.

use std::time::Duration;

use fugit::MillisDurationU32;
use serde::Deserialize;
use serialport::SerialPort;
use tracing::debug;

/// How a driver tends to deliver a reply after a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Most of the reply arrives in a single read once anything substantial shows up.
    Chunked,
    /// Replies trickle in as small, sometimes empty or stale, chunks.
    Streaming,
}

impl DeliveryMode {
    /// Windows serial drivers buffer whole replies, the Linux tty layer streams them.
    pub fn platform_default() -> Self {
        if cfg!(windows) {
            DeliveryMode::Chunked
        } else {
            DeliveryMode::Streaming
        }
    }
}

/// A channel a [`Session`](crate::session::Session) can run exchanges over.
pub trait Transport: embedded_io::Read + embedded_io::Write {
    fn delivery_mode(&self) -> DeliveryMode;
}

/// I/O error from the host serial port.
#[derive(Debug)]
pub struct IoError(pub std::io::Error);

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl embedded_io::Error for IoError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self.0.kind() {
            std::io::ErrorKind::NotFound => embedded_io::ErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => embedded_io::ErrorKind::PermissionDenied,
            std::io::ErrorKind::BrokenPipe => embedded_io::ErrorKind::BrokenPipe,
            std::io::ErrorKind::InvalidInput => embedded_io::ErrorKind::InvalidInput,
            std::io::ErrorKind::InvalidData => embedded_io::ErrorKind::InvalidData,
            std::io::ErrorKind::TimedOut => embedded_io::ErrorKind::TimedOut,
            std::io::ErrorKind::WouldBlock => embedded_io::ErrorKind::TimedOut,
            std::io::ErrorKind::Interrupted => embedded_io::ErrorKind::Interrupted,
            std::io::ErrorKind::Unsupported => embedded_io::ErrorKind::Unsupported,
            std::io::ErrorKind::OutOfMemory => embedded_io::ErrorKind::OutOfMemory,
            _ => embedded_io::ErrorKind::Other,
        }
    }
}

/// A host serial port opened through `serialport`. The port is closed on drop.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    mode: DeliveryMode,
}

impl SerialTransport {
    /// Open `name` at `baud` with the given per-read timeout.
    pub fn open(
        name: &str,
        baud: u32,
        timeout: MillisDurationU32,
        mode: DeliveryMode,
    ) -> Result<Self, serialport::Error> {
        let port = serialport::new(name, baud)
            .timeout(Duration::from_millis(u64::from(timeout.to_millis())))
            .open()?;
        debug!(port = name, baud, timeout_ms = timeout.to_millis(), ?mode, "serial port opened");

        Ok(Self { port, mode })
    }

    /// Release the port.
    pub fn close(self) {
        debug!(port = ?self.port.name(), "serial port closed");
    }
}

impl embedded_io::ErrorType for SerialTransport {
    type Error = IoError;
}

impl embedded_io::Read for SerialTransport {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        std::io::Read::read(&mut self.port, buf).map_err(IoError)
    }
}

impl embedded_io::Write for SerialTransport {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        std::io::Write::write(&mut self.port, buf).map_err(IoError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        std::io::Write::flush(&mut self.port).map_err(IoError)
    }
}

impl Transport for SerialTransport {
    fn delivery_mode(&self) -> DeliveryMode {
        self.mode
    }
}
