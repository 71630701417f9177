//! Our error types for Modbus RTU exchanges.

use thiserror::Error;

pub type Result<T, I> = core::result::Result<T, Error<I>>;

/// Custom error type for Modbus RTU master communications.
#[derive(Error, Debug)]
pub enum Error<I: embedded_io::Error> {
    #[error("Serial communication error: {0:?}")]
    SerialError(I),
    #[error(transparent)]
    FrameError(#[from] FrameError),
}

/// Problems with a request before anything reaches the wire.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    #[error("Request needs at least an address and a function code, got {0} bytes")]
    TooShort(usize),
    #[error("Payload of {0} bytes does not fit in an RTU frame")]
    TooLong(usize),
}
