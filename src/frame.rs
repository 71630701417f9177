//! Building request frames and checking the frames a slave sends back.
//!
//! A frame on the wire is `[address, function, data.., crc_lo, crc_hi]` with no
//! delimiters; inter-frame silence is the only separator.

use crate::crc::checksum;
use crate::error::FrameError;

/// An RTU frame never exceeds 256 bytes.
pub const MAX_FRAME_LEN: usize = 256;
/// Largest payload that still leaves room for the two checksum bytes.
pub const MAX_PAYLOAD_LEN: usize = MAX_FRAME_LEN - 2;
/// Address, function code and checksum.
pub const MIN_FRAME_LEN: usize = 4;
/// Address, function | 0x80, exception code and checksum.
pub const EXCEPTION_FRAME_LEN: usize = 5;
/// Size assumed when the request's function code doesn't tell us any better.
pub const DEFAULT_RESPONSE_LEN: usize = 8;
/// Set on the echoed function code when the slave rejects a request.
pub const EXCEPTION_FLAG: u8 = 0x80;

pub type Frame = heapless::Vec<u8, MAX_FRAME_LEN>;

/// How a received frame should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Echo and checksum both check out.
    Success,
    /// The slave answered correctly but declined the request with this code.
    Exception(u8),
    /// Short, garbled, or from the wrong slave.
    Invalid,
}

impl Reply {
    /// `true` when the slave produced a well-formed answer, exceptions included.
    pub fn is_answered(&self) -> bool {
        !matches!(self, Reply::Invalid)
    }
}

/// Append the checksum to `payload`, producing a frame ready to transmit.
pub fn encode(payload: &[u8]) -> Result<Frame, FrameError> {
    if payload.len() < 2 {
        return Err(FrameError::TooShort(payload.len()));
    }
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(FrameError::TooLong(payload.len()));
    }

    let crc = checksum(payload, payload.len());
    let mut frame = Frame::new();
    frame
        .extend_from_slice(payload)
        .map_err(|_| FrameError::TooLong(payload.len()))?;
    frame
        .extend_from_slice(&crc.to_le_bytes())
        .map_err(|_| FrameError::TooLong(payload.len()))?;

    Ok(frame)
}

/// Check that `response` echoes `request` and carries a correct checksum over its
/// first `expected_len` bytes.
pub fn validate(request: &[u8], response: &[u8], expected_len: usize) -> bool {
    if expected_len < MIN_FRAME_LEN || request.len() < 2 || response.len() < expected_len {
        return false;
    }

    let address_echoed = response[0] == request[0];
    let function_echoed =
        response[1] == request[1] || response[1] == request[1].wrapping_add(EXCEPTION_FLAG);

    let crc_at = expected_len - 2;
    let received = u16::from_le_bytes([response[crc_at], response[crc_at + 1]]);

    address_echoed && function_echoed && checksum(response, crc_at) == received
}

/// `true` when the function code byte carries the exception flag.
pub fn is_exception(response: &[u8]) -> bool {
    response.get(1).is_some_and(|&function| function > EXCEPTION_FLAG)
}

/// The exception code of a flagged response, if there is one.
pub fn exception_code(response: &[u8]) -> Option<u8> {
    if is_exception(response) {
        response.get(2).copied()
    } else {
        None
    }
}

/// Sort a response into success, exception or invalid.
///
/// Exception replies are always five bytes long, so they are checked against that
/// length rather than the size the request would normally produce.
pub fn classify(request: &[u8], response: &[u8], expected_len: usize) -> Reply {
    if let Some(code) = exception_code(response) {
        if validate(request, response, EXCEPTION_FRAME_LEN) {
            return Reply::Exception(code);
        }
    }

    if validate(request, response, expected_len) {
        Reply::Success
    } else {
        Reply::Invalid
    }
}

/// Quantity field of a read request, bytes 4 and 5 big-endian.
fn quantity(request: &[u8]) -> Option<usize> {
    let bytes = request.get(4..6)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]) as usize)
}

/// Number of bytes a normal reply to `request` occupies, checksum included.
///
/// Works on either the bare payload or the encoded frame. Returns `None` for function
/// codes we can't size, or read requests too short to carry a quantity.
pub fn expected_response_len(request: &[u8]) -> Option<usize> {
    match *request.get(1)? {
        // Coils and discrete inputs come back packed eight to a byte.
        0x01 | 0x02 => Some(5 + quantity(request)?.div_ceil(8)),
        0x03 | 0x04 => Some(5 + quantity(request)? * 2),
        0x05 | 0x06 | 0x0F | 0x10 => Some(8),
        _ => None,
    }
}
