//! Turning an operator's typed line into request bytes.
//!
//! Bytes are separated by whitespace and written in decimal (`17`) or hex (`0x11`).
//! The checksum is never typed; it is added when the frame is encoded.

use thiserror::Error;

use crate::frame::MAX_PAYLOAD_LEN;

pub type Payload = heapless::Vec<u8, MAX_PAYLOAD_LEN>;

/// A token that couldn't become a byte. It is reported and left out of the request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("{0} does not fit in a byte")]
    OutOfRange(String),
    #[error("request too long for an RTU frame, '{0}' dropped")]
    TooLong(String),
}

/// What the operator asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    Send {
        payload: Payload,
        rejected: Vec<InputError>,
    },
}

fn parse_byte(token: &str) -> Result<u8, InputError> {
    let value = match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => token.parse::<u32>(),
    }
    .map_err(|_| InputError::NotANumber(token.to_string()))?;

    u8::try_from(value).map_err(|_| InputError::OutOfRange(token.to_string()))
}

/// Parse one line of operator input.
pub fn parse_line(line: &str) -> Command {
    let line = line.trim();
    if line.eq_ignore_ascii_case("exit") {
        return Command::Exit;
    }

    let mut payload = Payload::new();
    let mut rejected = Vec::new();

    for token in line.split_whitespace() {
        match parse_byte(token) {
            Ok(byte) => {
                if payload.push(byte).is_err() {
                    rejected.push(InputError::TooLong(token.to_string()));
                }
            }
            Err(err) => rejected.push(err),
        }
    }

    Command::Send { payload, rejected }
}
