//! Text shown to the operator after each exchange.

use core::fmt::Write;

use tracing::warn;

use crate::{
    decode::{Values, decode},
    exception::describe,
    frame::{self, Reply},
    session::Outcome,
};

/// Bytes in decimal, each preceded by a space.
pub fn format_bytes(bytes: &[u8]) -> String {
    bytes.iter().fold(String::new(), |mut out, byte| {
        let _ = write!(out, " {byte}");
        out
    })
}

/// One line per exception code, including ones we have no description for.
pub fn exception_line(code: u8) -> String {
    match describe(code) {
        Some(text) => text.to_string(),
        None => format!("Unknown exception code {code}"),
    }
}

fn values_line(values: &Values) -> String {
    match values {
        Values::Registers(registers) => {
            let mut out = String::from("Registers:");
            for register in registers {
                let _ = write!(out, " {register}");
            }
            out
        }
        Values::Bits(bits) => {
            let mut out = String::from("Bits:");
            for &bit in bits {
                let _ = write!(out, " {}", u8::from(bit));
            }
            out
        }
    }
}

/// Render a finished exchange: the response bytes, what they mean, and the verdict.
pub fn report(outcome: &Outcome<'_>) -> String {
    let mut lines = Vec::new();

    let label = if frame::is_exception(outcome.response) {
        "Error:"
    } else {
        "Response:"
    };
    lines.push(format!("{label}{}", format_bytes(outcome.response)));

    if let Some(code) = frame::exception_code(outcome.response) {
        lines.push(exception_line(code));
    }

    if outcome.reply == Reply::Success {
        match decode(&outcome.request, outcome.response) {
            Ok(Some(values)) => lines.push(values_line(&values)),
            Ok(None) => {}
            Err(err) => warn!(?err, "reply passed validation but could not be decoded"),
        }
    }

    if outcome.received < outcome.expected_len {
        lines.push(format!(
            "Received {} of {} expected bytes",
            outcome.received, outcome.expected_len
        ));
    }

    lines.push(format!("Result: {}", outcome.reply.is_answered()));
    lines.join("\n")
}
