//! This crate is an interactive master for Modbus RTU devices on a serial line.
//!
//! An operator types the bytes of a request without its checksum. The checksum is
//! appended, the frame is sent, and the slave's reply is collected, validated and
//! either shown as a successful answer or explained as a Modbus exception.
//!
//! It talks to any transport implementing [embedded_io::Read] & [embedded_io::Write]
//! that also reports its [`DeliveryMode`](transport::DeliveryMode), so the reply-collection
//! logic can be exercised without hardware.
//!
//! The serial port is typically configured like so:
//! * Default baud rate: 19200
//! * Data bits: 8
//! * Stop bits: 1
//! * Parity: None

pub mod config;
pub mod crc;
pub mod decode;
pub mod error;
pub mod exception;
pub mod frame;
pub mod input;
pub mod report;
pub mod session;
pub mod transport;

#[cfg(test)]
mod mock_serial;
