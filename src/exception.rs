//! Modbus exception codes and what they mean.

use strum_macros::{EnumIter, FromRepr};

/// Exception codes a slave can return in the byte after a flagged function code.
#[derive(Debug, EnumIter, FromRepr, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
pub enum ExceptionCode {
    IllegalFunction = 0x01,
    IllegalDataAddress = 0x02,
    IllegalDataValue = 0x03,
    SlaveDeviceFailure = 0x04,
    Acknowledge = 0x05,
    SlaveDeviceBusy = 0x06,
    NegativeAcknowledge = 0x07,
    MemoryParityError = 0x08,
    GatewayPathUnavailable = 0x0A,
    GatewayTargetFailedToRespond = 0x0B,
}

impl ExceptionCode {
    pub fn description(&self) -> &'static str {
        match self {
            ExceptionCode::IllegalFunction => {
                "Function code received in the query is not recognized or allowed by slave"
            }
            ExceptionCode::IllegalDataAddress => {
                "Data address of some or all the required entities are not allowed or do not exist in slave"
            }
            ExceptionCode::IllegalDataValue => "Value is not accepted by slave",
            ExceptionCode::SlaveDeviceFailure => {
                "Unrecoverable error occurred while slave was attempting to perform requested action"
            }
            ExceptionCode::Acknowledge => {
                "Slave has accepted request and is processing it, but a long duration of time is required"
            }
            ExceptionCode::SlaveDeviceBusy => {
                "Slave is engaged in processing a long-duration command. Master should retry later"
            }
            ExceptionCode::NegativeAcknowledge => {
                "Slave cannot perform the programming functions. Master should request diagnostic or error information from slave"
            }
            ExceptionCode::MemoryParityError => {
                "Slave detected a parity error in memory. Master can retry the request, but service may be required on the slave device"
            }
            ExceptionCode::GatewayPathUnavailable => {
                "Specialized for Modbus gateways. Indicates a misconfigured gateway"
            }
            ExceptionCode::GatewayTargetFailedToRespond => {
                "Specialized for Modbus gateways. Sent when slave fails to respond"
            }
        }
    }
}

impl From<ExceptionCode> for u8 {
    fn from(value: ExceptionCode) -> Self {
        value as u8
    }
}

/// Look up the description for a raw exception code. Unknown codes give `None`.
pub fn describe(code: u8) -> Option<&'static str> {
    ExceptionCode::from_repr(code).map(|code| code.description())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_known_codes() {
        let codes: Vec<u8> = ExceptionCode::iter().map(u8::from).collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5, 6, 7, 8, 10, 11]);
        for code in codes {
            assert!(describe(code).is_some(), "code {code} has no description");
        }
    }

    #[test]
    fn test_illegal_data_address() {
        let text = describe(2).unwrap();
        assert!(text.starts_with("Data address"));
        assert!(text.ends_with("do not exist in slave"));
    }

    #[test]
    fn test_unknown_codes() {
        for code in [0u8, 9, 12, 0x80, 0xFF] {
            assert_eq!(describe(code), None);
        }
    }
}
