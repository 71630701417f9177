//! CRC-16/MODBUS, the checksum carried in the last two bytes of every RTU frame.

/// Reflected form of the 0x8005 generator polynomial.
pub const POLYNOMIAL: u16 = 0xA001;

/// Compute the checksum over the first `length` bytes of `bytes`.
///
/// `length` is clamped to the slice length, so any input is valid. An empty range
/// yields the initial value `0xFFFF`.
pub fn checksum(bytes: &[u8], length: usize) -> u16 {
    let length = length.min(bytes.len());
    let mut crc: u16 = 0xFFFF;

    for &byte in &bytes[..length] {
        crc ^= u16::from(byte);
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ POLYNOMIAL;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}

/// Checksum over the whole slice.
#[inline]
pub fn checksum_of(bytes: &[u8]) -> u16 {
    checksum(bytes, bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(checksum(&[], 0), 0xFFFF);
    }

    #[test]
    fn test_read_holding_request() {
        // 01 03 00 00 00 0A -> C5 CD on the wire
        let frame = [0x01, 0x03, 0x00, 0x00, 0x00, 0x0A];
        assert_eq!(checksum_of(&frame), 0xCDC5);
    }

    #[test]
    fn test_read_holding_response() {
        let frame = [0x01, 0x03, 0x02, 0x56, 0x78];
        assert_eq!(checksum_of(&frame).to_le_bytes(), [0x87, 0xC6]);
    }

    #[test]
    fn test_length_limits_range() {
        let frame = [0x01, 0x03, 0x00, 0x20, 0x00, 0x01, 0xFF, 0xFF];
        assert_eq!(checksum(&frame, 6), checksum_of(&frame[..6]));
        assert_eq!(checksum(&frame, 6).to_le_bytes(), [0x85, 0xC0]);
    }

    #[test]
    fn test_length_clamped() {
        let frame = [0x11, 0x22, 0x33];
        assert_eq!(checksum(&frame, 100), checksum_of(&frame));
    }

    #[test]
    fn test_order_sensitive() {
        assert_ne!(checksum_of(&[0x01, 0x02]), checksum_of(&[0x02, 0x01]));
    }
}
