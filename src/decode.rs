//! Pull register and coil values out of a successful read reply.

use rmodbus::{ModbusProto, client::ModbusRequest};

use crate::frame::MAX_FRAME_LEN;

/// Most registers a single read can return.
pub const MAX_REGISTERS: usize = 125;
/// Most coils or discrete inputs a single read can return.
pub const MAX_BITS: usize = 2000;

/// Values carried by a read reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Values {
    /// Coils or discrete inputs, in address order.
    Bits(heapless::Vec<bool, MAX_BITS>),
    /// Holding or input registers, in address order.
    Registers(heapless::Vec<u16, MAX_REGISTERS>),
}

/// Start address and quantity of a read request.
fn read_range(request: &[u8]) -> Option<(u16, u16)> {
    let bytes = request.get(2..6)?;
    Some((
        u16::from_be_bytes([bytes[0], bytes[1]]),
        u16::from_be_bytes([bytes[2], bytes[3]]),
    ))
}

/// Decode the data section of `response` for the read `request` that produced it.
///
/// Returns `Ok(None)` when the request isn't one of the four read functions. The
/// response is checked again by `rmodbus`, so a reply that fails its checksum or echo
/// gives an error here too.
pub fn decode(request: &[u8], response: &[u8]) -> Result<Option<Values>, rmodbus::ErrorKind> {
    let (Some(&unit_id), Some(&function)) = (request.first(), request.get(1)) else {
        return Ok(None);
    };
    let Some((start, count)) = read_range(request) else {
        return Ok(None);
    };

    let mut req = ModbusRequest::new(unit_id, ModbusProto::Rtu);
    let mut regenerated: heapless::Vec<u8, MAX_FRAME_LEN> = heapless::Vec::new();

    match function {
        0x01 | 0x02 => {
            if function == 0x01 {
                req.generate_get_coils(start, count, &mut regenerated)?;
            } else {
                req.generate_get_discretes(start, count, &mut regenerated)?;
            }
            let mut bits: heapless::Vec<bool, MAX_BITS> = heapless::Vec::new();
            req.parse_bool(response, &mut bits)?;
            Ok(Some(Values::Bits(bits)))
        }
        0x03 | 0x04 => {
            if function == 0x03 {
                req.generate_get_holdings(start, count, &mut regenerated)?;
            } else {
                req.generate_get_inputs(start, count, &mut regenerated)?;
            }
            let mut registers: heapless::Vec<u16, MAX_REGISTERS> = heapless::Vec::new();
            req.parse_u16(response, &mut registers)?;
            Ok(Some(Values::Registers(registers)))
        }
        _ => Ok(None),
    }
}
