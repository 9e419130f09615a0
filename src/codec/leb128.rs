//! LEB128 length codec
//!
//! Encodes the byte length of strings (record fields and field names).

use bytes::{Buf, BufMut};

use crate::error::{FlatError, Result};

const DATA_BITS_PER_BYTE: u32 = 7;
const DATA_BITS_MASK: u8 = 0x7F;
const CONTINUATION_BIT_MASK: u8 = 0x80;

/// Maximum encoded size of a `u32`
pub const MAX_SIZE: usize = 5;

/// Number of bytes needed to encode `value`
pub fn size(value: u32) -> usize {
    let data_bits = u32::BITS - value.leading_zeros();
    usize::max(1, data_bits.div_ceil(DATA_BITS_PER_BYTE) as usize)
}

/// Encode `value` into a new byte vector
pub fn encode(value: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(size(value));
    write(value, &mut buf);
    buf
}

/// Append the encoding of `value` to `buf`
pub fn write(value: u32, buf: &mut impl BufMut) {
    let mut val = value;
    while val >= u32::from(CONTINUATION_BIT_MASK) {
        buf.put_u8((val as u8 & DATA_BITS_MASK) | CONTINUATION_BIT_MASK);
        val >>= DATA_BITS_PER_BYTE;
    }
    buf.put_u8(val as u8);
}

/// Decode a value from the front of `buf`
///
/// Fails on a truncated sequence or one that overflows a `u32`.
pub fn read(buf: &mut impl Buf) -> Result<u32> {
    let mut result: u32 = 0;
    let mut shift = 0u32;

    loop {
        if !buf.has_remaining() {
            return Err(FlatError::Corruption(
                "truncated length prefix".to_string(),
            ));
        }
        let byte = buf.get_u8();
        let group = u32::from(byte & DATA_BITS_MASK);

        // The fifth byte may only carry the top four bits of a u32
        if shift == 28 && (byte & CONTINUATION_BIT_MASK != 0 || group > 0x0F) {
            return Err(FlatError::Corruption(
                "length prefix overflows u32".to_string(),
            ));
        }

        result |= group << shift;

        if byte & CONTINUATION_BIT_MASK == 0 {
            return Ok(result);
        }
        shift += DATA_BITS_PER_BYTE;
    }
}
