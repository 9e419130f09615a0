//! Index entry definitions

use bytes::{Buf, BufMut};

use crate::error::{FlatError, Result};

/// Width of the per-entry key in bytes
pub const KEY_WIDTH: u16 = 2;

/// Location of one logical row in the record area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// Advisory row key
    pub key: u16,

    /// Offset into the record area (relative to `data_start`)
    pub pointer: u16,

    /// Bytes allocated to the record, status byte included
    pub length: u16,
}

impl IndexEntry {
    /// Encoded entry size: key + pointer + length
    pub const SIZE: usize = KEY_WIDTH as usize + 4;

    pub fn new(key: u16, pointer: u16, length: u16) -> Self {
        Self {
            key,
            pointer,
            length,
        }
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        let mut buf = &mut bytes[..];
        buf.put_u16_le(self.key);
        buf.put_u16_le(self.pointer);
        buf.put_u16_le(self.length);
        bytes
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(FlatError::Corruption(format!(
                "incomplete index entry: expected {} bytes, got {}",
                Self::SIZE,
                bytes.len()
            )));
        }
        let mut buf = bytes;
        Ok(Self {
            key: buf.get_u16_le(),
            pointer: buf.get_u16_le(),
            length: buf.get_u16_le(),
        })
    }
}
