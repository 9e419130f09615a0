//! Data file header

use bytes::{Buf, BufMut};

use crate::error::{FlatError, Result};

/// Header size: 3 x u16 + 1 x u8
pub const HEADER_SIZE: usize = 7;

/// First bytes of the data file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Number of logical rows
    pub size: u16,

    /// High-water mark of the record area, relative to `data_start`
    pub pointer: u16,

    /// Offset where the record area begins (end of the descriptors)
    pub data_start: u16,

    /// Descriptor slots in the chain, including deleted ones
    pub item_count: u8,
}

impl Header {
    /// Header of a freshly reset file
    pub fn empty() -> Self {
        Self {
            size: 0,
            pointer: 0,
            data_start: HEADER_SIZE as u16,
            item_count: 0,
        }
    }

    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        let mut buf = &mut bytes[..];
        buf.put_u16_le(self.size);
        buf.put_u16_le(self.pointer);
        buf.put_u16_le(self.data_start);
        buf.put_u8(self.item_count);
        bytes
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(FlatError::Corruption(format!(
                "incomplete header: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        let mut buf = bytes;
        let header = Self {
            size: buf.get_u16_le(),
            pointer: buf.get_u16_le(),
            data_start: buf.get_u16_le(),
            item_count: buf.get_u8(),
        };

        if (header.data_start as usize) < HEADER_SIZE {
            return Err(FlatError::Corruption(format!(
                "data start {} inside header",
                header.data_start
            )));
        }
        Ok(header)
    }

    /// Absolute file offset of a record-area pointer
    pub fn record_offset(&self, pointer: u16) -> u64 {
        u64::from(self.data_start) + u64::from(pointer)
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::empty()
    }
}
