//! Field descriptors
//!
//! One descriptor per schema field, plus the caller-declared [`Schema`].

use bytes::{Buf, BufMut};

use crate::codec::leb128;
use crate::error::{FlatError, Result};
use crate::storage::Status;

use super::FieldType;

/// `Length` value marking a variable-length string
pub const VARIABLE_LENGTH: i8 = -1;

/// Bytes before the name: offset, status, order, type, length, primary key
const FIXED_PART: usize = 6;

/// A single field of the table schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub status: Status,
    /// Declared position; live descriptors are ordered by it on open
    pub order: u8,
    pub field_type: FieldType,
    /// Fixed byte length for strings, [`VARIABLE_LENGTH`] otherwise
    pub length: i8,
    pub primary_key: bool,
}

impl FieldDescriptor {
    /// A normal, variable-length, non-key field
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            status: Status::Normal,
            order: 0,
            field_type,
            length: VARIABLE_LENGTH,
            primary_key: false,
        }
    }

    pub fn with_length(mut self, length: i8) -> Self {
        self.length = length;
        self
    }

    pub fn with_primary_key(mut self, primary_key: bool) -> Self {
        self.primary_key = primary_key;
        self
    }

    /// Fixed string length, if one is declared
    pub fn fixed_length(&self) -> Option<usize> {
        usize::try_from(self.length).ok()
    }

    /// On-disk size of this descriptor, computed from the name length
    pub fn encoded_size(&self) -> usize {
        let name_len = self.name.len();
        FIXED_PART + leb128::size(name_len as u32) + name_len
    }

    /// Check the descriptor can be stored
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(FlatError::Argument("field name not defined".to_string()));
        }
        if self.field_type == FieldType::Empty {
            return Err(FlatError::Argument(format!(
                "field type not defined for '{}'",
                self.name
            )));
        }
        if self.encoded_size() > u8::MAX as usize {
            return Err(FlatError::Argument(format!(
                "field name '{}' too long ({} bytes)",
                self.name,
                self.name.len()
            )));
        }
        Ok(())
    }

    /// Write the descriptor, recording `slot_size` as the chain offset
    pub fn encode(&self, slot_size: u8, buf: &mut impl BufMut) {
        buf.put_u8(slot_size);
        buf.put_u8(self.status as u8);
        buf.put_u8(self.order);
        buf.put_u8(self.field_type.code());
        buf.put_i8(self.length);
        buf.put_u8(u8::from(self.primary_key));
        leb128::write(self.name.len() as u32, buf);
        buf.put_slice(self.name.as_bytes());
    }

    /// Read a descriptor, returning its chain offset alongside it
    pub fn decode(buf: &mut impl Buf) -> Result<(u8, Self)> {
        if buf.remaining() < FIXED_PART {
            return Err(FlatError::Corruption(format!(
                "descriptor truncated: {} bytes",
                buf.remaining()
            )));
        }

        let slot_size = buf.get_u8();
        let status_byte = buf.get_u8();
        let status = Status::from_byte(status_byte).ok_or_else(|| {
            FlatError::Corruption(format!("unknown descriptor status 0x{:02x}", status_byte))
        })?;
        let order = buf.get_u8();
        let type_code = buf.get_u8();
        let field_type = FieldType::from_code(type_code).ok_or_else(|| {
            FlatError::Corruption(format!("unknown field type code {}", type_code))
        })?;
        let length = buf.get_i8();
        let primary_key = buf.get_u8() == 1;

        let name_len = leb128::read(buf)? as usize;
        if buf.remaining() < name_len {
            return Err(FlatError::Corruption(format!(
                "field name truncated: expected {} bytes, got {}",
                name_len,
                buf.remaining()
            )));
        }
        let mut name = vec![0u8; name_len];
        buf.copy_to_slice(&mut name);
        let name = String::from_utf8(name)
            .map_err(|e| FlatError::Corruption(format!("field name is not UTF-8: {}", e)))?;

        Ok((
            slot_size,
            Self {
                name,
                status,
                order,
                field_type,
                length,
                primary_key,
            },
        ))
    }

    /// Same type and length, so existing records still decode
    pub(crate) fn same_layout(&self, other: &FieldDescriptor) -> bool {
        self.field_type == other.field_type && self.length == other.length
    }
}

/// Statically declared, ordered list of fields
///
/// ```
/// use flatstore::schema::Schema;
///
/// let schema = Schema::new().int32("Id").string("Name").fixed_string("Code", 4);
/// assert_eq!(schema.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an arbitrary descriptor
    pub fn field(mut self, descriptor: FieldDescriptor) -> Self {
        self.fields.push(descriptor);
        self
    }

    pub fn int16(self, name: impl Into<String>) -> Self {
        self.field(FieldDescriptor::new(name, FieldType::Int16))
    }

    pub fn int32(self, name: impl Into<String>) -> Self {
        self.field(FieldDescriptor::new(name, FieldType::Int32))
    }

    /// Variable-length string field
    pub fn string(self, name: impl Into<String>) -> Self {
        self.field(FieldDescriptor::new(name, FieldType::String))
    }

    /// String field padded or truncated to `length` bytes
    pub fn fixed_string(self, name: impl Into<String>, length: i8) -> Self {
        self.field(FieldDescriptor::new(name, FieldType::String).with_length(length))
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Positional match against stored descriptors (names are ignored)
    pub fn matches(&self, stored: &[FieldDescriptor]) -> bool {
        self.fields.len() == stored.len()
            && self
                .fields
                .iter()
                .zip(stored)
                .all(|(declared, stored)| declared.same_layout(stored))
    }
}
