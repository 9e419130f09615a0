//! Record codec
//!
//! A record is one status byte followed by every field value in descriptor
//! order. Decoding is schema-driven, so bytes past the last field (left over
//! by a shorter in-place update) are never read.

use bytes::{Buf, BufMut};

use crate::codec::leb128;
use crate::error::{FlatError, Result};
use crate::schema::{FieldDescriptor, FieldType};

use super::Value;

/// Status byte shared by records and field descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    /// Live
    Normal = 0,

    /// Removed by a delete; bytes are kept
    Deleted = 1,

    /// Superseded by a relocated copy; bytes are kept
    Spare = 2,
}

impl Status {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Status::Normal),
            1 => Some(Status::Deleted),
            2 => Some(Status::Spare),
            _ => None,
        }
    }
}

/// Exact encoded size of `values`, status byte included
pub fn encoded_len(fields: &[FieldDescriptor], values: &[Value]) -> Result<usize> {
    check_arity(fields, values)?;

    let mut len = 1;
    for (field, value) in fields.iter().zip(values) {
        len += match (field.field_type, value) {
            (FieldType::Int16, Value::Int16(_)) => 2,
            (FieldType::Int32, Value::Int32(_)) => 4,
            (FieldType::String, Value::Text(text)) => {
                let bytes = match field.fixed_length() {
                    Some(fixed) => fixed,
                    None => text.len(),
                };
                leb128::size(string_len(field, bytes)?) + bytes
            }
            _ => return Err(mismatch(field)),
        };
    }
    Ok(len)
}

/// Encode `values` as a live record
pub fn encode_record(fields: &[FieldDescriptor], values: &[Value]) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(encoded_len(fields, values)?);
    buf.put_u8(Status::Normal as u8);

    for (field, value) in fields.iter().zip(values) {
        match (field.field_type, value) {
            (FieldType::Int16, Value::Int16(v)) => buf.put_i16_le(*v),
            (FieldType::Int32, Value::Int32(v)) => buf.put_i32_le(*v),
            (FieldType::String, Value::Text(text)) => match field.fixed_length() {
                Some(fixed) => {
                    let bytes = fit_to_length(text, fixed);
                    leb128::write(string_len(field, bytes.len())?, &mut buf);
                    buf.put_slice(&bytes);
                }
                None => {
                    leb128::write(string_len(field, text.len())?, &mut buf);
                    buf.put_slice(text.as_bytes());
                }
            },
            _ => return Err(mismatch(field)),
        }
    }
    Ok(buf)
}

/// Decode a record, returning its status and values
pub fn decode_record(fields: &[FieldDescriptor], bytes: &[u8]) -> Result<(Status, Vec<Value>)> {
    let mut buf = bytes;
    ensure_remaining(buf, 1, "status")?;
    let status_byte = buf.get_u8();
    let status = Status::from_byte(status_byte).ok_or_else(|| {
        FlatError::Corruption(format!("unknown record status 0x{:02x}", status_byte))
    })?;

    let mut values = Vec::with_capacity(fields.len());
    for field in fields {
        let value = match field.field_type {
            FieldType::Int16 => {
                ensure_remaining(buf, 2, &field.name)?;
                Value::Int16(buf.get_i16_le())
            }
            FieldType::Int32 => {
                ensure_remaining(buf, 4, &field.name)?;
                Value::Int32(buf.get_i32_le())
            }
            FieldType::String => {
                let len = leb128::read(&mut buf)? as usize;
                ensure_remaining(buf, len, &field.name)?;
                let text = String::from_utf8(buf[..len].to_vec()).map_err(|e| {
                    FlatError::Corruption(format!("field '{}' is not UTF-8: {}", field.name, e))
                })?;
                buf.advance(len);
                Value::Text(text)
            }
            other => return Err(FlatError::NotImplemented(other)),
        };
        values.push(value);
    }
    Ok((status, values))
}

// =============================================================================
// Private Helpers
// =============================================================================

fn check_arity(fields: &[FieldDescriptor], values: &[Value]) -> Result<()> {
    if fields.len() != values.len() {
        return Err(FlatError::Argument(format!(
            "expected {} values, got {}",
            fields.len(),
            values.len()
        )));
    }
    Ok(())
}

fn mismatch(field: &FieldDescriptor) -> FlatError {
    if !field.field_type.is_implemented() {
        return FlatError::NotImplemented(field.field_type);
    }
    FlatError::TypeMismatch {
        field: field.name.clone(),
        expected: field.field_type,
    }
}

fn string_len(field: &FieldDescriptor, len: usize) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| FlatError::Argument(format!("field '{}' too long: {} bytes", field.name, len)))
}

/// Truncate on a char boundary, then pad with NUL to exactly `length` bytes
fn fit_to_length(text: &str, length: usize) -> Vec<u8> {
    let mut end = text.len().min(length);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let mut bytes = Vec::with_capacity(length);
    bytes.extend_from_slice(&text.as_bytes()[..end]);
    bytes.resize(length, 0);
    bytes
}

fn ensure_remaining(buf: &[u8], needed: usize, what: &str) -> Result<()> {
    if buf.len() < needed {
        return Err(FlatError::Corruption(format!(
            "record truncated reading '{}': expected {} bytes, got {}",
            what,
            needed,
            buf.len()
        )));
    }
    Ok(())
}
