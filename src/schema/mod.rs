//! Schema Module
//!
//! Field descriptors and the descriptor area of the data file.
//!
//! ## Responsibilities
//! - Declare the ordered (name, type, length) fields of a table
//! - Persist descriptors between the header and the record area
//! - Rebuild the in-memory field list on open
//! - Refuse layout changes once records exist
//!
//! ## Descriptor Format
//! ```text
//! ┌──────────┬────────┬───────┬──────┬────────┬────┬──────────┬──────────┐
//! │Offset(1) │Status(1)│Order(1)│Type(1)│Length(1)│PK(1)│NameLen(v)│   Name   │
//! └──────────┴────────┴───────┴──────┴────────┴────┴──────────┴──────────┘
//! ```
//! `Offset` is the size of the slot in bytes and chains to the next
//! descriptor. `Length` is signed: -1 marks a variable-length string.

mod area;
mod descriptor;

use std::fmt;
use std::str::FromStr;

use crate::error::FlatError;

pub use area::DescriptorArea;
pub use descriptor::{FieldDescriptor, Schema, VARIABLE_LENGTH};

/// Field type codes stored in the descriptor `Type` byte
///
/// Only `Int16`, `Int32` and `String` have record encodings; the remaining
/// codes are reserved and fail with [`FlatError::NotImplemented`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FieldType {
    Empty = 0,
    Blob = 1,
    Boolean = 3,
    Int16 = 7,
    Int32 = 9,
    Int64 = 11,
    Double = 14,
    String = 18,
}

impl FieldType {
    /// Map a stored type code back to a field type
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(FieldType::Empty),
            1 => Some(FieldType::Blob),
            3 => Some(FieldType::Boolean),
            7 => Some(FieldType::Int16),
            9 => Some(FieldType::Int32),
            11 => Some(FieldType::Int64),
            14 => Some(FieldType::Double),
            18 => Some(FieldType::String),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whether records can carry values of this type
    pub fn is_implemented(self) -> bool {
        matches!(self, FieldType::Int16 | FieldType::Int32 | FieldType::String)
    }

    fn as_str(self) -> &'static str {
        match self {
            FieldType::Empty => "empty",
            FieldType::Blob => "blob",
            FieldType::Boolean => "bool",
            FieldType::Int16 => "int16",
            FieldType::Int32 => "int32",
            FieldType::Int64 => "int64",
            FieldType::Double => "double",
            FieldType::String => "string",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = FlatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blob" => Ok(FieldType::Blob),
            "bool" | "boolean" => Ok(FieldType::Boolean),
            "int16" | "i16" | "short" => Ok(FieldType::Int16),
            "int32" | "i32" | "int" => Ok(FieldType::Int32),
            "int64" | "i64" | "long" => Ok(FieldType::Int64),
            "double" | "f64" => Ok(FieldType::Double),
            "string" | "str" | "text" => Ok(FieldType::String),
            other => Err(FlatError::Argument(format!("unknown field type '{}'", other))),
        }
    }
}
