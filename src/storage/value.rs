//! Field values
//!
//! The positional value array exchanged with callers holds one [`Value`]
//! per schema field.

use std::fmt;

use crate::error::{FlatError, Result};
use crate::schema::FieldType;

/// A single typed field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int16(i16),
    Int32(i32),
    Text(String),
}

impl Value {
    /// Parse text (CLI or bulk input) as a value of `field_type`
    pub fn parse(field_type: FieldType, text: &str) -> Result<Self> {
        match field_type {
            FieldType::Int16 => text
                .trim()
                .parse()
                .map(Value::Int16)
                .map_err(|e| FlatError::Argument(format!("invalid int16 '{}': {}", text, e))),
            FieldType::Int32 => text
                .trim()
                .parse()
                .map(Value::Int32)
                .map_err(|e| FlatError::Argument(format!("invalid int32 '{}': {}", text, e))),
            FieldType::String => Ok(Value::Text(text.to_string())),
            other => Err(FlatError::NotImplemented(other)),
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(v) => Some(*v),
            _ => None,
        }
    }

    fn mismatch(self, expected: FieldType) -> FlatError {
        FlatError::Argument(format!("expected {} value, found {:?}", expected, self))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl TryFrom<Value> for i16 {
    type Error = FlatError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Int16(v) => Ok(v),
            other => Err(other.mismatch(FieldType::Int16)),
        }
    }
}

impl TryFrom<Value> for i32 {
    type Error = FlatError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Int32(v) => Ok(v),
            other => Err(other.mismatch(FieldType::Int32)),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = FlatError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(other.mismatch(FieldType::String)),
        }
    }
}
