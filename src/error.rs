//! Error types for flatstore
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::schema::FieldType;

/// Result type alias using FlatError
pub type Result<T> = std::result::Result<T, FlatError>;

/// Unified error type for flatstore operations
#[derive(Debug, Error)]
pub enum FlatError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Corrupted storage: {0}")]
    Corruption(String),

    // -------------------------------------------------------------------------
    // Caller Errors
    // -------------------------------------------------------------------------
    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Type mismatch for field '{field}': expected {expected}")]
    TypeMismatch { field: String, expected: FieldType },

    // -------------------------------------------------------------------------
    // Format Errors
    // -------------------------------------------------------------------------
    #[error("No encoding implemented for field type {0}")]
    NotImplemented(FieldType),
}

impl FlatError {
    /// Shorthand for an [`FlatError::IndexOutOfRange`]
    pub(crate) fn out_of_range(index: usize, len: usize) -> Self {
        FlatError::IndexOutOfRange { index, len }
    }
}
