//! Storage Module
//!
//! Byte-level layout of the data file: header, record codec and file access.
//!
//! ## Responsibilities
//! - Read and write the fixed header
//! - Encode value arrays into records and decode them back
//! - Positioned reads and writes against the data file
//!
//! ## File Format
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │ Header (7)                                         │
//! │ ┌─────────┬────────────┬──────────────┬──────────┐ │
//! │ │Size (2) │Pointer (2) │DataStart (2) │Items (1) │ │
//! │ └─────────┴────────────┴──────────────┴──────────┘ │
//! ├────────────────────────────────────────────────────┤
//! │ Field Descriptors (see schema)                     │
//! │ ... (repeated Items times)                         │
//! ├──────────────────────────────────────── DataStart ─┤
//! │ Record Area                                        │
//! │ ┌──────────┬─────────┬─────────┬─────┐             │
//! │ │Status (1)│ Field 0 │ Field 1 │ ... │             │
//! │ └──────────┴─────────┴─────────┴─────┘             │
//! │ ... (no separators between records)                │
//! └──────────────────────────── DataStart + Pointer ───┘
//! ```
//!
//! All integers are little-endian. `Pointer` is relative to `DataStart`.

mod data_file;
mod header;
mod record;
mod value;

pub use data_file::DataFile;
pub use header::{Header, HEADER_SIZE};
pub use record::{decode_record, encode_record, encoded_len, Status};
pub use value::Value;
