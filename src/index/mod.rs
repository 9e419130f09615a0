//! Index Module
//!
//! Positional index mapping logical rows to record-area offsets.
//!
//! ## Responsibilities
//! - One fixed-size entry per logical row, rows `[0, size)` contiguous
//! - Append, read and rewrite single entries
//! - Shift the tail down on delete and up on insert
//!
//! ## File Format
//! ```text
//! ┌──────────────────────┐
//! │ KeyWidth (2)         │
//! ├──────────────────────┤
//! │ Entry 0              │
//! │ ┌───────┬────────┬────────┐
//! │ │Key (2)│Ptr (2) │Len (2) │
//! │ └───────┴────────┴────────┘
//! │ ... (one per row)    │
//! └──────────────────────┘
//! ```
//!
//! `Key` is advisory: the row count when the entry was first written.
//! Lookups are purely positional.

mod entry;
mod file;

pub use entry::{IndexEntry, KEY_WIDTH};
pub use file::{IndexFile, INDEX_HEADER_SIZE};
