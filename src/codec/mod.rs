//! Codec Module
//!
//! Byte-level encodings shared by the descriptor area, the record area and
//! the CLI.
//!
//! ## Length Codec (LEB128)
//! ```text
//! ┌───────────────┬───────────────┬─────┬───────────────┐
//! │1│ bits 0..7   │1│ bits 7..14  │ ... │0│ last group  │
//! └───────────────┴───────────────┴─────┴───────────────┘
//! ```
//! Least-significant group first; the high bit is set on every byte except
//! the last. A `u32` needs at most five bytes.

pub mod leb128;
