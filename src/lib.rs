//! # flatstore
//!
//! A flat-file, single-table record store with:
//! - A fixed schema persisted in the data file's descriptor area
//! - Append-only record allocation (no compaction, no reclaim)
//! - A positional index mapping logical rows to record offsets
//! - One exclusive lock per table handle
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Store<T: Record> (typed rows)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ positional Vec<Value>
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Table                                 │
//! │              (Mutex per handle, CRUD + schema)               │
//! └───────┬─────────────────────┬─────────────────────┬─────────┘
//!         │                     │                     │
//!         ▼                     ▼                     ▼
//!  ┌─────────────┐       ┌─────────────┐       ┌─────────────┐
//!  │   Schema    │       │   Storage   │       │    Index    │
//!  │ (descriptor │       │  (header +  │       │ (row → ptr, │
//!  │    area)    │       │   records)  │       │    len)     │
//!  └──────┬──────┘       └──────┬──────┘       └──────┬──────┘
//!         └────────── name.dbf ─┘               name.idx
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod schema;
pub mod storage;
pub mod index;
pub mod table;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FlatError, Result};
pub use config::{Config, SyncStrategy};
pub use schema::{FieldDescriptor, FieldType, Schema};
pub use storage::{Status, Value};
pub use table::{Placement, Rows, Table};
pub use store::{Record, Store};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of flatstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
