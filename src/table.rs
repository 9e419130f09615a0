//! Table Module
//!
//! The record store handler that coordinates the data file, the descriptor
//! area and the index file for one table.
//!
//! ## Responsibilities
//! - File pair lifecycle (open / new / reset / clear / close)
//! - Schema mutation while the table is empty
//! - Record CRUD with append-only allocation
//! - Lazy iteration in logical row order

use std::fs;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::{Config, SyncStrategy};
use crate::error::{FlatError, Result};
use crate::index::{IndexEntry, IndexFile};
use crate::schema::{DescriptorArea, FieldDescriptor};
use crate::storage::{decode_record, encode_record, DataFile, Header, Status, Value};

/// Where an updated record ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Rewritten inside its existing allocation
    InPlace,

    /// Appended at the high-water mark; the old bytes are marked spare
    Relocated,
}

/// Handle on one table (a data file + index file pair)
///
/// ## Concurrency Model: one exclusive lock per handle
///
/// Every public operation takes `state` for its whole duration, so reads
/// and writes against the same handle run in lock-acquisition order. There
/// is no cross-process locking: two processes opening the same pair can
/// corrupt it.
///
/// ## Allocation
///
/// Records are only ever appended at `Header::pointer`. An update that
/// fits its allocation is rewritten in place; a larger one is relocated.
/// Deleted and superseded bytes are never reclaimed.
pub struct Table {
    config: Config,
    state: Mutex<Option<OpenTable>>,
}

/// Everything held while the pair is open
struct OpenTable {
    header: Header,
    fields: DescriptorArea,
    data: DataFile,
    index: IndexFile,
    sync_strategy: SyncStrategy,
}

impl Table {
    /// Create a closed handle; no files are touched
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: Mutex::new(None),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Open an existing file pair
    ///
    /// Returns `Ok(false)` when the data file does not exist.
    pub fn open(&self) -> Result<bool> {
        let mut state = self.state.lock();

        let data_path = self.config.data_path();
        if !data_path.exists() {
            debug!(path = %data_path.display(), "data file not found");
            return Ok(false);
        }

        let mut data = DataFile::open(&data_path)?;
        let header = data.read_header()?;
        let fields = DescriptorArea::load(&mut data, &header)?;
        let high_water = header.record_offset(header.pointer);
        if data.len()? < high_water {
            return Err(FlatError::Corruption(format!(
                "data file ends before its high-water mark {}",
                high_water
            )));
        }

        let index_path = self.config.index_path();
        if !index_path.exists() {
            return Err(FlatError::NotFound(index_path));
        }
        let index = IndexFile::open(&index_path)?;
        let entries = index.entry_count()?;
        if entries != header.size as usize {
            return Err(FlatError::Corruption(format!(
                "header records {} rows but index holds {} entries",
                header.size, entries
            )));
        }

        info!(
            path = %data_path.display(),
            rows = header.size,
            fields = fields.len(),
            pointer = header.pointer,
            "table opened"
        );

        *state = Some(OpenTable {
            header,
            fields,
            data,
            index,
            sync_strategy: self.config.sync_strategy,
        });
        Ok(true)
    }

    /// Create a fresh file pair, only if the data file does not exist yet
    pub fn create_new(&self) -> Result<bool> {
        let mut state = self.state.lock();
        if self.config.data_path().exists() {
            return Ok(false);
        }
        *state = Some(self.init_files()?);
        info!(path = %self.config.data_path().display(), "table created");
        Ok(true)
    }

    /// Create or truncate the file pair, discarding schema and rows
    pub fn reset(&self) -> Result<bool> {
        let mut state = self.state.lock();
        *state = Some(self.init_files()?);
        info!(path = %self.config.data_path().display(), "table reset");
        Ok(true)
    }

    /// Drop every row but keep the schema
    ///
    /// Returns `Ok(false)` when the handle is not open.
    pub fn clear(&self) -> Result<bool> {
        let mut state = self.state.lock();
        let Some(table) = state.as_mut() else {
            return Ok(false);
        };

        table.header.size = 0;
        table.header.pointer = 0;
        table.data.write_header(&table.header)?;
        table.data.set_len(u64::from(table.header.data_start))?;
        table.index.reset()?;
        table.sync()?;

        info!(path = %table.data.path().display(), "table cleared");
        Ok(true)
    }

    /// Close the handle and delete both files
    ///
    /// Returns `Ok(false)` when the data file did not exist.
    pub fn close(&self) -> Result<bool> {
        let mut state = self.state.lock();
        *state = None;

        let data_path = self.config.data_path();
        if !data_path.exists() {
            return Ok(false);
        }
        fs::remove_file(&data_path)?;

        let index_path = self.config.index_path();
        if index_path.exists() {
            fs::remove_file(&index_path)?;
        }

        info!(path = %data_path.display(), "table closed and removed");
        Ok(true)
    }

    /// Flush both files to disk
    pub fn sync(&self) -> Result<()> {
        let state = self.state.lock();
        let table = Self::opened_ref(&state)?;
        table.data.sync()?;
        table.index.sync()
    }

    // =========================================================================
    // Schema
    // =========================================================================

    /// Append a field; only legal while the table holds no rows
    pub fn add_field(&self, descriptor: FieldDescriptor) -> Result<()> {
        let mut state = self.state.lock();
        let table = Self::opened(&mut state)?;
        table
            .fields
            .append(&mut table.data, &mut table.header, descriptor)?;
        table.sync()
    }

    /// Mark the field at `index` deleted
    pub fn remove_field(&self, index: usize) -> Result<FieldDescriptor> {
        let mut state = self.state.lock();
        let table = Self::opened(&mut state)?;
        let removed = table.fields.remove(&mut table.data, &table.header, index)?;
        table.sync()?;
        Ok(removed)
    }

    /// Mark the field called `name` deleted
    ///
    /// Returns `Ok(false)` when no live field has that name.
    pub fn remove_field_named(&self, name: &str) -> Result<bool> {
        let mut state = self.state.lock();
        let table = Self::opened(&mut state)?;
        let Some(index) = table.fields.position(name) else {
            return Ok(false);
        };
        table.fields.remove(&mut table.data, &table.header, index)?;
        table.sync()?;
        Ok(true)
    }

    /// Replace the field at `index`
    pub fn set_field(&self, index: usize, descriptor: FieldDescriptor) -> Result<()> {
        let mut state = self.state.lock();
        let table = Self::opened(&mut state)?;
        table
            .fields
            .set(&mut table.data, &mut table.header, index, descriptor)?;
        table.sync()
    }

    pub fn field(&self, index: usize) -> Result<FieldDescriptor> {
        let state = self.state.lock();
        let table = Self::opened_ref(&state)?;
        let field = table.fields.get(index)?.clone();
        Ok(field)
    }

    /// Live fields in order
    pub fn fields(&self) -> Result<Vec<FieldDescriptor>> {
        let state = self.state.lock();
        let table = Self::opened_ref(&state)?;
        Ok(table.fields.descriptors())
    }

    pub fn field_count(&self) -> Result<usize> {
        let state = self.state.lock();
        let table = Self::opened_ref(&state)?;
        Ok(table.fields.len())
    }

    // =========================================================================
    // Records
    // =========================================================================

    /// Append a row, returning its logical row number
    pub fn create(&self, values: &[Value]) -> Result<usize> {
        let mut state = self.state.lock();
        let table = Self::opened(&mut state)?;
        let row = table.header.size as usize;
        table.write_new_row(row, values)?;
        table.sync()?;
        Ok(row)
    }

    /// Insert a row at `row`, shifting later rows up by one
    pub fn insert(&self, row: usize, values: &[Value]) -> Result<()> {
        let mut state = self.state.lock();
        let table = Self::opened(&mut state)?;
        let size = table.header.size as usize;
        if row > size {
            return Err(FlatError::out_of_range(row, size + 1));
        }
        table.write_new_row(row, values)?;
        table.sync()
    }

    /// Read the values of `row`
    ///
    /// Returns `Ok(None)` when the table is empty.
    pub fn read(&self, row: usize) -> Result<Option<Vec<Value>>> {
        let mut state = self.state.lock();
        let table = Self::opened(&mut state)?;
        if table.header.size == 0 {
            return Ok(None);
        }
        table.read_row(row).map(Some)
    }

    /// Overwrite `row`, relocating it when the new encoding is larger
    pub fn update(&self, row: usize, values: &[Value]) -> Result<Placement> {
        let mut state = self.state.lock();
        let table = Self::opened(&mut state)?;
        let placement = table.update_row(row, values)?;
        table.sync()?;
        Ok(placement)
    }

    /// Delete `row`, collapsing later rows down by one
    pub fn delete(&self, row: usize) -> Result<()> {
        let mut state = self.state.lock();
        let table = Self::opened(&mut state)?;
        table.delete_row(row)?;
        table.sync()
    }

    /// Lazy iterator over rows `[0, len)` in logical order
    pub fn rows(&self) -> Rows<'_> {
        Rows {
            table: self,
            cursor: 0,
            done: false,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn is_open(&self) -> bool {
        self.state.lock().is_some()
    }

    /// Number of logical rows
    pub fn len(&self) -> Result<usize> {
        let state = self.state.lock();
        let table = Self::opened_ref(&state)?;
        Ok(table.header.size as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Snapshot of the data file header
    pub fn header(&self) -> Result<Header> {
        let state = self.state.lock();
        let table = Self::opened_ref(&state)?;
        Ok(table.header)
    }

    /// Index entry of `row`
    pub fn index_entry(&self, row: usize) -> Result<IndexEntry> {
        let mut state = self.state.lock();
        let table = Self::opened(&mut state)?;
        let size = table.header.size as usize;
        table.index.read_entry(row, size)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn init_files(&self) -> Result<OpenTable> {
        fs::create_dir_all(&self.config.dir)?;
        let data = DataFile::create(&self.config.data_path())?;
        let index = IndexFile::create(&self.config.index_path())?;
        Ok(OpenTable {
            header: Header::empty(),
            fields: DescriptorArea::empty(),
            data,
            index,
            sync_strategy: self.config.sync_strategy,
        })
    }

    fn opened(state: &mut Option<OpenTable>) -> Result<&mut OpenTable> {
        state
            .as_mut()
            .ok_or_else(|| FlatError::InvalidOperation("table is not open".to_string()))
    }

    fn opened_ref(state: &Option<OpenTable>) -> Result<&OpenTable> {
        state
            .as_ref()
            .ok_or_else(|| FlatError::InvalidOperation("table is not open".to_string()))
    }
}

impl OpenTable {
    /// Encode `values`, index them at `row` and append them to the record area
    fn write_new_row(&mut self, row: usize, values: &[Value]) -> Result<()> {
        let size = self.header.size;
        if size == u16::MAX {
            return Err(FlatError::InvalidOperation(format!(
                "table full: {} rows",
                size
            )));
        }
        if self.fields.is_empty() {
            return Err(FlatError::InvalidOperation(
                "schema has no fields".to_string(),
            ));
        }

        let record = encode_record(&self.fields.descriptors(), values)?;
        let (pointer, length) = self.allocate(record.len())?;
        let entry = IndexEntry::new(size, pointer, length);

        if row == size as usize {
            self.index.append_entry(row, entry)?;
        } else {
            self.index.insert_entry(row, size as usize, entry)?;
        }

        self.header.size += 1;
        self.header.pointer = pointer + length;
        self.data.write_header(&self.header)?;
        self.data
            .write_at(self.header.record_offset(pointer), &record)?;

        debug!(row, pointer, length, size = self.header.size, "row written");
        Ok(())
    }

    fn read_row(&mut self, row: usize) -> Result<Vec<Value>> {
        let entry = self.index.read_entry(row, self.header.size as usize)?;
        let mut bytes = vec![0u8; entry.length as usize];
        self.data
            .read_at(self.header.record_offset(entry.pointer), &mut bytes)?;

        let (status, values) = decode_record(&self.fields.descriptors(), &bytes)?;
        if status != Status::Normal {
            return Err(FlatError::Corruption(format!(
                "row {} points at a {:?} record (pointer {})",
                row, status, entry.pointer
            )));
        }
        Ok(values)
    }

    fn update_row(&mut self, row: usize, values: &[Value]) -> Result<Placement> {
        let size = self.header.size as usize;
        let entry = self.index.read_entry(row, size)?;
        let record = encode_record(&self.fields.descriptors(), values)?;

        if record.len() <= entry.length as usize {
            self.data
                .write_at(self.header.record_offset(entry.pointer), &record)?;
            debug!(row, pointer = entry.pointer, length = record.len(), "row updated in place");
            return Ok(Placement::InPlace);
        }

        let (pointer, length) = self.allocate(record.len())?;
        self.write_status(entry.pointer, Status::Spare)?;
        self.index.update_entry(row, size, pointer, length)?;

        self.header.pointer = pointer + length;
        self.data.write_header(&self.header)?;
        self.data
            .write_at(self.header.record_offset(pointer), &record)?;

        warn!(
            row,
            old_pointer = entry.pointer,
            old_length = entry.length,
            pointer,
            length,
            "row relocated"
        );
        Ok(Placement::Relocated)
    }

    fn delete_row(&mut self, row: usize) -> Result<()> {
        let size = self.header.size as usize;
        let entry = self.index.read_entry(row, size)?;

        self.write_status(entry.pointer, Status::Deleted)?;
        self.header.size -= 1;
        self.data.write_header(&self.header)?;
        self.index.remove_entry(row, size)?;

        debug!(row, pointer = entry.pointer, size = self.header.size, "row deleted");
        Ok(())
    }

    /// Reserve `len` bytes at the high-water mark without moving it yet
    fn allocate(&self, len: usize) -> Result<(u16, u16)> {
        let length = u16::try_from(len).map_err(|_| {
            FlatError::InvalidOperation(format!("record too large: {} bytes", len))
        })?;
        let pointer = self.header.pointer;
        if pointer.checked_add(length).is_none() {
            return Err(FlatError::InvalidOperation(format!(
                "record area full: pointer {} + {} bytes",
                pointer, length
            )));
        }
        Ok((pointer, length))
    }

    fn write_status(&mut self, pointer: u16, status: Status) -> Result<()> {
        self.data
            .write_at(self.header.record_offset(pointer), &[status as u8])
    }

    fn sync(&self) -> Result<()> {
        if self.sync_strategy == SyncStrategy::EveryWrite {
            self.data.sync()?;
            self.index.sync()?;
        }
        Ok(())
    }
}

/// Lazy iterator over the rows of a [`Table`]
///
/// Each step takes the table lock, re-checks the row count and reads one
/// row. Iteration stops after the first error.
pub struct Rows<'a> {
    table: &'a Table,
    cursor: usize,
    done: bool,
}

impl Iterator for Rows<'_> {
    type Item = Result<Vec<Value>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut state = self.table.state.lock();
        let result = match Table::opened(&mut state) {
            Ok(table) if self.cursor >= table.header.size as usize => None,
            Ok(table) => Some(table.read_row(self.cursor)),
            Err(e) => Some(Err(e)),
        };

        match &result {
            Some(Ok(_)) => self.cursor += 1,
            _ => self.done = true,
        }
        result
    }
}
