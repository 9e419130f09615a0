//! Index file manager
//!
//! All row arguments are checked against the caller's logical `size`
//! (the data file header), which must equal the number of stored entries.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::error::{FlatError, Result};

use super::{IndexEntry, KEY_WIDTH};

/// Header size: the key width (u16)
pub const INDEX_HEADER_SIZE: u64 = 2;

/// Handle on the `.idx` file
#[derive(Debug)]
pub struct IndexFile {
    file: File,
    path: PathBuf,
}

impl IndexFile {
    /// Create or truncate the index file to its empty state
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        let mut index = Self {
            file,
            path: path.to_path_buf(),
        };
        index.reset()?;
        Ok(index)
    }

    /// Open an existing index file and check its key width
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let mut index = Self {
            file,
            path: path.to_path_buf(),
        };

        let mut header = [0u8; INDEX_HEADER_SIZE as usize];
        index.read_at(0, &mut header)?;
        let key_width = u16::from_le_bytes(header);
        if key_width != KEY_WIDTH {
            return Err(FlatError::Corruption(format!(
                "{}: unsupported key width {}",
                index.path.display(),
                key_width
            )));
        }
        Ok(index)
    }

    /// Drop every entry, keeping only the header
    pub fn reset(&mut self) -> Result<()> {
        self.write_at(0, &KEY_WIDTH.to_le_bytes())?;
        self.file.set_len(INDEX_HEADER_SIZE)?;
        Ok(())
    }

    /// Number of entries physically present
    pub fn entry_count(&self) -> Result<usize> {
        let len = self.file.metadata()?.len();
        let body = len.checked_sub(INDEX_HEADER_SIZE).ok_or_else(|| {
            FlatError::Corruption(format!("{}: missing header", self.path.display()))
        })?;
        if body % IndexEntry::SIZE as u64 != 0 {
            return Err(FlatError::Corruption(format!(
                "{}: partial entry ({} trailing bytes)",
                self.path.display(),
                body % IndexEntry::SIZE as u64
            )));
        }
        Ok((body / IndexEntry::SIZE as u64) as usize)
    }

    /// Write `entry` as row `size`
    pub fn append_entry(&mut self, size: usize, entry: IndexEntry) -> Result<()> {
        trace!(row = size, ?entry, "index append");
        self.write_at(Self::entry_offset(size), &entry.encode())
    }

    pub fn read_entry(&mut self, row: usize, size: usize) -> Result<IndexEntry> {
        Self::check_row(row, size)?;
        let mut bytes = [0u8; IndexEntry::SIZE];
        self.read_at(Self::entry_offset(row), &mut bytes)?;
        IndexEntry::decode(&bytes)
    }

    /// Point `row` at a relocated record, keeping its key
    pub fn update_entry(
        &mut self,
        row: usize,
        size: usize,
        pointer: u16,
        length: u16,
    ) -> Result<()> {
        let mut entry = self.read_entry(row, size)?;
        entry.pointer = pointer;
        entry.length = length;
        trace!(row, ?entry, "index update");
        self.write_at(Self::entry_offset(row), &entry.encode())
    }

    /// Remove `row`, moving entries `(row, size)` down one slot
    pub fn remove_entry(&mut self, row: usize, size: usize) -> Result<()> {
        Self::check_row(row, size)?;

        let tail = self.read_range(row + 1, size)?;
        self.write_at(Self::entry_offset(row), &tail)?;
        self.file.set_len(Self::entry_offset(size - 1))?;

        trace!(row, shifted = size - row - 1, "index remove");
        Ok(())
    }

    /// Insert `entry` at `row`, moving entries `[row, size)` up one slot
    pub fn insert_entry(&mut self, row: usize, size: usize, entry: IndexEntry) -> Result<()> {
        if row > size {
            return Err(FlatError::out_of_range(row, size + 1));
        }

        let tail = self.read_range(row, size)?;
        self.write_at(Self::entry_offset(row + 1), &tail)?;
        self.write_at(Self::entry_offset(row), &entry.encode())?;

        trace!(row, shifted = size - row, "index insert");
        Ok(())
    }

    pub fn sync(&self) -> Result<()> {
        self.file.sync_data()?;
        Ok(())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn entry_offset(row: usize) -> u64 {
        INDEX_HEADER_SIZE + (row * IndexEntry::SIZE) as u64
    }

    fn check_row(row: usize, size: usize) -> Result<()> {
        if row >= size {
            return Err(FlatError::out_of_range(row, size));
        }
        Ok(())
    }

    /// Raw bytes of entries `[from, to)`
    fn read_range(&mut self, from: usize, to: usize) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; to.saturating_sub(from) * IndexEntry::SIZE];
        if !bytes.is_empty() {
            self.read_at(Self::entry_offset(from), &mut bytes)?;
        }
        Ok(bytes)
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(buf).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => FlatError::Corruption(format!(
                "{}: expected {} bytes at offset {}",
                self.path.display(),
                buf.len(),
                offset
            )),
            _ => FlatError::Io(e),
        })
    }

    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(bytes)?;
        Ok(())
    }
}
