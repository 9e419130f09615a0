//! Data file access
//!
//! Positioned reads and writes against the `.dbf` file.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{FlatError, Result};

use super::{Header, HEADER_SIZE};

/// Handle on the data file
#[derive(Debug)]
pub struct DataFile {
    file: File,
    path: PathBuf,
}

impl DataFile {
    /// Create or truncate the data file and write an empty header
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        let mut data = Self {
            file,
            path: path.to_path_buf(),
        };
        data.write_header(&Header::empty())?;
        Ok(data)
    }

    /// Open an existing data file
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn read_header(&mut self) -> Result<Header> {
        let mut bytes = [0u8; HEADER_SIZE];
        self.read_at(0, &mut bytes)?;
        Header::decode(&bytes)
    }

    pub fn write_header(&mut self, header: &Header) -> Result<()> {
        self.write_at(0, &header.encode())
    }

    /// Fill `buf` from `offset`; running off the end is corruption
    pub fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
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

    pub fn write_at(&mut self, offset: u64, bytes: &[u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(bytes)?;
        Ok(())
    }

    /// Current file length in bytes
    pub fn len(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    pub fn set_len(&mut self, len: u64) -> Result<()> {
        self.file.set_len(len)?;
        Ok(())
    }

    pub fn sync(&self) -> Result<()> {
        self.file.sync_data()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
