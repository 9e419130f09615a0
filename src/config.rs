//! Configuration for flatstore
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Configuration for one table (a data file + index file pair)
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Location
    // -------------------------------------------------------------------------
    /// Directory holding the file pair
    /// Internal structure:
    ///   {dir}/
    ///     ├── {name}.dbf         (header, field descriptors, records)
    ///     └── {index_name}.idx   (positional index)
    pub dir: PathBuf,

    /// Base name of the data file
    pub name: String,

    /// Base name of the index file, defaults to `name`
    pub index_name: Option<String>,

    // -------------------------------------------------------------------------
    // Durability
    // -------------------------------------------------------------------------
    /// When to fsync the file pair
    pub sync_strategy: SyncStrategy,
}

/// Sync strategy for the file pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// Leave flushing to the OS
    OsBuffered,

    /// fsync both files after every mutating operation
    EveryWrite,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            name: "Storage".to_string(),
            index_name: None,
            sync_strategy: SyncStrategy::OsBuffered,
        }
    }
}

impl Config {
    const DATA_EXTENSION: &'static str = "dbf";
    const INDEX_EXTENSION: &'static str = "idx";

    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Path of the data file: `{dir}/{name}.dbf`
    pub fn data_path(&self) -> PathBuf {
        self.dir
            .join(format!("{}.{}", self.name, Self::DATA_EXTENSION))
    }

    /// Path of the index file: `{dir}/{index_name}.idx`
    pub fn index_path(&self) -> PathBuf {
        let index_name = self.index_name.as_deref().unwrap_or(&self.name);
        self.dir
            .join(format!("{}.{}", index_name, Self::INDEX_EXTENSION))
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the directory holding the file pair
    pub fn dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.dir = path.into();
        self
    }

    /// Set the data file base name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set a separate index file base name
    pub fn index_name(mut self, name: impl Into<String>) -> Self {
        self.config.index_name = Some(name.into());
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
