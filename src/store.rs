//! Typed Store
//!
//! Maps caller-defined record types to and from the positional value
//! arrays a [`Table`] stores. The schema is declared statically by the
//! record type instead of being discovered at runtime.
//!
//! ```no_run
//! use flatstore::{Config, Record, Result, Schema, Store, Value};
//!
//! struct Person {
//!     id: i32,
//!     name: String,
//! }
//!
//! impl Record for Person {
//!     fn schema() -> Schema {
//!         Schema::new().int32("Id").string("Name")
//!     }
//!
//!     fn to_row(&self) -> Vec<Value> {
//!         vec![self.id.into(), self.name.clone().into()]
//!     }
//!
//!     fn from_row(row: Vec<Value>) -> Result<Self> {
//!         let mut row = row.into_iter();
//!         Ok(Self {
//!             id: flatstore::store::next_field(&mut row)?,
//!             name: flatstore::store::next_field(&mut row)?,
//!         })
//!     }
//! }
//!
//! let store = Store::<Person>::open(Config::builder().name("Person").build())?;
//! store.create(&Person { id: 1, name: "hello".into() })?;
//! # Ok::<(), flatstore::FlatError>(())
//! ```

use std::marker::PhantomData;

use tracing::info;

use crate::config::Config;
use crate::error::{FlatError, Result};
use crate::schema::Schema;
use crate::storage::Value;
use crate::table::{Placement, Rows, Table};

/// A type that converts to and from one table row
pub trait Record: Sized {
    /// Ordered fields, matched against the stored schema by position
    fn schema() -> Schema;

    /// One value per schema field, in schema order
    fn to_row(&self) -> Vec<Value>;

    /// Rebuild the record from a decoded row
    fn from_row(row: Vec<Value>) -> Result<Self>;
}

/// Pull the next value of a decoded row and convert it
///
/// Helper for [`Record::from_row`] implementations.
pub fn next_field<T>(row: &mut impl Iterator<Item = Value>) -> Result<T>
where
    T: TryFrom<Value, Error = FlatError>,
{
    let value = row
        .next()
        .ok_or_else(|| FlatError::Argument("row has fewer values than the record".to_string()))?;
    T::try_from(value)
}

/// Typed access to a table of `T` records
pub struct Store<T: Record> {
    table: Table,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Store<T> {
    /// Open the table, initialising it from `T::schema()` if it does not exist
    pub fn open(config: Config) -> Result<Self> {
        Self::open_with_reset(config, false)
    }

    /// Open the table, discarding any existing contents when `reset` is set
    pub fn open_with_reset(config: Config, reset: bool) -> Result<Self> {
        let table = Table::new(config);

        if !table.open()? || reset {
            table.reset()?;
            for field in T::schema().fields() {
                table.add_field(field.clone())?;
            }
            info!(
                path = %table.config().data_path().display(),
                fields = T::schema().len(),
                "store initialised"
            );
        } else {
            Self::check_schema(&table)?;
        }

        Ok(Self {
            table,
            _record: PhantomData,
        })
    }

    /// Open an existing table; fails with `NotFound` if it does not exist
    pub fn open_existing(config: Config) -> Result<Self> {
        let table = Table::new(config);
        if !table.open()? {
            return Err(FlatError::NotFound(table.config().data_path()));
        }
        Self::check_schema(&table)?;
        Ok(Self {
            table,
            _record: PhantomData,
        })
    }

    pub fn create(&self, record: &T) -> Result<usize> {
        self.table.create(&record.to_row())
    }

    pub fn insert(&self, row: usize, record: &T) -> Result<()> {
        self.table.insert(row, &record.to_row())
    }

    /// Read `row`; `Ok(None)` when the table is empty
    pub fn read(&self, row: usize) -> Result<Option<T>> {
        self.table.read(row)?.map(T::from_row).transpose()
    }

    pub fn update(&self, row: usize, record: &T) -> Result<Placement> {
        self.table.update(row, &record.to_row())
    }

    pub fn delete(&self, row: usize) -> Result<()> {
        self.table.delete(row)
    }

    pub fn len(&self) -> Result<usize> {
        self.table.len()
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.table.is_empty()
    }

    /// Lazy iterator over all records in row order
    pub fn iter(&self) -> StoreIter<'_, T> {
        StoreIter {
            rows: self.table.rows(),
            _record: PhantomData,
        }
    }

    /// Drop every record, keeping the schema
    pub fn clear(&self) -> Result<bool> {
        self.table.clear()
    }

    /// Delete the underlying file pair
    pub fn close(self) -> Result<bool> {
        self.table.close()
    }

    /// The untyped table underneath
    pub fn table(&self) -> &Table {
        &self.table
    }

    fn check_schema(table: &Table) -> Result<()> {
        let stored = table.fields()?;
        let declared = T::schema();
        if !declared.matches(&stored) {
            return Err(FlatError::InvalidOperation(format!(
                "stored schema ({} fields) does not match record schema ({} fields)",
                stored.len(),
                declared.len()
            )));
        }
        Ok(())
    }
}

/// Iterator returned by [`Store::iter`]
pub struct StoreIter<'a, T> {
    rows: Rows<'a>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Iterator for StoreIter<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next().map(|row| row.and_then(T::from_row))
    }
}
