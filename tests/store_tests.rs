//! Tests for the typed Store
//!
//! These tests verify:
//! - Record round trips through a declared schema
//! - Initialisation, reuse and reset of the backing table
//! - Schema mismatch detection on open

use flatstore::store::next_field;
use flatstore::{Config, FlatError, Placement, Record, Result, Schema, Store, Value};
use tempfile::TempDir;

// =============================================================================
// Record Types
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Person {
    id: i32,
    age: i16,
    name: String,
}

impl Record for Person {
    fn schema() -> Schema {
        Schema::new().int32("Id").int16("Age").string("Name")
    }

    fn to_row(&self) -> Vec<Value> {
        vec![self.id.into(), self.age.into(), self.name.clone().into()]
    }

    fn from_row(row: Vec<Value>) -> Result<Self> {
        let mut row = row.into_iter();
        Ok(Self {
            id: next_field(&mut row)?,
            age: next_field(&mut row)?,
            name: next_field(&mut row)?,
        })
    }
}

#[derive(Debug, PartialEq)]
struct Tag {
    code: String,
}

impl Record for Tag {
    fn schema() -> Schema {
        Schema::new().fixed_string("Code", 3)
    }

    fn to_row(&self) -> Vec<Value> {
        vec![self.code.as_str().into()]
    }

    fn from_row(row: Vec<Value>) -> Result<Self> {
        let mut row = row.into_iter();
        Ok(Self {
            code: next_field(&mut row)?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn config_in(temp_dir: &TempDir) -> Config {
    Config::builder().dir(temp_dir.path()).name("Person").build()
}

fn person(id: i32, name: &str) -> Person {
    Person {
        id,
        age: 30,
        name: name.to_string(),
    }
}

fn setup_store() -> (TempDir, Store<Person>) {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::open(config_in(&temp_dir)).unwrap();
    (temp_dir, store)
}

// =============================================================================
// CRUD Tests
// =============================================================================

#[test]
fn test_create_and_read() {
    let (_temp, store) = setup_store();

    assert!(store.is_empty().unwrap());
    assert_eq!(store.create(&person(1, "hello")).unwrap(), 0);
    assert_eq!(store.create(&person(2, "hi")).unwrap(), 1);

    assert_eq!(store.len().unwrap(), 2);
    assert_eq!(store.read(1).unwrap(), Some(person(2, "hi")));
}

#[test]
fn test_read_empty_store() {
    let (_temp, store) = setup_store();
    assert_eq!(store.read(0).unwrap(), None);
}

#[test]
fn test_update_and_delete() {
    let (_temp, store) = setup_store();
    store.create(&person(1, "a")).unwrap();
    store.create(&person(2, "b")).unwrap();

    assert_eq!(
        store.update(0, &person(1, "a longer name")).unwrap(),
        Placement::Relocated
    );
    assert_eq!(store.update(1, &person(3, "c")).unwrap(), Placement::InPlace);
    store.delete(0).unwrap();

    assert_eq!(store.len().unwrap(), 1);
    assert_eq!(store.read(0).unwrap(), Some(person(3, "c")));
}

#[test]
fn test_insert_and_iter() {
    let (_temp, store) = setup_store();
    store.create(&person(1, "a")).unwrap();
    store.create(&person(3, "c")).unwrap();
    store.insert(1, &person(2, "b")).unwrap();

    let ids: Vec<i32> = store.iter().map(|p| p.unwrap().id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn test_fixed_length_record() {
    let temp_dir = TempDir::new().unwrap();
    let store: Store<Tag> =
        Store::open(Config::builder().dir(temp_dir.path()).name("Tag").build()).unwrap();

    store.create(&Tag { code: "ABCD".into() }).unwrap();
    store.create(&Tag { code: "X".into() }).unwrap();

    assert_eq!(store.read(0).unwrap(), Some(Tag { code: "ABC".into() }));
    assert_eq!(store.read(1).unwrap(), Some(Tag { code: "X\0\0".into() }));
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_reopen_existing() {
    let (temp, store) = setup_store();
    store.create(&person(1, "kept")).unwrap();
    drop(store);

    let store: Store<Person> = Store::open(config_in(&temp)).unwrap();
    assert_eq!(store.len().unwrap(), 1);
    assert_eq!(store.read(0).unwrap(), Some(person(1, "kept")));

    drop(store);
    let store: Store<Person> = Store::open_existing(config_in(&temp)).unwrap();
    assert_eq!(store.len().unwrap(), 1);
}

#[test]
fn test_open_with_reset_discards_rows() {
    let (temp, store) = setup_store();
    store.create(&person(1, "gone")).unwrap();
    drop(store);

    let store: Store<Person> = Store::open_with_reset(config_in(&temp), true).unwrap();
    assert!(store.is_empty().unwrap());
    assert_eq!(store.table().field_count().unwrap(), 3);
}

#[test]
fn test_open_existing_missing() {
    let temp_dir = TempDir::new().unwrap();
    let result = Store::<Person>::open_existing(config_in(&temp_dir));
    assert!(matches!(result, Err(FlatError::NotFound(_))));
}

#[test]
fn test_schema_mismatch_on_open() {
    let (temp, store) = setup_store();
    drop(store);

    let result = Store::<Tag>::open(config_in(&temp));
    assert!(matches!(result, Err(FlatError::InvalidOperation(_))));
}

#[test]
fn test_clear_and_close() {
    let (temp, store) = setup_store();
    store.create(&person(1, "a")).unwrap();

    assert!(store.clear().unwrap());
    assert!(store.is_empty().unwrap());

    assert!(store.close().unwrap());
    assert!(!config_in(&temp).data_path().exists());
}

// =============================================================================
// Conversion Tests
// =============================================================================

#[test]
fn test_next_field_errors() {
    let mut short = vec![Value::Int32(1)].into_iter();
    let _: i32 = next_field(&mut short).unwrap();
    assert!(matches!(next_field::<i32>(&mut short), Err(FlatError::Argument(_))));

    let mut wrong = vec![Value::Text("x".into())].into_iter();
    assert!(matches!(next_field::<i16>(&mut wrong), Err(FlatError::Argument(_))));
}
