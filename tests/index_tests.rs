//! Tests for the IndexFile manager
//!
//! These tests verify:
//! - Empty-state layout
//! - Append / read / update of single entries
//! - Tail shifting on remove and insert
//! - Key width validation on open

use std::fs;

use flatstore::index::{IndexEntry, IndexFile, INDEX_HEADER_SIZE, KEY_WIDTH};
use flatstore::FlatError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn entry(n: u16) -> IndexEntry {
    IndexEntry::new(n, n * 10, n + 5)
}

fn setup_index(count: u16) -> (TempDir, IndexFile) {
    let temp_dir = TempDir::new().unwrap();
    let mut index = IndexFile::create(&temp_dir.path().join("test.idx")).unwrap();
    for n in 0..count {
        index.append_entry(n as usize, entry(n)).unwrap();
    }
    (temp_dir, index)
}

fn all_entries(index: &mut IndexFile, size: usize) -> Vec<IndexEntry> {
    (0..size).map(|row| index.read_entry(row, size).unwrap()).collect()
}

// =============================================================================
// Layout Tests
// =============================================================================

#[test]
fn test_create_writes_key_width_header() {
    let (temp, index) = setup_index(0);
    let bytes = fs::read(temp.path().join("test.idx")).unwrap();

    assert_eq!(bytes, KEY_WIDTH.to_le_bytes().to_vec());
    assert_eq!(bytes.len() as u64, INDEX_HEADER_SIZE);
    assert_eq!(index.entry_count().unwrap(), 0);
}

#[test]
fn test_entry_layout_is_little_endian() {
    let (temp, _index) = setup_index(0);
    let path = temp.path().join("test.idx");
    let mut index = IndexFile::open(&path).unwrap();
    index.append_entry(0, IndexEntry::new(1, 0x0203, 0x0405)).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes, vec![2, 0, 1, 0, 0x03, 0x02, 0x05, 0x04]);
}

// =============================================================================
// Entry Tests
// =============================================================================

#[test]
fn test_append_and_read() {
    let (_temp, mut index) = setup_index(3);

    assert_eq!(index.entry_count().unwrap(), 3);
    assert_eq!(all_entries(&mut index, 3), vec![entry(0), entry(1), entry(2)]);
}

#[test]
fn test_read_out_of_range() {
    let (_temp, mut index) = setup_index(2);

    let err = index.read_entry(2, 2).unwrap_err();
    assert!(matches!(err, FlatError::IndexOutOfRange { index: 2, len: 2 }));
}

#[test]
fn test_update_keeps_key() {
    let (_temp, mut index) = setup_index(3);

    index.update_entry(1, 3, 400, 12).unwrap();

    assert_eq!(index.read_entry(1, 3).unwrap(), IndexEntry::new(1, 400, 12));
    assert_eq!(index.read_entry(0, 3).unwrap(), entry(0));
    assert_eq!(index.read_entry(2, 3).unwrap(), entry(2));
}

// =============================================================================
// Shift Tests
// =============================================================================

#[test]
fn test_remove_shifts_tail_down() {
    let (_temp, mut index) = setup_index(5);

    index.remove_entry(1, 5).unwrap();

    assert_eq!(index.entry_count().unwrap(), 4);
    assert_eq!(
        all_entries(&mut index, 4),
        vec![entry(0), entry(2), entry(3), entry(4)]
    );
}

#[test]
fn test_remove_last_entry() {
    let (_temp, mut index) = setup_index(2);

    index.remove_entry(1, 2).unwrap();
    assert_eq!(index.entry_count().unwrap(), 1);
    assert_eq!(index.read_entry(0, 1).unwrap(), entry(0));

    index.remove_entry(0, 1).unwrap();
    assert_eq!(index.entry_count().unwrap(), 0);
}

#[test]
fn test_remove_out_of_range() {
    let (_temp, mut index) = setup_index(2);
    assert!(matches!(
        index.remove_entry(2, 2),
        Err(FlatError::IndexOutOfRange { .. })
    ));
    assert_eq!(index.entry_count().unwrap(), 2);
}

#[test]
fn test_insert_shifts_tail_up() {
    let (_temp, mut index) = setup_index(3);
    let new = IndexEntry::new(9, 90, 14);

    index.insert_entry(1, 3, new).unwrap();

    assert_eq!(index.entry_count().unwrap(), 4);
    assert_eq!(
        all_entries(&mut index, 4),
        vec![entry(0), new, entry(1), entry(2)]
    );
}

#[test]
fn test_insert_at_front_and_end() {
    let (_temp, mut index) = setup_index(2);

    index.insert_entry(0, 2, entry(7)).unwrap();
    index.insert_entry(3, 3, entry(8)).unwrap();

    assert_eq!(
        all_entries(&mut index, 4),
        vec![entry(7), entry(0), entry(1), entry(8)]
    );
}

#[test]
fn test_insert_out_of_range() {
    let (_temp, mut index) = setup_index(2);
    assert!(matches!(
        index.insert_entry(3, 2, entry(3)),
        Err(FlatError::IndexOutOfRange { index: 3, len: 3 })
    ));
}

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_reopen_preserves_entries() {
    let (temp, index) = setup_index(3);
    drop(index);

    let mut index = IndexFile::open(&temp.path().join("test.idx")).unwrap();
    assert_eq!(index.entry_count().unwrap(), 3);
    assert_eq!(index.read_entry(2, 3).unwrap(), entry(2));
}

#[test]
fn test_open_rejects_unknown_key_width() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bad.idx");
    fs::write(&path, [4u8, 0]).unwrap();

    assert!(matches!(IndexFile::open(&path), Err(FlatError::Corruption(_))));
}

#[test]
fn test_partial_entry_is_corruption() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("partial.idx");
    fs::write(&path, [2u8, 0, 1, 0, 2]).unwrap();

    let index = IndexFile::open(&path).unwrap();
    assert!(matches!(index.entry_count(), Err(FlatError::Corruption(_))));
}
