//! Tests for the LEB128 length codec
//!
//! These tests verify:
//! - Encoded size at every group boundary
//! - Known byte sequences
//! - Decoding of truncated and overflowing input

use flatstore::codec::leb128;
use flatstore::FlatError;

// =============================================================================
// Size Tests
// =============================================================================

#[test]
fn test_size_boundaries() {
    assert_eq!(leb128::size(0), 1);
    assert_eq!(leb128::size(127), 1);
    assert_eq!(leb128::size(128), 2);
    assert_eq!(leb128::size(16_383), 2);
    assert_eq!(leb128::size(16_384), 3);
    assert_eq!(leb128::size(2_097_151), 3);
    assert_eq!(leb128::size(2_097_152), 4);
    assert_eq!(leb128::size(268_435_455), 4);
    assert_eq!(leb128::size(268_435_456), 5);
    assert_eq!(leb128::size(u32::MAX), leb128::MAX_SIZE);
}

#[test]
fn test_size_matches_encoding() {
    for value in [0, 1, 5, 127, 128, 255, 300, 16_384, 65_535, 1 << 21, 1 << 28, u32::MAX] {
        assert_eq!(leb128::encode(value).len(), leb128::size(value), "value {}", value);
    }
}

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_encode_known_values() {
    assert_eq!(leb128::encode(0), vec![0x00]);
    assert_eq!(leb128::encode(5), vec![0x05]);
    assert_eq!(leb128::encode(127), vec![0x7F]);
    assert_eq!(leb128::encode(128), vec![0x80, 0x01]);
    assert_eq!(leb128::encode(300), vec![0xAC, 0x02]);
    assert_eq!(leb128::encode(u32::MAX), vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
}

#[test]
fn test_only_last_byte_lacks_continuation_bit() {
    let bytes = leb128::encode(1 << 28);
    let (last, rest) = bytes.split_last().unwrap();
    assert!(rest.iter().all(|b| b & 0x80 != 0));
    assert_eq!(last & 0x80, 0);
}

#[test]
fn test_write_appends_to_buffer() {
    let mut buf = vec![0xAA];
    leb128::write(300, &mut buf);
    assert_eq!(buf, vec![0xAA, 0xAC, 0x02]);
}

// =============================================================================
// Decoding Tests
// =============================================================================

#[test]
fn test_read_decodes_encoded_values() {
    for value in [0, 127, 128, 300, 65_535, 1 << 21, (1 << 28) - 1, u32::MAX] {
        let bytes = leb128::encode(value);
        let mut buf = bytes.as_slice();
        assert_eq!(leb128::read(&mut buf).unwrap(), value);
        assert!(buf.is_empty());
    }
}

#[test]
fn test_read_stops_at_terminator() {
    let bytes = [0xAC, 0x02, 0x68, 0x69];
    let mut buf = &bytes[..];
    assert_eq!(leb128::read(&mut buf).unwrap(), 300);
    assert_eq!(buf, &[0x68, 0x69]);
}

#[test]
fn test_read_truncated() {
    let mut buf: &[u8] = &[0x80, 0x80];
    assert!(matches!(leb128::read(&mut buf), Err(FlatError::Corruption(_))));

    let mut empty: &[u8] = &[];
    assert!(matches!(leb128::read(&mut empty), Err(FlatError::Corruption(_))));
}

#[test]
fn test_read_overflow() {
    let mut too_big: &[u8] = &[0xFF, 0xFF, 0xFF, 0xFF, 0x1F];
    assert!(matches!(leb128::read(&mut too_big), Err(FlatError::Corruption(_))));

    let mut too_long: &[u8] = &[0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
    assert!(matches!(leb128::read(&mut too_long), Err(FlatError::Corruption(_))));
}
