//! Append / read round trips

use crate::common::*;
use keepsake::{Error, Keepsake};

// =============================================================================
// BASIC ROUND TRIP
// =============================================================================

#[test]
fn test_hello_on_fresh_resource_disk() {
    let (_dir, log) = disk_log();
    log.append_line("files/count.txt", "hello\n").unwrap();
    assert_eq!(log.read_to_vec("files/count.txt").unwrap(), b"hello\n");
}

#[test]
fn test_hello_on_fresh_resource_virtual() {
    let log = Keepsake::ephemeral().unwrap();
    log.append_line("files/count.txt", "hello\n").unwrap();
    assert_eq!(log.read_to_vec("files/count.txt").unwrap(), b"hello\n");
}

#[test]
fn test_sequential_appends_concatenate() {
    let (_dir, log) = disk_log();
    log.append_line("notes", "first").unwrap();
    log.append_line("notes", " second\n").unwrap();
    assert_eq!(log.read_to_vec("notes").unwrap(), b"first second\n");
}

#[test]
fn test_read_is_repeatable() {
    let (_dir, log) = disk_log();
    log.append_line("notes", "same every time\n").unwrap();
    let first = log.read_to_vec("notes").unwrap();
    let second = log.read_to_vec("notes").unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_embedded_nul_bytes_survive() {
    let (_dir, log) = disk_log();
    let payload = b"before\0after\0\0end".to_vec();
    log.append("bin/blob", &payload).unwrap();
    assert_eq!(log.read_to_vec("bin/blob").unwrap(), payload);
}

#[test]
fn test_nested_resource_creates_directories() {
    let (dir, log) = disk_log();
    log.append_line("a/b/c.txt", "deep").unwrap();
    assert!(dir.path().join("a").join("b").join("c.txt").is_file());
    assert!(log.exists("a/b/c.txt").unwrap());
}

// =============================================================================
// FAILURES
// =============================================================================

#[test]
fn test_read_never_written_fails_on_disk() {
    let (_dir, log) = disk_log();
    let err = log.read_all("missing.txt").unwrap_err();
    assert!(err.is_io_failure());
    assert!(err.is_not_found());
}

#[test]
fn test_read_never_written_fails_on_virtual() {
    let log = Keepsake::ephemeral().unwrap();
    assert!(log.read_all("files/missing").unwrap_err().is_io_failure());
}

#[test]
fn test_malformed_names_rejected() {
    let log = Keepsake::ephemeral().unwrap();
    for bad in ["", "/abs", "a//b", "../escape", "a/./b", "nul\0byte"] {
        let err = log.append_line(bad, "x").unwrap_err();
        assert!(matches!(err, Error::InvalidName(_)), "{:?} -> {:?}", bad, err);
    }
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest::proptest! {
    #![proptest_config(proptest::prelude::ProptestConfig::with_cases(32))]

    #[test]
    fn prop_read_returns_concatenation(parts in proptest::collection::vec(".{0,40}", 1..6)) {
        let (_dir, log) = disk_log();
        for part in &parts {
            log.append_line("prop.txt", part).unwrap();
        }
        proptest::prop_assert_eq!(log.read_to_vec("prop.txt").unwrap(), parts.concat().into_bytes());
    }
}
