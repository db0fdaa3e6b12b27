//! Process-wide mount registry

use crate::common::*;
use keepsake::{Error, Keepsake, MemoryBacking};

#[test]
fn test_second_live_mount_rejected() {
    let backing = MemoryBacking::new();
    let first = cached_log(&backing);
    assert_eq!(first.mounts(), vec!["files".to_string()]);

    let err = Keepsake::builder()
        .virtual_fs()
        .mount("files", backing.clone())
        .open()
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyMounted(_)));
}

#[test]
fn test_mount_released_by_close() {
    let backing = MemoryBacking::new();
    let first = cached_log(&backing);
    first.close().unwrap();
    let _second = cached_log(&backing);
}

#[test]
fn test_mount_released_by_drop() {
    let backing = MemoryBacking::new();
    drop(cached_log(&backing));
    let _second = cached_log(&backing);
}

#[test]
fn test_same_backing_different_prefixes() {
    let backing = MemoryBacking::new();
    let _files = cached_log(&backing);
    let other = Keepsake::builder()
        .virtual_fs()
        .mount("other", backing.clone())
        .open()
        .unwrap();
    assert_eq!(other.mounts(), vec!["other".to_string()]);
}

#[test]
fn test_same_directory_rejected_twice() {
    let dir = tempfile::tempdir().unwrap();
    let _first = Keepsake::builder()
        .virtual_fs()
        .mount_directory("files", dir.path())
        .unwrap()
        .open()
        .unwrap();
    let err = Keepsake::builder()
        .virtual_fs()
        .mount_directory("files", dir.path())
        .unwrap()
        .open()
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyMounted(_)));
}

#[test]
fn test_mount_on_disk_medium_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let err = Keepsake::builder()
        .path(dir.path())
        .mount("files", MemoryBacking::new())
        .open()
        .unwrap_err();
    assert!(err.is_io_failure());
}
