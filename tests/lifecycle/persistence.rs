//! Content surviving re-creation of the cache

use crate::common::*;
use keepsake::{Keepsake, MemoryBacking, VISIT_LINE, VISIT_RESOURCE};

#[test]
fn test_synced_content_survives_new_cache() {
    let backing = MemoryBacking::new();
    {
        let log = cached_log(&backing);
        log.append_line("files/count.txt", "I was here :)\n").unwrap();
        log.request_durable_sync().wait().unwrap();
        log.close().unwrap();
    }

    let log = cached_log(&backing);
    assert_eq!(
        log.read_to_vec("files/count.txt").unwrap(),
        b"I was here :)\n"
    );
}

#[test]
fn test_directory_backing_survives_new_cache() {
    let dir = tempfile::tempdir().unwrap();
    let open = || {
        Keepsake::builder()
            .virtual_fs()
            .mount_directory("files", dir.path())
            .unwrap()
            .open()
            .unwrap()
    };

    for _ in 0..3 {
        let log = open();
        let mut out = Vec::new();
        log.record_visit(&mut out).unwrap();
        log.close().unwrap();
    }

    let log = open();
    assert_eq!(
        log.read_to_vec(VISIT_RESOURCE).unwrap(),
        VISIT_LINE.repeat(3).into_bytes()
    );
    assert!(dir.path().join("files").join("count.txt").is_file());
}

#[test]
fn test_visit_echo_grows_each_run() {
    let backing = MemoryBacking::new();
    let mut echoed = Vec::new();
    for _ in 0..3 {
        let log = cached_log(&backing);
        let mut out = Vec::new();
        echoed.push(log.record_visit(&mut out).unwrap());
        assert_eq!(out.len() as u64, *echoed.last().unwrap());
    }
    let line = VISIT_LINE.len() as u64;
    assert_eq!(echoed, vec![line, 2 * line, 3 * line]);
}

#[test]
fn test_no_durability_loses_content() {
    let backing = MemoryBacking::new();
    {
        let log = Keepsake::builder()
            .virtual_fs()
            .mount("files", backing.clone())
            .no_durability()
            .open()
            .unwrap();
        log.append_line("files/lost", "gone\n").unwrap();
        log.flush().unwrap();
        log.close().unwrap();
    }

    assert!(backing.is_empty());
    let log = cached_log(&backing);
    assert!(log.read_all("files/lost").unwrap_err().is_not_found());
}

#[test]
fn test_manual_mode_persists_on_close() {
    let backing = MemoryBacking::new();
    {
        let log = Keepsake::builder()
            .virtual_fs()
            .mount("files", backing.clone())
            .manual()
            .open()
            .unwrap();
        log.append_line("files/m", "kept at close").unwrap();
        log.close().unwrap();
    }
    let log = cached_log(&backing);
    assert_eq!(log.read_to_vec("files/m").unwrap(), b"kept at close");
}

#[test]
fn test_disk_log_reopens_with_content() {
    let dir = tempfile::tempdir().unwrap();
    {
        let log = Keepsake::open(dir.path()).unwrap();
        log.append_line("journal", "one\n").unwrap();
    }
    let log = Keepsake::open(dir.path()).unwrap();
    log.append_line("journal", "two\n").unwrap();
    assert_eq!(log.read_to_vec("journal").unwrap(), b"one\ntwo\n");
}

#[test]
fn test_clashing_name_does_not_stall_directory_sync() {
    let dir = tempfile::tempdir().unwrap();
    let open = || {
        Keepsake::builder()
            .virtual_fs()
            .mount_directory("files", dir.path())
            .unwrap()
            .manual()
            .open()
            .unwrap()
    };

    {
        let log = open();
        log.append_line("files/a", "file\n").unwrap();
        log.flush().unwrap();

        let err = log.append_line("files/a/b", "nested\n").unwrap_err();
        assert!(err.is_io_failure());
        for i in 0..5 {
            log.append_line(&format!("files/z{}", i), "z\n").unwrap();
        }
        log.flush().unwrap();
        log.close().unwrap();
    }

    let log = open();
    assert_eq!(log.read_to_vec("files/a").unwrap(), b"file\n");
    for i in 0..5 {
        assert_eq!(log.read_to_vec(&format!("files/z{}", i)).unwrap(), b"z\n");
    }
    assert!(!log.exists("files/a/b").unwrap());
}

#[test]
fn test_temp_suffix_names_are_rejected() {
    let backing = MemoryBacking::new();
    let log = cached_log(&backing);
    let err = log
        .append_line("files/notes.keepsake-tmp", "lost?\n")
        .unwrap_err();
    assert!(matches!(err, keepsake::Error::InvalidName(_)));
}
