//! Shutdown semantics

use crate::common::*;
use keepsake::{Error, Keepsake, MemoryBacking, ResourceName};

#[test]
fn test_close_is_idempotent() {
    let log = Keepsake::ephemeral().unwrap();
    log.close().unwrap();
    log.close().unwrap();
}

#[test]
fn test_operations_after_close_fail() {
    let (_dir, log) = disk_log();
    log.append_line("a", "x").unwrap();
    log.close().unwrap();

    assert_eq!(log.append_line("a", "y").unwrap_err(), Error::Closed);
    assert_eq!(log.read_all("a").unwrap_err(), Error::Closed);
    assert!(log.request_durable_sync().wait().is_err());
}

#[test]
fn test_drop_runs_final_sync() {
    let backing = MemoryBacking::new();
    {
        let log = Keepsake::builder()
            .virtual_fs()
            .mount("files", backing.clone())
            .manual()
            .open()
            .unwrap();
        log.append_line("files/d", "flushed on drop").unwrap();
    }
    assert_eq!(
        backing.get(&ResourceName::new("files/d").unwrap()),
        Some(b"flushed on drop".to_vec())
    );
}

#[test]
fn test_pending_requests_complete_before_close_returns() {
    let backing = MemoryBacking::new();
    let log = cached_log(&backing);
    let tokens: Vec<_> = (0..5)
        .map(|i| {
            log.append_line("files/p", &i.to_string()).unwrap();
            log.request_durable_sync()
        })
        .collect();
    log.close().unwrap();
    for token in tokens {
        token.wait().unwrap();
    }
    assert_eq!(
        backing.get(&ResourceName::new("files/p").unwrap()),
        Some(b"01234".to_vec())
    );
}
