//! Durable sync behavior per medium and mode

use std::sync::Arc;
use std::time::Duration;

use crate::common::*;
use keepsake::{
    DurabilityMode, Keepsake, MediumKind, MemoryBacking, ResourceName, VirtualFs,
};
use keepsake_storage::FaultyMedium;

fn name(s: &str) -> ResourceName {
    ResourceName::new(s).unwrap()
}

// =============================================================================
// SYNCHRONOUS MEDIUM
// =============================================================================

#[test]
fn test_sync_on_disk_is_immediate_and_harmless() {
    let (_dir, log) = disk_log();
    assert_eq!(log.medium_kind(), MediumKind::Disk);
    log.append_line("files/count.txt", "I was here :)\n").unwrap();
    let before = log.read_to_vec("files/count.txt").unwrap();

    let mut token = log.request_durable_sync();
    assert!(matches!(token.try_result(), Some(Ok(()))));

    assert_eq!(log.read_to_vec("files/count.txt").unwrap(), before);
}

#[test]
fn test_fire_and_forget_sync() {
    let backing = MemoryBacking::new();
    let log = cached_log(&backing);
    log.append_line("files/a", "x").unwrap();
    drop(log.request_durable_sync());
    log.close().unwrap();
    assert_eq!(backing.get(&name("files/a")), Some(b"x".to_vec()));
}

// =============================================================================
// WRITE-BACK MEDIUM
// =============================================================================

#[test]
fn test_flush_persists_mounted_content() {
    let backing = MemoryBacking::new();
    let log = cached_log(&backing);
    assert_eq!(log.medium_kind(), MediumKind::Virtual);

    log.append_line("files/count.txt", "I was here :)\n").unwrap();
    log.flush().unwrap();
    assert_eq!(
        backing.get(&name("files/count.txt")),
        Some(b"I was here :)\n".to_vec())
    );
}

#[test]
fn test_manual_mode_waits_for_request() {
    let backing = MemoryBacking::new();
    let log = Keepsake::builder()
        .virtual_fs()
        .mount("files", backing.clone())
        .manual()
        .open()
        .unwrap();

    log.append_line("files/a", "pending").unwrap();
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(backing.get(&name("files/a")), None);

    log.request_durable_sync().wait().unwrap();
    assert_eq!(backing.get(&name("files/a")), Some(b"pending".to_vec()));
}

#[test]
fn test_batched_mode_flushes_at_batch_size() {
    let backing = MemoryBacking::new();
    let log = Keepsake::builder()
        .virtual_fs()
        .mount("files", backing.clone())
        .batched_with(60_000, 3)
        .open()
        .unwrap();

    log.append_line("files/b", "1").unwrap();
    log.append_line("files/b", "2").unwrap();
    log.append_line("files/b", "3").unwrap();

    assert!(wait_until(Duration::from_secs(5), || {
        backing.get(&name("files/b")) == Some(b"123".to_vec())
    }));
}

#[test]
fn test_batched_mode_flushes_on_interval() {
    let backing = MemoryBacking::new();
    let log = Keepsake::builder()
        .virtual_fs()
        .mount("files", backing.clone())
        .batched_with(10, 1_000)
        .open()
        .unwrap();
    assert!(matches!(log.durability_mode(), DurabilityMode::Batched { .. }));

    log.append_line("files/t", "tick").unwrap();
    assert!(wait_until(Duration::from_secs(5), || {
        backing.get(&name("files/t")).is_some()
    }));
}

#[test]
fn test_unmounted_resources_stay_volatile() {
    let backing = MemoryBacking::new();
    let log = cached_log(&backing);
    log.append_line("scratch/tmp", "volatile").unwrap();
    log.flush().unwrap();
    assert!(backing.is_empty());
    assert_eq!(log.read_to_vec("scratch/tmp").unwrap(), b"volatile");
}

#[test]
fn test_strict_mode_surfaces_sync_failure() {
    let backing = MemoryBacking::new();
    let faulty = Arc::new(FaultyMedium::new(Arc::new(VirtualFs::new())));
    let log = Keepsake::builder()
        .medium(faulty.clone())
        .mount("files", backing.clone())
        .strict()
        .open()
        .unwrap();

    log.append_line("files/s", "safe\n").unwrap();
    assert_eq!(backing.get(&name("files/s")), Some(b"safe\n".to_vec()));

    faulty.fail_sync(true);
    let err = log.append_line("files/s", "unsafe\n").unwrap_err();
    assert!(err.is_io_failure());
    assert!(log.metrics().syncs_failed >= 1);

    faulty.fail_sync(false);
    log.flush().unwrap();
    assert_eq!(backing.get(&name("files/s")), Some(b"safe\nunsafe\n".to_vec()));
}

#[test]
fn test_short_write_is_io_failure() {
    let faulty = Arc::new(FaultyMedium::new(Arc::new(VirtualFs::new())));
    faulty.limit_writes(Some(2));
    let log = Keepsake::builder().medium(faulty).no_durability().open().unwrap();
    assert!(log.append_line("files/x", "longer").unwrap_err().is_io_failure());
}

#[test]
fn test_concurrent_requests_all_resolve() {
    let backing = MemoryBacking::new();
    let log = Arc::new(cached_log(&backing));
    log.append_line("files/c", "data").unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let log = log.clone();
            std::thread::spawn(move || log.request_durable_sync().wait())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }
    assert_eq!(backing.get(&name("files/c")), Some(b"data".to_vec()));
}

#[tokio::test]
async fn test_sync_token_can_be_awaited() {
    let backing = MemoryBacking::new();
    let log = Keepsake::builder()
        .virtual_fs()
        .mount("files", backing.clone())
        .manual()
        .open()
        .unwrap();

    log.append_line("files/async", "awaited").unwrap();
    log.request_durable_sync().await.unwrap();
    assert_eq!(backing.get(&name("files/async")), Some(b"awaited".to_vec()));
}
