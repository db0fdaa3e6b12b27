//! Shared helpers for keepsake integration tests.

#![allow(dead_code)]

use std::time::{Duration, Instant};

use keepsake::{Keepsake, MemoryBacking};
use tempfile::TempDir;

/// Log over plain files in a fresh temp directory
pub fn disk_log() -> (TempDir, Keepsake) {
    let dir = tempfile::tempdir().expect("temp dir");
    let log = Keepsake::open(dir.path()).expect("open disk log");
    (dir, log)
}

/// Write-back log with `backing` mounted at `files`
pub fn cached_log(backing: &MemoryBacking) -> Keepsake {
    Keepsake::builder()
        .virtual_fs()
        .mount("files", backing.clone())
        .open()
        .expect("open cached log")
}

/// Sizes of every chunk `read_all` yields
pub fn chunk_sizes(log: &Keepsake, resource: &str) -> Vec<usize> {
    log.read_all(resource)
        .expect("read_all")
        .map(|chunk| chunk.expect("chunk").len())
        .collect()
}

/// Poll `cond` until it holds or `timeout` passes
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}
