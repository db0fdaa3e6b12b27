//! Process-wide mount registry
//!
//! A backing store mounted under a prefix is process-wide state: two live
//! caches mirroring the same store at the same prefix would overwrite each
//! other's persists. The registry makes that state explicit. A
//! [`MountGuard`] is claimed before mounting and released when the owning
//! log has completed its final sync.
//!
//! Entries are keyed by `(backing location, prefix)`.

use std::collections::HashSet;

use keepsake_core::{Error, Result};
use keepsake_storage::BackingStore;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::debug;

static ACTIVE_MOUNTS: Lazy<Mutex<HashSet<String>>> = Lazy::new(|| Mutex::new(HashSet::new()));

fn key(backing: &dyn BackingStore, prefix: &str) -> String {
    format!("{}#{}", backing.location(), prefix.trim_end_matches('/'))
}

/// Exclusive claim on a `(backing location, prefix)` pair
#[derive(Debug)]
pub struct MountGuard {
    key: String,
    prefix: String,
}

impl MountGuard {
    /// Claim `prefix` on `backing` for this process
    ///
    /// Fails with [`Error::AlreadyMounted`] while another guard holds it.
    pub fn claim(backing: &dyn BackingStore, prefix: &str) -> Result<Self> {
        let key = key(backing, prefix);
        let mut active = ACTIVE_MOUNTS.lock();
        if !active.insert(key.clone()) {
            return Err(Error::AlreadyMounted(key));
        }
        debug!(mount = %key, "Claimed mount");
        Ok(Self {
            key,
            prefix: prefix.trim_end_matches('/').to_string(),
        })
    }

    /// Mounted prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Drop for MountGuard {
    fn drop(&mut self) {
        ACTIVE_MOUNTS.lock().remove(&self.key);
        debug!(mount = %self.key, "Released mount");
    }
}

/// Check whether `prefix` on `backing` is currently claimed
pub fn is_mounted(backing: &dyn BackingStore, prefix: &str) -> bool {
    ACTIVE_MOUNTS.lock().contains(&key(backing, prefix))
}
