//! Persistent text log
//!
//! [`PersistentLog`] appends text to named resources on a storage medium,
//! reads them back as bounded chunks, and asks write-back media to push
//! buffered writes to durable storage.
//!
//! # Lifecycle
//!
//! ```text
//! open():     claim mounts ─► mount ─► initial Load sync ─► start worker
//! append():   open(append) ─► write ─► close ─► durability policy
//! read_all(): open(read) ─► LogReader (chunks until EOF) ─► close
//! shutdown(): final Persist sync ─► stop worker ─► release mounts
//! ```
//!
//! One writer and one reader at a time; concurrent writers to the same
//! resource need external locking.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use keepsake_core::{Error, ResourceName, Result, SyncDirection, SyncToken};
use keepsake_durability::{DurabilityMode, SyncStats, SyncWorker};
use keepsake_storage::{MediumKind, StorageMedium};
use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};

use crate::builder::LogBuilder;
use crate::mounts::MountGuard;
use crate::reader::LogReader;

/// Default upper bound on the size of a read chunk
pub const DEFAULT_CHUNK_SIZE: usize = 31;

/// Append-only text log over a storage medium
pub struct PersistentLog {
    medium: Arc<dyn StorageMedium>,
    worker: SyncWorker,
    chunk_size: usize,
    mounts: Mutex<Vec<MountGuard>>,
    closed: AtomicBool,
}

impl PersistentLog {
    /// Create a builder for log configuration
    pub fn builder() -> LogBuilder {
        LogBuilder::new()
    }

    /// Open a log whose resources are files under `root`
    pub fn open(root: impl AsRef<std::path::Path>) -> Result<Self> {
        LogBuilder::new().path(root).open()
    }

    /// Create an in-memory log with no backing store and no durability
    pub fn ephemeral() -> Result<Self> {
        LogBuilder::new().virtual_fs().no_durability().open()
    }

    pub(crate) fn from_parts(
        medium: Arc<dyn StorageMedium>,
        worker: SyncWorker,
        chunk_size: usize,
        mounts: Vec<MountGuard>,
    ) -> Self {
        Self {
            medium,
            worker,
            chunk_size,
            mounts: Mutex::new(mounts),
            closed: AtomicBool::new(false),
        }
    }

    /// Append `text` to `resource`, creating it if absent
    ///
    /// No delimiter is added; include `\n` in `text` for line-oriented logs.
    /// In strict mode this blocks until the resulting sync completes, so it
    /// must not be called from inside an async task in that mode.
    pub fn append_line(&self, resource: &str, text: &str) -> Result<()> {
        self.append(resource, text.as_bytes())
    }

    /// Append raw bytes to `resource`, creating it if absent
    pub fn append(&self, resource: &str, bytes: &[u8]) -> Result<()> {
        self.ensure_open()?;
        let name = ResourceName::new(resource)?;

        let mut handle = self.medium.open_append(&name)?;
        let written = handle.write(bytes);
        let closed = handle.close();
        let written = written?;
        if written != bytes.len() {
            return Err(Error::ShortWrite {
                resource: name.to_string(),
                written,
                expected: bytes.len(),
            });
        }
        closed?;
        trace!(resource = %name, bytes = written, "Appended");

        if let Some(token) = self.worker.note_append() {
            if self.worker.mode().requires_immediate_sync() {
                token.wait()?;
            }
        }
        Ok(())
    }

    /// Open `resource` for a chunked, single-pass read
    ///
    /// Fails with [`Error::NotFound`] if nothing was ever appended to it.
    pub fn read_all(&self, resource: &str) -> Result<LogReader> {
        self.ensure_open()?;
        let name = ResourceName::new(resource)?;
        let handle = self.medium.open_read(&name)?;
        Ok(LogReader::new(name, handle, self.chunk_size))
    }

    /// Read the whole content of `resource` into memory
    pub fn read_to_vec(&self, resource: &str) -> Result<Vec<u8>> {
        self.read_all(resource)?.into_bytes()
    }

    /// Stream `resource` chunk by chunk into `out`
    pub fn stream_to<W: Write + ?Sized>(&self, resource: &str, out: &mut W) -> Result<u64> {
        self.read_all(resource)?.copy_to(out)
    }

    /// Check whether `resource` exists
    pub fn exists(&self, resource: &str) -> Result<bool> {
        let name = ResourceName::new(resource)?;
        Ok(self.medium.exists(&name))
    }

    /// Ask the medium to push buffered writes to durable storage
    ///
    /// Never blocks. Drop the token for fire-and-forget, or wait on / await
    /// it to know the data is durable. On a synchronous medium the token is
    /// already complete.
    pub fn request_durable_sync(&self) -> SyncToken {
        if self.closed.load(Ordering::Acquire) {
            return SyncToken::ready(Err(Error::Closed));
        }
        debug!(medium = %self.medium.kind(), "Durable sync requested");
        self.worker.request(SyncDirection::Persist)
    }

    /// Request a durable sync and wait for it
    pub fn flush(&self) -> Result<()> {
        self.request_durable_sync().wait()
    }

    /// Final sync, stop the worker and release mounts
    ///
    /// Idempotent. After shutdown every operation fails with [`Error::Closed`].
    pub fn shutdown(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let result = self.worker.shutdown();
        let released: Vec<MountGuard> = std::mem::take(&mut *self.mounts.lock());
        info!(
            mounts = released.len(),
            flushes = self.worker.stats().flushes(),
            "Log shut down"
        );
        drop(released);
        result
    }

    /// Check whether the log has been shut down
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Durability mode in effect
    pub fn durability_mode(&self) -> DurabilityMode {
        self.worker.mode()
    }

    /// Kind of storage medium
    pub fn medium_kind(&self) -> MediumKind {
        self.medium.kind()
    }

    /// Whether the medium buffers writes until a durable sync
    pub fn is_write_back(&self) -> bool {
        self.medium.is_write_back()
    }

    /// Upper bound on read chunk size
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Mounted prefixes
    pub fn mounts(&self) -> Vec<String> {
        self.mounts.lock().iter().map(|g| g.prefix().to_string()).collect()
    }

    /// Sync worker counters
    pub fn sync_stats(&self) -> &SyncStats {
        self.worker.stats()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Closed);
        }
        Ok(())
    }
}

impl Drop for PersistentLog {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(error = %e, "Shutdown on drop failed");
        }
    }
}

impl std::fmt::Debug for PersistentLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentLog")
            .field("medium", &self.medium.kind())
            .field("durability", &self.worker.mode())
            .field("chunk_size", &self.chunk_size)
            .field("closed", &self.is_closed())
            .finish()
    }
}
