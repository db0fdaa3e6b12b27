//! Main entry point for keepsake.
//!
//! This module provides the `Keepsake` struct, a persistent text log with a
//! stable error type, and its builder.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use keepsake_engine::{LogBuilder, LogConfig, LogReader, PersistentLog};
use keepsake_storage::{BackingStore, MediumKind, StorageMedium};

use crate::error::{Error, Result};

/// Resource written by [`Keepsake::record_visit`]
pub const VISIT_RESOURCE: &str = "files/count.txt";

/// Line appended by [`Keepsake::record_visit`]
pub const VISIT_LINE: &str = "I was here :)\n";

/// A persistent, append-only text log.
///
/// Create one with [`Keepsake::open`], [`Keepsake::ephemeral`] or
/// [`Keepsake::builder`].
///
/// # Example
///
/// ```ignore
/// use keepsake::prelude::*;
///
/// let log = Keepsake::builder()
///     .virtual_fs()
///     .mount_directory("files", "./state")?
///     .open()?;
///
/// log.append_line("files/count.txt", "I was here :)\n")?;
/// log.stream_to("files/count.txt", &mut std::io::stdout())?;
/// log.request_durable_sync().wait()?;
/// ```
pub struct Keepsake {
    inner: PersistentLog,
}

impl Keepsake {
    /// Open a log whose resources are plain files under `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        Self::builder().path(root).open()
    }

    /// Create an in-memory log that persists nothing.
    ///
    /// # Comparison
    ///
    /// | Method | Storage | Survives restart |
    /// |--------|---------|------------------|
    /// | `Keepsake::ephemeral()` | memory only | No |
    /// | `builder().virtual_fs().mount_directory(..)` | memory + directory | Yes, after sync |
    /// | `Keepsake::open(path)` | files | Yes |
    pub fn ephemeral() -> Result<Self> {
        Ok(Self {
            inner: PersistentLog::ephemeral()?,
        })
    }

    /// Create a builder for log configuration.
    pub fn builder() -> KeepsakeBuilder {
        KeepsakeBuilder::new()
    }

    /// Open a log from a TOML configuration file.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        KeepsakeBuilder::from_config(LogConfig::from_file(path)?)?.open()
    }

    /// Append `text` to `resource`, creating it if absent. No delimiter is added.
    pub fn append_line(&self, resource: &str, text: &str) -> Result<()> {
        self.inner.append_line(resource, text).map_err(Into::into)
    }

    /// Append raw bytes to `resource`, creating it if absent.
    pub fn append(&self, resource: &str, bytes: &[u8]) -> Result<()> {
        self.inner.append(resource, bytes).map_err(Into::into)
    }

    /// Read `resource` as a lazy sequence of bounded chunks.
    pub fn read_all(&self, resource: &str) -> Result<Chunks> {
        Ok(Chunks {
            inner: self.inner.read_all(resource)?,
        })
    }

    /// Read the whole content of `resource`.
    pub fn read_to_vec(&self, resource: &str) -> Result<Vec<u8>> {
        self.inner.read_to_vec(resource).map_err(Into::into)
    }

    /// Stream `resource` into `out`, returning the bytes emitted.
    pub fn stream_to<W: Write + ?Sized>(&self, resource: &str, out: &mut W) -> Result<u64> {
        self.inner.stream_to(resource, out).map_err(Into::into)
    }

    /// Check whether `resource` exists.
    pub fn exists(&self, resource: &str) -> Result<bool> {
        self.inner.exists(resource).map_err(Into::into)
    }

    /// Ask the medium to push buffered writes to durable storage.
    ///
    /// Returns immediately. The token can be dropped, waited on, or awaited.
    pub fn request_durable_sync(&self) -> keepsake_core::SyncToken {
        self.inner.request_durable_sync()
    }

    /// Request a durable sync and wait for it.
    pub fn flush(&self) -> Result<()> {
        self.inner.flush().map_err(Into::into)
    }

    /// Append the visit line, echo the whole log to `out`, then wait for
    /// durable sync.
    ///
    /// Returns the number of bytes echoed.
    pub fn record_visit<W: Write + ?Sized>(&self, out: &mut W) -> Result<u64> {
        self.append_line(VISIT_RESOURCE, VISIT_LINE)?;
        let echoed = self.stream_to(VISIT_RESOURCE, out)?;
        self.flush()?;
        Ok(echoed)
    }

    /// Gracefully close the log.
    ///
    /// Runs the final sync, stops the sync worker and releases mounts.
    /// Later calls are no-ops; other operations fail with [`Error::Closed`].
    pub fn close(&self) -> Result<()> {
        self.inner.shutdown().map_err(Into::into)
    }

    /// Get the current durability mode.
    pub fn durability_mode(&self) -> keepsake_engine::DurabilityMode {
        self.inner.durability_mode()
    }

    /// Get the kind of storage medium.
    pub fn medium_kind(&self) -> MediumKind {
        self.inner.medium_kind()
    }

    /// Mounted prefixes.
    pub fn mounts(&self) -> Vec<String> {
        self.inner.mounts()
    }

    /// Get log metrics.
    pub fn metrics(&self) -> LogMetrics {
        let stats = self.inner.sync_stats();
        LogMetrics {
            syncs_completed: stats.flushes(),
            syncs_failed: stats.failures(),
            requests_coalesced: stats.coalesced(),
        }
    }
}

impl std::fmt::Debug for Keepsake {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.inner, f)
    }
}

/// Sync worker metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogMetrics {
    /// Persist passes run, failed ones included
    pub syncs_completed: u64,
    /// Persist passes that failed
    pub syncs_failed: u64,
    /// Requests answered by another request's pass
    pub requests_coalesced: u64,
}

/// Chunk iterator returned by [`Keepsake::read_all`].
#[derive(Debug)]
pub struct Chunks {
    inner: LogReader,
}

impl Chunks {
    /// Upper bound on chunk size.
    pub fn chunk_size(&self) -> usize {
        self.inner.chunk_size()
    }

    /// Bytes yielded so far.
    pub fn bytes_read(&self) -> u64 {
        self.inner.bytes_read()
    }

    /// Emit every remaining chunk to `out`.
    pub fn copy_to<W: Write + ?Sized>(self, out: &mut W) -> Result<u64> {
        self.inner.copy_to(out).map_err(Into::into)
    }

    /// Collect the remaining content.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        self.inner.into_bytes().map_err(Into::into)
    }
}

impl Iterator for Chunks {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|chunk| chunk.map_err(Error::from))
    }
}

impl std::iter::FusedIterator for Chunks {}

/// Builder for log configuration.
///
/// # Example
///
/// ```ignore
/// // Plain files, written through on every append
/// let log = Keepsake::builder().path("./logs").open()?;
///
/// // Write-back cache mirrored to a directory, flushed in batches
/// let log = Keepsake::builder()
///     .virtual_fs()
///     .mount_directory("files", "./state")?
///     .batched()
///     .open()?;
///
/// // Unit testing: nothing survives
/// let log = Keepsake::ephemeral()?;
/// ```
pub struct KeepsakeBuilder {
    inner: LogBuilder,
}

impl KeepsakeBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            inner: LogBuilder::new(),
        }
    }

    /// Create a builder from a parsed configuration.
    pub fn from_config(config: LogConfig) -> Result<Self> {
        Ok(Self {
            inner: config.into_builder()?,
        })
    }

    /// Store resources as files under `root`.
    pub fn path(mut self, root: impl AsRef<Path>) -> Self {
        self.inner = self.inner.path(root);
        self
    }

    /// Store resources in an in-memory write-back filesystem.
    pub fn virtual_fs(mut self) -> Self {
        self.inner = self.inner.virtual_fs();
        self
    }

    /// Use a caller-supplied storage medium.
    pub fn medium(mut self, medium: Arc<dyn StorageMedium>) -> Self {
        self.inner = self.inner.medium(medium);
        self
    }

    /// Mount `backing` under `prefix`.
    pub fn mount(mut self, prefix: impl Into<String>, backing: impl BackingStore + 'static) -> Self {
        self.inner = self.inner.mount(prefix, backing);
        self
    }

    /// Mount a directory-backed store under `prefix`.
    pub fn mount_directory(mut self, prefix: impl Into<String>, dir: impl AsRef<Path>) -> Result<Self> {
        self.inner = self.inner.mount_directory(prefix, dir)?;
        Ok(self)
    }

    /// Never persist.
    pub fn no_durability(mut self) -> Self {
        self.inner = self.inner.no_durability();
        self
    }

    /// Persist only on explicit request and at close.
    pub fn manual(mut self) -> Self {
        self.inner = self.inner.manual();
        self
    }

    /// Request a sync after every append without waiting (default).
    pub fn after_write(mut self) -> Self {
        self.inner = self.inner.after_write();
        self
    }

    /// Persist every 1000 appends or 100ms.
    pub fn batched(mut self) -> Self {
        self.inner = self.inner.batched();
        self
    }

    /// Persist every `batch_size` appends or `interval_ms` milliseconds.
    pub fn batched_with(mut self, interval_ms: u64, batch_size: usize) -> Self {
        self.inner = self.inner.batched_with(interval_ms, batch_size);
        self
    }

    /// Sync after every append and fail the append if the sync fails.
    pub fn strict(mut self) -> Self {
        self.inner = self.inner.strict();
        self
    }

    /// Set the upper bound on read chunk size.
    pub fn chunk_size(mut self, bytes: usize) -> Self {
        self.inner = self.inner.chunk_size(bytes);
        self
    }

    /// Open the log.
    pub fn open(self) -> Result<Keepsake> {
        Ok(Keepsake {
            inner: self.inner.open()?,
        })
    }
}

impl Default for KeepsakeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
