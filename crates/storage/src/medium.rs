//! Storage medium collaborator interface
//!
//! A medium hands out scoped handles for appending to and reading from named
//! resources. Handles report exact byte counts; callers decide what a short
//! count means. Write-back media additionally buffer writes and move them to a
//! durable backing store on [`StorageMedium::sync_to_durable`].

use std::sync::Arc;

use keepsake_core::{Error, IoOp, ResourceName, Result, SyncDirection};

use crate::backing::BackingStore;

/// Handle to a resource opened for append
pub trait AppendHandle: Send {
    /// Append `bytes` to the end of the resource
    ///
    /// Returns the number of bytes the medium accepted. A count lower than
    /// `bytes.len()` means the medium stopped accepting data.
    fn write(&mut self, bytes: &[u8]) -> Result<usize>;

    /// Release the handle, surfacing any deferred write error
    fn close(self: Box<Self>) -> Result<()>;
}

/// Handle to a resource opened for read
pub trait ReadHandle: Send {
    /// Read up to `buf.len()` bytes; `Ok(0)` means end of resource
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Release the handle
    fn close(self: Box<Self>) -> Result<()>;
}

/// Kind of storage medium, for logging and configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediumKind {
    /// Files on the local disk; durable as soon as written
    Disk,
    /// In-memory file table mirrored to backing stores on sync
    Virtual,
}

impl std::fmt::Display for MediumKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediumKind::Disk => f.write_str("disk"),
            MediumKind::Virtual => f.write_str("virtual"),
        }
    }
}

/// Storage medium collaborator
///
/// All implementations must be `Send + Sync` so a medium can be shared with
/// the background sync worker.
pub trait StorageMedium: Send + Sync {
    /// Kind of this medium
    fn kind(&self) -> MediumKind;

    /// Open `name` for append, creating it if absent
    fn open_append(&self, name: &ResourceName) -> Result<Box<dyn AppendHandle>>;

    /// Open `name` for read
    ///
    /// Fails with [`Error::NotFound`] if the resource does not exist.
    fn open_read(&self, name: &ResourceName) -> Result<Box<dyn ReadHandle>>;

    /// Check whether `name` exists
    fn exists(&self, name: &ResourceName) -> bool;

    /// Whether writes are buffered until [`StorageMedium::sync_to_durable`]
    ///
    /// Synchronous media return `false` and treat sync as a no-op.
    fn is_write_back(&self) -> bool {
        false
    }

    /// Attach a durable backing store under `prefix`
    ///
    /// Only write-back media support mounts.
    fn mount(&self, prefix: &str, _backing: Arc<dyn BackingStore>) -> Result<()> {
        Err(Error::io(
            IoOp::Mount,
            prefix,
            std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                format!("{} medium does not support mounts", self.kind()),
            ),
        ))
    }

    /// Move data between the medium and its backing stores
    fn sync_to_durable(&self, _direction: SyncDirection) -> Result<()> {
        Ok(())
    }
}
