//! Error types for the persistent log
//!
//! `IOFailure` is the only failure kind of the log operations themselves. It
//! is represented by three variants ([`Error::Io`], [`Error::NotFound`],
//! [`Error::ShortWrite`]); use [`Error::is_io_failure`] to test for the whole
//! family. The remaining variants belong to naming, mounting, sync plumbing
//! and configuration.

use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Storage operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    /// Opening a resource for append
    OpenAppend,
    /// Opening a resource for read
    OpenRead,
    /// Writing bytes to an open resource
    Write,
    /// Reading bytes from an open resource
    Read,
    /// Releasing a resource handle
    Close,
    /// Emitting read chunks to an output channel
    Emit,
    /// Moving data between a cache and its backing store
    Sync,
    /// Attaching a backing store to a prefix
    Mount,
}

impl std::fmt::Display for IoOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IoOp::OpenAppend => "open for append",
            IoOp::OpenRead => "open for read",
            IoOp::Write => "write",
            IoOp::Read => "read",
            IoOp::Close => "close",
            IoOp::Emit => "emit",
            IoOp::Sync => "sync",
            IoOp::Mount => "mount",
        };
        f.write_str(s)
    }
}

/// Error type for log and storage operations
///
/// Cloneable so a single sync outcome can complete several waiting tokens.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The storage medium rejected an operation
    #[error("{op} failed for {resource}: {source}")]
    Io {
        /// Operation that failed
        op: IoOp,
        /// Resource (or mount prefix) involved
        resource: String,
        /// Underlying I/O error
        #[source]
        source: Arc<io::Error>,
    },

    /// The resource does not exist on the medium
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The medium accepted fewer bytes than requested
    #[error("short write to {resource}: wrote {written} of {expected} bytes")]
    ShortWrite {
        /// Resource being written
        resource: String,
        /// Bytes accepted
        written: usize,
        /// Bytes requested
        expected: usize,
    },

    /// The resource name is not a valid relative path
    #[error("invalid resource name {name:?}: {reason}")]
    InvalidName {
        /// Rejected name
        name: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// A backing store is already mounted at this prefix
    #[error("already mounted: {0}")]
    AlreadyMounted(String),

    /// The sync worker went away before completing a request
    #[error("durable sync was aborted before completion")]
    SyncAborted,

    /// The log has been shut down
    #[error("log is closed")]
    Closed,

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type alias for log operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap an I/O error, mapping `NotFound` on open-for-read to [`Error::NotFound`]
    pub fn io(op: IoOp, resource: impl Into<String>, source: io::Error) -> Self {
        let resource = resource.into();
        if op == IoOp::OpenRead && source.kind() == io::ErrorKind::NotFound {
            return Error::NotFound(resource);
        }
        Error::Io {
            op,
            resource,
            source: Arc::new(source),
        }
    }

    /// Check if this error is an `IOFailure` (open/read/write/sync failure)
    pub fn is_io_failure(&self) -> bool {
        matches!(
            self,
            Error::Io { .. } | Error::NotFound(_) | Error::ShortWrite { .. }
        )
    }

    /// Check if this is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Operation that failed, for I/O errors
    pub fn op(&self) -> Option<IoOp> {
        match self {
            Error::Io { op, .. } => Some(*op),
            Error::NotFound(_) => Some(IoOp::OpenRead),
            Error::ShortWrite { .. } => Some(IoOp::Write),
            _ => None,
        }
    }
}
