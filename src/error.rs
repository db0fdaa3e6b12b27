//! Unified error types for keepsake.
//!
//! This module provides a clean error type that wraps internal errors
//! and presents a consistent interface to users.

use thiserror::Error;

/// All keepsake errors.
///
/// Internal errors are flattened into messages; the variant tells the
/// caller what kind of failure happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Resource was never written
    #[error("not found: {0}")]
    NotFound(String),

    /// Open, read, write, close or sync failed, including short writes
    #[error("I/O failure: {0}")]
    Io(String),

    /// Resource name or mount prefix is malformed
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// Backing store already mounted at this prefix in this process
    #[error("already mounted: {0}")]
    AlreadyMounted(String),

    /// Sync request dropped before it completed
    #[error("sync aborted: {0}")]
    SyncAborted(String),

    /// Log has been shut down
    #[error("log is closed")]
    Closed,

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Frame driver or surface failure
    #[error("frame error: {0}")]
    Frame(String),
}

/// Result type for keepsake operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is an I/O failure of the log (not-found included).
    pub fn is_io_failure(&self) -> bool {
        matches!(self, Error::Io(_) | Error::NotFound(_))
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

// Convert from internal core errors
impl From<keepsake_core::Error> for Error {
    fn from(e: keepsake_core::Error) -> Self {
        use keepsake_core::Error as CoreError;
        match e {
            CoreError::NotFound(resource) => Error::NotFound(resource),
            err @ (CoreError::Io { .. } | CoreError::ShortWrite { .. }) => {
                Error::Io(err.to_string())
            }
            err @ CoreError::InvalidName { .. } => Error::InvalidName(err.to_string()),
            CoreError::AlreadyMounted(key) => Error::AlreadyMounted(key),
            err @ CoreError::SyncAborted => Error::SyncAborted(err.to_string()),
            CoreError::Closed => Error::Closed,
            CoreError::Config(msg) => Error::Config(msg),
        }
    }
}

impl From<keepsake_frame::FrameError> for Error {
    fn from(e: keepsake_frame::FrameError) -> Self {
        Error::Frame(e.to_string())
    }
}
