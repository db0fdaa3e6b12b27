//! Error types for frame driving

use thiserror::Error;

/// Errors raised by surfaces and frame drivers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// `begin_frame` called while a frame is open
    #[error("frame already in progress")]
    FrameInProgress,

    /// Drawing or `end_frame` outside `begin_frame`/`end_frame`
    #[error("no frame in progress")]
    NotInFrame,

    /// Window dimensions must be positive
    #[error("invalid window size {width}x{height}")]
    InvalidSize {
        /// Requested width
        width: i32,
        /// Requested height
        height: i32,
    },

    /// Resize requested on a window created as fixed-size
    #[error("window is not resizable")]
    NotResizable,

    /// Failure reported by the windowing backend
    #[error("surface error: {0}")]
    Surface(String),
}

/// Result type for frame operations
pub type Result<T> = std::result::Result<T, FrameError>;
