//! Convenient imports for keepsake.
//!
//! ```ignore
//! use keepsake::prelude::*;
//!
//! let log = Keepsake::ephemeral()?;
//! log.append_line("notes", "hello\n")?;
//! ```

// Main entry point
pub use crate::keepsake::{Keepsake, KeepsakeBuilder};

// Error handling
pub use crate::error::{Error, Result};

// Configuration
pub use keepsake_engine::{DurabilityMode, LogConfig};

// Storage
pub use keepsake_storage::{DirectoryBacking, MemoryBacking};

// Sync tokens
pub use keepsake_core::SyncToken;
