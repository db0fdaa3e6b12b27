//! # Keepsake
//!
//! Append-only persistent text log over pluggable storage media.
//!
//! Keepsake appends text to named resources, reads them back as bounded
//! chunks, and pushes buffered writes from a write-back cache to durable
//! storage on request or on a schedule.
//!
//! ## Quick Start
//!
//! ```ignore
//! use keepsake::prelude::*;
//!
//! let log = Keepsake::builder()
//!     .virtual_fs()
//!     .mount_directory("files", "./state")?
//!     .open()?;
//!
//! log.append_line("files/count.txt", "I was here :)\n")?;
//! for chunk in log.read_all("files/count.txt")? {
//!     print!("{}", String::from_utf8_lossy(&chunk?));
//! }
//! log.request_durable_sync().wait()?;
//! log.close()?;
//! ```
//!
//! ## Media
//!
//! - Disk: plain files, every append is on disk once it returns
//! - Virtual: in-memory cache with mounted backing stores, durable after sync
//!
//! ## Durability
//!
//! See [`DurabilityMode`]: none, manual, after-write (default), batched, strict.

#![warn(missing_docs)]

mod error;
mod keepsake;

pub mod prelude;

// Re-export main entry points
pub use crate::keepsake::{
    Chunks, Keepsake, KeepsakeBuilder, LogMetrics, VISIT_LINE, VISIT_RESOURCE,
};
pub use error::{Error, Result};

// Re-export building blocks
pub use keepsake_core::{ResourceName, SyncToken};
pub use keepsake_engine::{DurabilityMode, LogConfig, MediumConfig, MediumSelect};
pub use keepsake_storage::{
    BackingStore, DirectoryBacking, DiskMedium, MediumKind, MemoryBacking, StorageMedium,
    VirtualFs,
};

/// Frame driving for the windowed demo
pub use keepsake_frame as frame;
