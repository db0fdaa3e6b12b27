//! Storage layer for keepsake
//!
//! This crate implements the storage medium collaborator:
//! - StorageMedium: open/append/read/close handles, mount, durable sync
//! - DiskMedium: plain files under a root directory (synchronous)
//! - VirtualFs: in-memory file table with write-back mounts
//! - BackingStore: durable side of a mount (memory or directory)
//! - FaultyMedium: failure injection for tests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backing;
pub mod disk;
pub mod faulty;
pub mod medium;
pub mod vfs;

pub use backing::{BackingStore, DirectoryBacking, MemoryBacking};
pub use disk::DiskMedium;
pub use faulty::FaultyMedium;
pub use medium::{AppendHandle, MediumKind, ReadHandle, StorageMedium};
pub use vfs::VirtualFs;
