//! Log engine for keepsake
//!
//! Ties storage and durability together behind one handle:
//! - PersistentLog: append, chunked read, durable sync, shutdown
//! - LogBuilder: medium, mounts, durability mode, chunk size
//! - LogConfig: TOML configuration that produces a builder
//! - LogReader: lazy single-pass chunk stream
//! - MountGuard: process-wide claim on a mounted backing store

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod config;
pub mod log;
pub mod mounts;
pub mod reader;

pub use builder::LogBuilder;
pub use config::{LogConfig, MediumConfig, MediumSelect};
pub use log::{PersistentLog, DEFAULT_CHUNK_SIZE};
pub use mounts::{is_mounted, MountGuard};
pub use reader::LogReader;

pub use keepsake_durability::{DurabilityMode, SyncStats};
