//! Durability layer for keepsake
//!
//! This crate decides when buffered writes reach durable storage:
//! - DurabilityMode: None, Manual, AfterWrite (default), Batched, Strict
//! - SyncWorker: background thread that coalesces persist requests,
//!   flushes on batch size or interval, and runs the final sync on shutdown
//! - SyncStats: flush/failure/coalesce counters

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod mode;
pub mod worker;

pub use mode::DurabilityMode;
pub use worker::{SyncStats, SyncWorker};
