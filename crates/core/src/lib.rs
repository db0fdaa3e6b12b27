//! Core types for keepsake
//!
//! This crate defines the vocabulary shared by every layer:
//! - `ResourceName`: validated path-like log resource identifier
//! - `SyncDirection`: persist (cache → backing) or load (backing → cache)
//! - `SyncToken` / `SyncCompleter`: awaitable durable-sync completion
//! - `Error`: the IOFailure family plus naming/mount/config errors

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod sync;
pub mod types;

pub use error::{Error, IoOp, Result};
pub use sync::{SyncCompleter, SyncToken};
pub use types::{ResourceName, SyncDirection, RESERVED_SUFFIX};
