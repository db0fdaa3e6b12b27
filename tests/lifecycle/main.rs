//! Lifecycle Integration Tests
//!
//! Opening, closing and re-creating logs over the same backing store:
//! persistence across cache lifetimes, the process-wide mount registry and
//! shutdown semantics.

#[path = "../common/mod.rs"]
mod common;

mod mounts;
mod persistence;
mod shutdown;
