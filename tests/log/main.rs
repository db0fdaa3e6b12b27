//! Persistent Log Integration Tests
//!
//! Append, chunked read and durable sync through the public API, on both
//! the disk medium and the write-back virtual filesystem.
//!
//! ```bash
//! cargo test --test log
//! cargo test --test log chunking::
//! ```

#[path = "../common/mod.rs"]
mod common;

mod chunking;
mod durability;
mod roundtrip;
