//! Durability mode for log appends.
//!
//! Defines when appended bytes are pushed from a write-back medium to its
//! durable backing store.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Durability mode for log appends.
///
/// Only matters on write-back media; on a synchronous medium every mode
/// behaves the same because there is nothing to flush.
///
/// # Mode Comparison
///
/// | Mode | After append | On shutdown | Data loss window |
/// |------|--------------|-------------|------------------|
/// | None | nothing | nothing | everything |
/// | Manual | nothing | persist | since last explicit sync |
/// | AfterWrite | request, don't wait | persist | in-flight request |
/// | Batched | every N appends or T ms | persist | batch_size / interval_ms |
/// | Strict | request and wait | persist | zero |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DurabilityMode {
    /// No durability - all data lost when the cache goes away.
    ///
    /// Explicit sync requests resolve immediately without touching the
    /// backing store. Use case: tests, scratch logs.
    None,

    /// Sync only when explicitly requested, and once at shutdown.
    Manual,

    /// Fire-and-forget sync request after every append.
    ///
    /// Appends never wait; queued requests are coalesced by the worker.
    AfterWrite,

    /// Sync every N appends OR every T milliseconds.
    ///
    /// Good balance of speed and safety. May lose up to batch_size
    /// appends or interval_ms of data on crash.
    Batched {
        /// Maximum time between syncs in milliseconds
        #[serde(default = "default_interval_ms")]
        interval_ms: u64,
        /// Maximum appends between syncs
        #[serde(default = "default_batch_size")]
        batch_size: usize,
    },

    /// Sync after every append and wait for it (slow, maximum durability).
    ///
    /// A failed sync fails the append that triggered it.
    Strict,
}

fn default_interval_ms() -> u64 {
    100
}

fn default_batch_size() -> usize {
    1000
}

impl DurabilityMode {
    /// Check if this mode ever moves data to the backing store.
    ///
    /// Returns false for None mode, true for all others.
    pub fn persists(&self) -> bool {
        !matches!(self, DurabilityMode::None)
    }

    /// Check if an append must wait for its sync to complete.
    ///
    /// Returns true only for Strict mode.
    pub fn requires_immediate_sync(&self) -> bool {
        matches!(self, DurabilityMode::Strict)
    }

    /// Check if every append issues its own sync request.
    pub fn syncs_every_append(&self) -> bool {
        matches!(self, DurabilityMode::AfterWrite | DurabilityMode::Strict)
    }

    /// Periodic flush interval, for Batched mode.
    pub fn flush_interval(&self) -> Option<Duration> {
        match self {
            DurabilityMode::Batched { interval_ms, .. } => Some(Duration::from_millis(*interval_ms)),
            _ => None,
        }
    }

    /// Appends that force a flush, for Batched mode.
    pub fn batch_size(&self) -> Option<usize> {
        match self {
            DurabilityMode::Batched { batch_size, .. } => Some((*batch_size).max(1)),
            _ => None,
        }
    }

    /// Human-readable description of the mode.
    pub fn description(&self) -> &'static str {
        match self {
            DurabilityMode::None => "No durability (fastest, all data lost with the cache)",
            DurabilityMode::Manual => "Sync on request and at shutdown",
            DurabilityMode::AfterWrite => "Sync requested after every append, not awaited",
            DurabilityMode::Batched { .. } => "Batched sync (balanced speed/safety)",
            DurabilityMode::Strict => "Sync awaited on every append (safest, slowest)",
        }
    }

    /// Create a batched mode with recommended defaults.
    ///
    /// Returns `Batched { interval_ms: 100, batch_size: 1000 }`.
    pub fn batched_default() -> Self {
        DurabilityMode::Batched {
            interval_ms: default_interval_ms(),
            batch_size: default_batch_size(),
        }
    }

    /// Parse a mode name as used on the command line.
    ///
    /// `batched` maps to [`DurabilityMode::batched_default`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().replace('-', "_").as_str() {
            "none" => Some(DurabilityMode::None),
            "manual" => Some(DurabilityMode::Manual),
            "after_write" => Some(DurabilityMode::AfterWrite),
            "batched" => Some(DurabilityMode::batched_default()),
            "strict" => Some(DurabilityMode::Strict),
            _ => None,
        }
    }
}

impl Default for DurabilityMode {
    fn default() -> Self {
        DurabilityMode::AfterWrite
    }
}

impl std::fmt::Display for DurabilityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DurabilityMode::None => f.write_str("none"),
            DurabilityMode::Manual => f.write_str("manual"),
            DurabilityMode::AfterWrite => f.write_str("after_write"),
            DurabilityMode::Batched {
                interval_ms,
                batch_size,
            } => write!(f, "batched({}ms/{})", interval_ms, batch_size),
            DurabilityMode::Strict => f.write_str("strict"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_mode() {
        let mode = DurabilityMode::None;
        assert!(!mode.persists());
        assert!(!mode.requires_immediate_sync());
        assert!(!mode.syncs_every_append());
    }

    #[test]
    fn test_strict_mode() {
        let mode = DurabilityMode::Strict;
        assert!(mode.persists());
        assert!(mode.requires_immediate_sync());
        assert!(mode.syncs_every_append());
    }

    #[test]
    fn test_batched_mode() {
        let mode = DurabilityMode::Batched {
            interval_ms: 50,
            batch_size: 0,
        };
        assert!(mode.persists());
        assert!(!mode.requires_immediate_sync());
        assert_eq!(mode.flush_interval(), Some(Duration::from_millis(50)));
        assert_eq!(mode.batch_size(), Some(1));
    }

    #[test]
    fn test_default_is_after_write() {
        assert_eq!(DurabilityMode::default(), DurabilityMode::AfterWrite);
    }

    #[test]
    fn test_batched_default() {
        match DurabilityMode::batched_default() {
            DurabilityMode::Batched {
                interval_ms,
                batch_size,
            } => {
                assert_eq!(interval_ms, 100);
                assert_eq!(batch_size, 1000);
            }
            other => panic!("Expected Batched mode, got {other}"),
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(DurabilityMode::from_name("After-Write"), Some(DurabilityMode::AfterWrite));
        assert_eq!(DurabilityMode::from_name("strict"), Some(DurabilityMode::Strict));
        assert_eq!(DurabilityMode::from_name("fsync"), None);
    }
}
