//! TOML configuration for a persistent log.
//!
//! ```toml
//! log_level = "info"
//! chunk_size = 31
//!
//! [medium]
//! kind = "virtual"
//! root = "./state"
//! mount = "files"
//!
//! [durability]
//! mode = "batched"
//! interval_ms = 100
//! batch_size = 1000
//! ```
//!
//! Every key is optional. With no `[medium]` section the log runs on an
//! in-memory filesystem with an in-memory backing store mounted at `files`.

use std::path::{Path, PathBuf};

use keepsake_core::{Error, Result};
use keepsake_durability::DurabilityMode;
use keepsake_storage::MemoryBacking;
use serde::{Deserialize, Serialize};

use crate::builder::LogBuilder;
use crate::log::DEFAULT_CHUNK_SIZE;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Tracing filter used when `KEEPSAKE_LOG` is unset.
    pub log_level: String,
    /// Upper bound on read chunk size in bytes.
    pub chunk_size: usize,
    /// Storage medium.
    pub medium: MediumConfig,
    /// When appends reach durable storage.
    pub durability: DurabilityMode,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            medium: MediumConfig::default(),
            durability: DurabilityMode::default(),
        }
    }
}

/// Kind of storage medium to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediumSelect {
    /// Files under `root`.
    Disk,
    /// In-memory write-back filesystem.
    Virtual,
}

/// `[medium]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediumConfig {
    /// Medium kind.
    pub kind: MediumSelect,
    /// Disk root, or the directory backing the mount for `virtual`.
    ///
    /// A `virtual` medium without a root uses an in-memory backing store,
    /// which lives only as long as the process.
    pub root: Option<PathBuf>,
    /// Mount prefix for `virtual`.
    pub mount: String,
}

impl Default for MediumConfig {
    fn default() -> Self {
        Self {
            kind: MediumSelect::Virtual,
            root: None,
            mount: "files".to_string(),
        }
    }
}

impl LogConfig {
    /// Parse config from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load config from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Turn this config into a ready-to-open builder.
    pub fn into_builder(self) -> Result<LogBuilder> {
        let builder = LogBuilder::new()
            .chunk_size(self.chunk_size)
            .durability(self.durability);

        match self.medium.kind {
            MediumSelect::Disk => {
                let root = self.medium.root.ok_or_else(|| {
                    Error::Config("medium.root is required for kind = \"disk\"".to_string())
                })?;
                Ok(builder.path(root))
            }
            MediumSelect::Virtual => {
                let builder = builder.virtual_fs();
                match self.medium.root {
                    Some(dir) => builder.mount_directory(self.medium.mount, dir),
                    None => Ok(builder.mount(self.medium.mount, MemoryBacking::new())),
                }
            }
        }
    }
}
