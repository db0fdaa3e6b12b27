//! Builder for log configuration
//!
//! Picks the storage medium, the mounts, the durability mode and the read
//! chunk size, then performs the open sequence: claim each mount in the
//! process-wide registry, attach it to the medium, run one `Load` sync so
//! previously persisted content is visible, and start the sync worker.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use keepsake_core::{Error, Result, SyncDirection};
use keepsake_durability::{DurabilityMode, SyncWorker};
use keepsake_storage::{BackingStore, DirectoryBacking, DiskMedium, StorageMedium, VirtualFs};
use tracing::info;

use crate::log::{PersistentLog, DEFAULT_CHUNK_SIZE};
use crate::mounts::MountGuard;

enum MediumChoice {
    Default,
    Disk(PathBuf),
    Virtual,
    Custom(Arc<dyn StorageMedium>),
}

/// Builder for [`PersistentLog`]
///
/// # Example
///
/// ```ignore
/// // Files on disk, written through on every append
/// let log = PersistentLog::builder().path("./logs").open()?;
///
/// // Write-back cache persisted to a directory in batches
/// let log = PersistentLog::builder()
///     .virtual_fs()
///     .mount_directory("files", "./state")?
///     .batched()
///     .open()?;
/// ```
pub struct LogBuilder {
    medium: MediumChoice,
    mounts: Vec<(String, Arc<dyn BackingStore>)>,
    durability: DurabilityMode,
    chunk_size: usize,
}

impl LogBuilder {
    /// Create a builder with default settings
    ///
    /// Defaults: in-memory medium, no mounts, after-write durability, 31 byte
    /// chunks.
    pub fn new() -> Self {
        Self {
            medium: MediumChoice::Default,
            mounts: Vec::new(),
            durability: DurabilityMode::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Store resources as files under `root`
    pub fn path(mut self, root: impl AsRef<Path>) -> Self {
        self.medium = MediumChoice::Disk(root.as_ref().to_path_buf());
        self
    }

    /// Store resources in an in-memory write-back filesystem
    pub fn virtual_fs(mut self) -> Self {
        self.medium = MediumChoice::Virtual;
        self
    }

    /// Use a caller-supplied medium
    pub fn medium(mut self, medium: Arc<dyn StorageMedium>) -> Self {
        self.medium = MediumChoice::Custom(medium);
        self
    }

    /// Mount `backing` under `prefix`
    ///
    /// Only write-back media accept mounts; opening fails otherwise.
    pub fn mount(mut self, prefix: impl Into<String>, backing: impl BackingStore + 'static) -> Self {
        self.mounts.push((prefix.into(), Arc::new(backing)));
        self
    }

    /// Mount a directory-backed store under `prefix`
    pub fn mount_directory(self, prefix: impl Into<String>, dir: impl AsRef<Path>) -> Result<Self> {
        let backing = DirectoryBacking::new(dir)?;
        Ok(self.mount(prefix, backing))
    }

    /// Set the durability mode
    pub fn durability(mut self, mode: DurabilityMode) -> Self {
        self.durability = mode;
        self
    }

    /// Never persist; everything is lost when the log goes away
    pub fn no_durability(self) -> Self {
        self.durability(DurabilityMode::None)
    }

    /// Persist only on explicit request and at shutdown
    pub fn manual(self) -> Self {
        self.durability(DurabilityMode::Manual)
    }

    /// Request a sync after every append without waiting (default)
    pub fn after_write(self) -> Self {
        self.durability(DurabilityMode::AfterWrite)
    }

    /// Persist every 1000 appends or 100ms
    pub fn batched(self) -> Self {
        self.durability(DurabilityMode::batched_default())
    }

    /// Persist every `batch_size` appends or `interval_ms` milliseconds
    pub fn batched_with(self, interval_ms: u64, batch_size: usize) -> Self {
        self.durability(DurabilityMode::Batched {
            interval_ms,
            batch_size,
        })
    }

    /// Sync after every append and fail the append if the sync fails
    pub fn strict(self) -> Self {
        self.durability(DurabilityMode::Strict)
    }

    /// Set the upper bound on read chunk size
    pub fn chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes;
        self
    }

    /// Open the log
    pub fn open(self) -> Result<PersistentLog> {
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be at least 1".to_string()));
        }

        let medium: Arc<dyn StorageMedium> = match self.medium {
            MediumChoice::Default | MediumChoice::Virtual => Arc::new(VirtualFs::new()),
            MediumChoice::Disk(root) => Arc::new(
                DiskMedium::new(root).sync_on_close(self.durability.requires_immediate_sync()),
            ),
            MediumChoice::Custom(medium) => medium,
        };

        let mut guards = Vec::with_capacity(self.mounts.len());
        for (prefix, backing) in self.mounts {
            let guard = MountGuard::claim(backing.as_ref(), &prefix)?;
            medium.mount(&prefix, backing)?;
            guards.push(guard);
        }
        if !guards.is_empty() {
            medium.sync_to_durable(SyncDirection::Load)?;
        }

        let worker = SyncWorker::start(medium.clone(), self.durability)?;
        info!(
            medium = %medium.kind(),
            durability = %self.durability,
            mounts = guards.len(),
            chunk_size = self.chunk_size,
            "Opened log"
        );
        Ok(PersistentLog::from_parts(
            medium,
            worker,
            self.chunk_size,
            guards,
        ))
    }
}

impl Default for LogBuilder {
    fn default() -> Self {
        Self::new()
    }
}
