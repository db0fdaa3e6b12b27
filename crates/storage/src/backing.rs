//! Durable backing stores for the virtual filesystem
//!
//! A backing store is the slow, persistent side of a write-back cache. It
//! stores whole resources keyed by [`ResourceName`] and can hand back every
//! resource under a mount prefix.
//!
//! - [`MemoryBacking`]: shared in-process map. Outlives any one
//!   [`crate::VirtualFs`], which is enough to model a cache being torn down and
//!   rebuilt over the same store.
//! - [`DirectoryBacking`]: one file per resource under a root directory,
//!   replaced atomically via temp file + fsync + rename. Temp files carry
//!   [`RESERVED_SUFFIX`], which no resource name can end with.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use keepsake_core::{Error, IoOp, ResourceName, Result, RESERVED_SUFFIX};
use tracing::{debug, warn};

static NEXT_MEMORY_ID: AtomicU64 = AtomicU64::new(1);

/// Durable store behind a mount
pub trait BackingStore: Send + Sync {
    /// Identity of the underlying storage
    ///
    /// Two backing stores with the same location share state; the engine
    /// refuses to mount the same location and prefix twice at once.
    fn location(&self) -> String;

    /// Return every resource stored under `prefix`
    fn load(&self, prefix: &str) -> Result<Vec<(ResourceName, Vec<u8>)>>;

    /// Replace the stored content of `name`
    fn store(&self, name: &ResourceName, data: &[u8]) -> Result<()>;
}

/// In-process backing store
///
/// Clones share the same map.
#[derive(Debug, Clone)]
pub struct MemoryBacking {
    id: u64,
    entries: std::sync::Arc<DashMap<ResourceName, Vec<u8>>>,
}

impl MemoryBacking {
    /// Create an empty store with a fresh identity
    pub fn new() -> Self {
        Self {
            id: NEXT_MEMORY_ID.fetch_add(1, Ordering::Relaxed),
            entries: std::sync::Arc::new(DashMap::new()),
        }
    }

    /// Stored content of `name`, if any
    pub fn get(&self, name: &ResourceName) -> Option<Vec<u8>> {
        self.entries.get(name).map(|entry| entry.value().clone())
    }

    /// Number of stored resources
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryBacking {
    fn default() -> Self {
        Self::new()
    }
}

impl BackingStore for MemoryBacking {
    fn location(&self) -> String {
        format!("memory:{}", self.id)
    }

    fn load(&self, prefix: &str) -> Result<Vec<(ResourceName, Vec<u8>)>> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.key().is_under(prefix))
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect())
    }

    fn store(&self, name: &ResourceName, data: &[u8]) -> Result<()> {
        self.entries.insert(name.clone(), data.to_vec());
        Ok(())
    }
}

/// Backing store that keeps one file per resource under `root`
#[derive(Debug, Clone)]
pub struct DirectoryBacking {
    root: PathBuf,
}

impl DirectoryBacking {
    /// Use `root` as the store directory, creating it if needed
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .map_err(|e| Error::io(IoOp::Mount, root.display().to_string(), e))?;
        Ok(Self { root })
    }

    /// Store directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, name: &ResourceName) -> PathBuf {
        name.segments().fold(self.root.clone(), |path, s| path.join(s))
    }

    fn collect(&self, dir: &Path, rel: &str, out: &mut Vec<(ResourceName, Vec<u8>)>) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                warn!(path = %entry.path().display(), "Skipping non UTF-8 path in backing store");
                continue;
            };
            if file_name.ends_with(RESERVED_SUFFIX) {
                debug!(path = %entry.path().display(), "Skipping leftover temp file");
                continue;
            }
            let rel_name = if rel.is_empty() {
                file_name.to_string()
            } else {
                format!("{}/{}", rel, file_name)
            };
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                self.collect(&entry.path(), &rel_name, out)?;
            } else if file_type.is_file() {
                match ResourceName::new(rel_name.as_str()) {
                    Ok(name) => out.push((name, fs::read(entry.path())?)),
                    Err(e) => warn!(error = %e, "Skipping unaddressable file in backing store"),
                }
            }
        }
        Ok(())
    }
}

impl BackingStore for DirectoryBacking {
    fn location(&self) -> String {
        let root = fs::canonicalize(&self.root).unwrap_or_else(|_| self.root.clone());
        format!("dir:{}", root.display())
    }

    fn load(&self, prefix: &str) -> Result<Vec<(ResourceName, Vec<u8>)>> {
        let prefix = prefix.trim_end_matches('/');
        let start = if prefix.is_empty() {
            self.root.clone()
        } else {
            prefix.split('/').fold(self.root.clone(), |p, s| p.join(s))
        };
        let mut out = Vec::new();
        if !start.exists() {
            debug!(prefix, "Backing directory has no entries yet");
            return Ok(out);
        }
        if start.is_file() {
            let name = ResourceName::new(prefix)?;
            let data = fs::read(&start).map_err(|e| Error::io(IoOp::Sync, prefix, e))?;
            out.push((name, data));
            return Ok(out);
        }
        self.collect(&start, prefix, &mut out)
            .map_err(|e| Error::io(IoOp::Sync, prefix, e))?;
        Ok(out)
    }

    fn store(&self, name: &ResourceName, data: &[u8]) -> Result<()> {
        let path = self.path_of(name);
        let io_err = |e| Error::io(IoOp::Sync, name.as_str(), e);

        let parent = path.parent().unwrap_or(self.root.as_path());
        fs::create_dir_all(parent).map_err(io_err)?;
        let mut tmp = tempfile::Builder::new()
            .prefix(".")
            .suffix(RESERVED_SUFFIX)
            .tempfile_in(parent)
            .map_err(io_err)?;
        tmp.write_all(data).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}
