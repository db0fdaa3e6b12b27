//! In-memory virtual filesystem with write-back mounts
//!
//! Models a volatile memory filesystem with durable stores mounted under
//! prefixes, the way an in-browser runtime mirrors a directory into a
//! browser-side database.
//!
//! # Design
//!
//! - DashMap file table: appends only lock the target entry's shard
//! - Each entry carries a dirty flag set by every append
//! - Mount table: prefix → [`BackingStore`], longest prefix wins
//! - `Persist` writes dirty entries under a mount to its backing store; a
//!   failed entry stays dirty and does not hold back the others
//! - `Load` copies every stored entry under a mount into the file table
//! - Entries outside any mount are never persisted
//! - A name cannot be both a file and the parent of another file
//!
//! Clones share the same file table and mounts.

use std::sync::Arc;

use dashmap::DashMap;
use keepsake_core::{Error, IoOp, ResourceName, Result, SyncDirection};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::backing::BackingStore;
use crate::medium::{AppendHandle, MediumKind, ReadHandle, StorageMedium};

#[derive(Debug, Default)]
struct Entry {
    data: Vec<u8>,
    dirty: bool,
}

struct Mount {
    prefix: String,
    backing: Arc<dyn BackingStore>,
}

#[derive(Default)]
struct Inner {
    files: DashMap<ResourceName, Entry>,
    mounts: RwLock<Vec<Mount>>,
}

/// Write-back storage medium held in memory
#[derive(Clone, Default)]
pub struct VirtualFs {
    inner: Arc<Inner>,
}

impl VirtualFs {
    /// Create an empty filesystem with no mounts
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounted prefixes, in mount order
    pub fn mounts(&self) -> Vec<String> {
        self.inner.mounts.read().iter().map(|m| m.prefix.clone()).collect()
    }

    /// Number of entries with writes not yet persisted
    ///
    /// Counts entries outside any mount too, which never become clean.
    pub fn dirty_count(&self) -> usize {
        self.inner.files.iter().filter(|e| e.value().dirty).count()
    }

    /// Number of resources in the file table
    pub fn len(&self) -> usize {
        self.inner.files.len()
    }

    /// Check if the file table is empty
    pub fn is_empty(&self) -> bool {
        self.inner.files.is_empty()
    }

    fn persist(&self) -> Result<()> {
        let mounts = self.inner.mounts.read();
        let mut written = 0usize;
        let mut first_error = None;

        let dirty: Vec<(ResourceName, Vec<u8>)> = self
            .inner
            .files
            .iter()
            .filter(|e| e.value().dirty)
            .map(|e| (e.key().clone(), e.value().data.clone()))
            .collect();

        for (name, data) in dirty {
            let Some(mount) = route(&mounts, &name) else {
                continue;
            };
            if let Err(e) = mount.backing.store(&name, &data) {
                warn!(resource = %name, error = %e, "Failed to persist resource");
                first_error.get_or_insert(e);
                continue;
            }
            written += 1;
            // Appends may have landed since the snapshot; content only grows,
            // so an unchanged length means the stored copy is current.
            if let Some(mut entry) = self.inner.files.get_mut(&name) {
                if entry.data.len() == data.len() {
                    entry.dirty = false;
                }
            }
        }

        debug!(written, "Persisted dirty resources");
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Existing resource that `name` would turn into a file/directory clash
    fn conflicting(&self, name: &ResourceName) -> Option<ResourceName> {
        self.inner
            .files
            .iter()
            .map(|e| e.key().clone())
            .find(|other| {
                other != name && (name.is_under(other.as_str()) || other.is_under(name.as_str()))
            })
    }

    fn load(&self) -> Result<()> {
        let mounts = self.inner.mounts.read();
        for mount in mounts.iter() {
            let entries = mount.backing.load(&mount.prefix)?;
            let count = entries.len();
            for (name, data) in entries {
                // A nested mount owns its own subtree.
                if !route(&mounts, &name).map_or(false, |m| m.prefix == mount.prefix) {
                    continue;
                }
                self.inner.files.insert(name, Entry { data, dirty: false });
            }
            info!(prefix = %mount.prefix, location = %mount.backing.location(), count, "Loaded resources from backing store");
        }
        Ok(())
    }
}

fn route<'a>(mounts: &'a [Mount], name: &ResourceName) -> Option<&'a Mount> {
    mounts
        .iter()
        .filter(|m| name.is_under(&m.prefix))
        .max_by_key(|m| m.prefix.len())
}

impl StorageMedium for VirtualFs {
    fn kind(&self) -> MediumKind {
        MediumKind::Virtual
    }

    fn open_append(&self, name: &ResourceName) -> Result<Box<dyn AppendHandle>> {
        if !self.inner.files.contains_key(name) {
            if let Some(other) = self.conflicting(name) {
                return Err(Error::io(
                    IoOp::OpenAppend,
                    name.as_str(),
                    std::io::Error::new(
                        std::io::ErrorKind::AlreadyExists,
                        format!("conflicts with existing resource {}", other),
                    ),
                ));
            }
        }
        self.inner.files.entry(name.clone()).or_default();
        Ok(Box::new(VirtualAppend {
            inner: self.inner.clone(),
            name: name.clone(),
        }))
    }

    fn open_read(&self, name: &ResourceName) -> Result<Box<dyn ReadHandle>> {
        if !self.inner.files.contains_key(name) {
            return Err(Error::NotFound(name.to_string()));
        }
        Ok(Box::new(VirtualRead {
            inner: self.inner.clone(),
            name: name.clone(),
            offset: 0,
        }))
    }

    fn exists(&self, name: &ResourceName) -> bool {
        self.inner.files.contains_key(name)
    }

    fn is_write_back(&self) -> bool {
        true
    }

    fn mount(&self, prefix: &str, backing: Arc<dyn BackingStore>) -> Result<()> {
        let prefix = ResourceName::new(prefix.trim_end_matches('/'))?.to_string();
        let mut mounts = self.inner.mounts.write();
        if mounts.iter().any(|m| m.prefix == prefix) {
            return Err(Error::AlreadyMounted(prefix));
        }
        info!(prefix = %prefix, location = %backing.location(), "Mounted backing store");
        mounts.push(Mount { prefix, backing });
        Ok(())
    }

    fn sync_to_durable(&self, direction: SyncDirection) -> Result<()> {
        match direction {
            SyncDirection::Persist => self.persist(),
            SyncDirection::Load => self.load(),
        }
    }
}

struct VirtualAppend {
    inner: Arc<Inner>,
    name: ResourceName,
}

impl AppendHandle for VirtualAppend {
    fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        let mut entry = self.inner.files.entry(self.name.clone()).or_default();
        entry.data.extend_from_slice(bytes);
        entry.dirty = true;
        Ok(bytes.len())
    }

    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

struct VirtualRead {
    inner: Arc<Inner>,
    name: ResourceName,
    offset: usize,
}

impl ReadHandle for VirtualRead {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let entry = self.inner.files.get(&self.name).ok_or_else(|| {
            Error::io(
                IoOp::Read,
                self.name.as_str(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "resource vanished while open"),
            )
        })?;
        let remaining = entry.data.get(self.offset..).unwrap_or(&[]);
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.offset += n;
        Ok(n)
    }

    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
