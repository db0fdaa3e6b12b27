//! A [`StorageMedium`] wrapper that injects failures.
//!
//! `FaultyMedium` wraps any `Arc<dyn StorageMedium>` and fails selected
//! operations on demand. Faults are toggled through atomics, so a test can
//! flip them while the medium is shared with a log and its sync worker.
//!
//! # Example
//!
//! ```ignore
//! let faulty = Arc::new(FaultyMedium::new(inner));
//! faulty.fail_sync(true);
//! faulty.limit_writes(Some(3)); // accept at most 3 bytes per write
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use keepsake_core::{Error, IoOp, ResourceName, Result, SyncDirection};

use crate::backing::BackingStore;
use crate::medium::{AppendHandle, MediumKind, ReadHandle, StorageMedium};

const NO_LIMIT: usize = usize::MAX;

#[derive(Default)]
struct Faults {
    open_append: AtomicBool,
    open_read: AtomicBool,
    write: AtomicBool,
    read: AtomicBool,
    sync: AtomicBool,
    write_limit: AtomicUsize,
    syncs: AtomicUsize,
}

/// A [`StorageMedium`] wrapper that fails operations on demand
pub struct FaultyMedium {
    inner: Arc<dyn StorageMedium>,
    faults: Arc<Faults>,
}

fn injected(op: IoOp, resource: &str) -> Error {
    Error::io(
        op,
        resource,
        std::io::Error::new(std::io::ErrorKind::Other, "injected fault"),
    )
}

impl FaultyMedium {
    /// Wrap an existing medium with every fault disabled
    pub fn new(inner: Arc<dyn StorageMedium>) -> Self {
        let faults = Faults::default();
        faults.write_limit.store(NO_LIMIT, Ordering::SeqCst);
        Self {
            inner,
            faults: Arc::new(faults),
        }
    }

    /// Fail every `open_append`
    pub fn fail_open_append(&self, on: bool) {
        self.faults.open_append.store(on, Ordering::SeqCst);
    }

    /// Fail every `open_read`
    pub fn fail_open_read(&self, on: bool) {
        self.faults.open_read.store(on, Ordering::SeqCst);
    }

    /// Fail every handle `write`
    pub fn fail_writes(&self, on: bool) {
        self.faults.write.store(on, Ordering::SeqCst);
    }

    /// Fail every handle `read`
    pub fn fail_reads(&self, on: bool) {
        self.faults.read.store(on, Ordering::SeqCst);
    }

    /// Fail every `sync_to_durable`
    pub fn fail_sync(&self, on: bool) {
        self.faults.sync.store(on, Ordering::SeqCst);
    }

    /// Accept at most `limit` bytes per write call; `None` removes the cap
    pub fn limit_writes(&self, limit: Option<usize>) {
        self.faults
            .write_limit
            .store(limit.unwrap_or(NO_LIMIT), Ordering::SeqCst);
    }

    /// Number of `sync_to_durable` calls that reached this wrapper
    pub fn sync_count(&self) -> usize {
        self.faults.syncs.load(Ordering::SeqCst)
    }
}

impl StorageMedium for FaultyMedium {
    fn kind(&self) -> MediumKind {
        self.inner.kind()
    }

    fn open_append(&self, name: &ResourceName) -> Result<Box<dyn AppendHandle>> {
        if self.faults.open_append.load(Ordering::SeqCst) {
            return Err(injected(IoOp::OpenAppend, name.as_str()));
        }
        Ok(Box::new(FaultyAppend {
            inner: self.inner.open_append(name)?,
            faults: self.faults.clone(),
            name: name.clone(),
        }))
    }

    fn open_read(&self, name: &ResourceName) -> Result<Box<dyn ReadHandle>> {
        if self.faults.open_read.load(Ordering::SeqCst) {
            return Err(injected(IoOp::OpenRead, name.as_str()));
        }
        Ok(Box::new(FaultyRead {
            inner: self.inner.open_read(name)?,
            faults: self.faults.clone(),
            name: name.clone(),
        }))
    }

    fn exists(&self, name: &ResourceName) -> bool {
        self.inner.exists(name)
    }

    fn is_write_back(&self) -> bool {
        self.inner.is_write_back()
    }

    fn mount(&self, prefix: &str, backing: Arc<dyn BackingStore>) -> Result<()> {
        self.inner.mount(prefix, backing)
    }

    fn sync_to_durable(&self, direction: SyncDirection) -> Result<()> {
        self.faults.syncs.fetch_add(1, Ordering::SeqCst);
        if self.faults.sync.load(Ordering::SeqCst) {
            return Err(injected(IoOp::Sync, &direction.to_string()));
        }
        self.inner.sync_to_durable(direction)
    }
}

struct FaultyAppend {
    inner: Box<dyn AppendHandle>,
    faults: Arc<Faults>,
    name: ResourceName,
}

impl AppendHandle for FaultyAppend {
    fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        if self.faults.write.load(Ordering::SeqCst) {
            return Err(injected(IoOp::Write, self.name.as_str()));
        }
        let limit = self.faults.write_limit.load(Ordering::SeqCst);
        let accepted = &bytes[..bytes.len().min(limit)];
        self.inner.write(accepted)
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.inner.close()
    }
}

struct FaultyRead {
    inner: Box<dyn ReadHandle>,
    faults: Arc<Faults>,
    name: ResourceName,
}

impl ReadHandle for FaultyRead {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.faults.read.load(Ordering::SeqCst) {
            return Err(injected(IoOp::Read, self.name.as_str()));
        }
        self.inner.read(buf)
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.inner.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::VirtualFs;

    #[test]
    fn test_faults_toggle_at_runtime() {
        let faulty = FaultyMedium::new(Arc::new(VirtualFs::new()));
        let name = ResourceName::new("files/a").unwrap();

        faulty.fail_open_append(true);
        assert!(faulty.open_append(&name).is_err());
        faulty.fail_open_append(false);

        let mut handle = faulty.open_append(&name).unwrap();
        faulty.limit_writes(Some(2));
        assert_eq!(handle.write(b"abcd").unwrap(), 2);
        faulty.limit_writes(None);
        assert_eq!(handle.write(b"abcd").unwrap(), 4);
        handle.close().unwrap();

        faulty.fail_sync(true);
        assert!(faulty.sync_to_durable(SyncDirection::Persist).is_err());
        assert_eq!(faulty.sync_count(), 1);
    }
}
