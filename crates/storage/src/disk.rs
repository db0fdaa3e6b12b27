//! Local-disk storage medium
//!
//! Resources are plain files under a root directory. Writes go straight to
//! the operating system, so there is nothing to sync: the medium reports
//! itself as synchronous and `sync_to_durable` is a no-op. With
//! `sync_on_close` set, every append handle calls `sync_data` before it is
//! released.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use keepsake_core::{Error, IoOp, ResourceName, Result};
use tracing::trace;

use crate::medium::{AppendHandle, MediumKind, ReadHandle, StorageMedium};

/// Storage medium backed by files under a root directory
#[derive(Debug, Clone)]
pub struct DiskMedium {
    root: PathBuf,
    sync_on_close: bool,
}

impl DiskMedium {
    /// Use `root` as the directory resources live in
    ///
    /// The directory is created lazily on first append.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            sync_on_close: false,
        }
    }

    /// Call `sync_data` before closing every append handle
    pub fn sync_on_close(mut self, enabled: bool) -> Self {
        self.sync_on_close = enabled;
        self
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path of `name`
    pub fn path_of(&self, name: &ResourceName) -> PathBuf {
        name.segments().fold(self.root.clone(), |path, s| path.join(s))
    }
}

impl StorageMedium for DiskMedium {
    fn kind(&self) -> MediumKind {
        MediumKind::Disk
    }

    fn open_append(&self, name: &ResourceName) -> Result<Box<dyn AppendHandle>> {
        let path = self.path_of(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(IoOp::OpenAppend, name.as_str(), e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| Error::io(IoOp::OpenAppend, name.as_str(), e))?;
        trace!(path = %path.display(), "Opened for append");
        Ok(Box::new(DiskAppend {
            name: name.clone(),
            file,
            sync_on_close: self.sync_on_close,
        }))
    }

    fn open_read(&self, name: &ResourceName) -> Result<Box<dyn ReadHandle>> {
        let path = self.path_of(name);
        let file = File::open(&path).map_err(|e| Error::io(IoOp::OpenRead, name.as_str(), e))?;
        Ok(Box::new(DiskRead {
            name: name.clone(),
            file,
        }))
    }

    fn exists(&self, name: &ResourceName) -> bool {
        self.path_of(name).is_file()
    }
}

struct DiskAppend {
    name: ResourceName,
    file: File,
    sync_on_close: bool,
}

impl AppendHandle for DiskAppend {
    fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        let mut written = 0;
        while written < bytes.len() {
            match self.file.write(&bytes[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::io(IoOp::Write, self.name.as_str(), e)),
            }
        }
        Ok(written)
    }

    fn close(self: Box<Self>) -> Result<()> {
        let mut this = *self;
        this.file
            .flush()
            .map_err(|e| Error::io(IoOp::Close, this.name.as_str(), e))?;
        if this.sync_on_close {
            this.file
                .sync_data()
                .map_err(|e| Error::io(IoOp::Close, this.name.as_str(), e))?;
        }
        Ok(())
    }
}

struct DiskRead {
    name: ResourceName,
    file: File,
}

impl ReadHandle for DiskRead {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        loop {
            match self.file.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::io(IoOp::Read, self.name.as_str(), e)),
            }
        }
    }

    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
