//! Chunked, single-pass reader over a log resource
//!
//! A [`LogReader`] owns an open read handle and yields the resource as
//! fixed-size chunks. Every chunk holds exactly the bytes that were read, so
//! content with embedded NUL bytes or arbitrary binary data comes back
//! unaltered. The handle is closed when the reader reaches the end, hits an
//! error, or is dropped early.

use std::io::Write;

use keepsake_core::{Error, IoOp, ResourceName, Result};
use keepsake_storage::ReadHandle;
use tracing::{debug, warn};

/// Lazy, finite, non-restartable chunk stream over a log resource
pub struct LogReader {
    name: ResourceName,
    handle: Option<Box<dyn ReadHandle>>,
    buf: Vec<u8>,
    bytes_read: u64,
}

impl LogReader {
    pub(crate) fn new(name: ResourceName, handle: Box<dyn ReadHandle>, chunk_size: usize) -> Self {
        Self {
            name,
            handle: Some(handle),
            buf: vec![0; chunk_size],
            bytes_read: 0,
        }
    }

    /// Resource being read
    pub fn resource(&self) -> &ResourceName {
        &self.name
    }

    /// Bytes yielded so far
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Upper bound on the size of each chunk
    pub fn chunk_size(&self) -> usize {
        self.buf.len()
    }

    /// Check whether the underlying handle has been released
    pub fn is_drained(&self) -> bool {
        self.handle.is_none()
    }

    /// Emit every remaining chunk to `out` as it is read
    ///
    /// Returns the total number of bytes emitted by this reader.
    pub fn copy_to<W: Write + ?Sized>(mut self, out: &mut W) -> Result<u64> {
        while let Some(chunk) = self.next() {
            let chunk = chunk?;
            out.write_all(&chunk)
                .map_err(|e| Error::io(IoOp::Emit, self.name.as_str(), e))?;
        }
        out.flush()
            .map_err(|e| Error::io(IoOp::Emit, self.name.as_str(), e))?;
        Ok(self.bytes_read)
    }

    /// Collect the remaining content into memory
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for chunk in self {
            out.extend_from_slice(&chunk?);
        }
        Ok(out)
    }

    /// Fill the chunk buffer until it is full or the resource ends
    fn fill(&mut self) -> Result<usize> {
        let Some(handle) = self.handle.as_mut() else {
            return Ok(0);
        };
        let mut filled = 0;
        while filled < self.buf.len() {
            let n = handle.read(&mut self.buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }

    fn finish(&mut self) -> Result<()> {
        match self.handle.take() {
            Some(handle) => {
                debug!(resource = %self.name, bytes = self.bytes_read, "Read drained");
                handle.close()
            }
            None => Ok(()),
        }
    }
}

impl Iterator for LogReader {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.handle.as_ref()?;
        match self.fill() {
            Ok(0) => self.finish().err().map(Err),
            Ok(n) => {
                self.bytes_read += n as u64;
                Some(Ok(self.buf[..n].to_vec()))
            }
            Err(e) => {
                if let Err(close_err) = self.finish() {
                    warn!(resource = %self.name, error = %close_err, "Close after read failure failed");
                }
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for LogReader {}

impl Drop for LogReader {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            warn!(resource = %self.name, error = %e, "Closing reader failed");
        }
    }
}

impl std::fmt::Debug for LogReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogReader")
            .field("resource", &self.name)
            .field("chunk_size", &self.buf.len())
            .field("bytes_read", &self.bytes_read)
            .field("drained", &self.handle.is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keepsake_storage::{FaultyMedium, StorageMedium, VirtualFs};
    use std::sync::Arc;

    fn seeded(content: &[u8]) -> (Arc<FaultyMedium>, ResourceName) {
        let fs = VirtualFs::new();
        let name = ResourceName::new("files/log").unwrap();
        let mut handle = fs.open_append(&name).unwrap();
        handle.write(content).unwrap();
        handle.close().unwrap();
        (Arc::new(FaultyMedium::new(Arc::new(fs))), name)
    }

    #[test]
    fn test_chunks_are_bounded_and_exact() {
        let content: Vec<u8> = (0..100u8).collect();
        let (medium, name) = seeded(&content);
        let reader = LogReader::new(name.clone(), medium.open_read(&name).unwrap(), 31);

        let chunks: Vec<Vec<u8>> = reader.map(|c| c.unwrap()).collect();
        let sizes: Vec<usize> = chunks.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![31, 31, 31, 7]);
        assert_eq!(chunks.concat(), content);
    }

    #[test]
    fn test_embedded_nul_bytes_survive() {
        let content = b"abc\0def\0\0ghi".repeat(5);
        let (medium, name) = seeded(&content);
        let reader = LogReader::new(name.clone(), medium.open_read(&name).unwrap(), 4);
        assert_eq!(reader.into_bytes().unwrap(), content);
    }

    #[test]
    fn test_reader_is_single_pass() {
        let (medium, name) = seeded(b"once");
        let mut reader = LogReader::new(name.clone(), medium.open_read(&name).unwrap(), 31);
        assert_eq!(reader.next().unwrap().unwrap(), b"once");
        assert!(reader.next().is_none());
        assert!(reader.is_drained());
        assert!(reader.next().is_none());
        assert_eq!(reader.bytes_read(), 4);
    }

    #[test]
    fn test_read_failure_is_reported_once() {
        let (medium, name) = seeded(b"payload");
        let mut reader = LogReader::new(name.clone(), medium.open_read(&name).unwrap(), 31);
        medium.fail_reads(true);
        let err = reader.next().unwrap().unwrap_err();
        assert!(err.is_io_failure());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_copy_to_streams_everything() {
        let (medium, name) = seeded(b"I was here :)\nI was here :)\n");
        let reader = LogReader::new(name.clone(), medium.open_read(&name).unwrap(), 5);
        let mut out = Vec::new();
        assert_eq!(reader.copy_to(&mut out).unwrap(), 28);
        assert_eq!(out, b"I was here :)\nI was here :)\n");
    }
}
