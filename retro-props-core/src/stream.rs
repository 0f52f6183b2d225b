//! Random-access byte sources.
//!
//! [`ByteStream`] is the minimal contract the analyzers and the sparse block
//! engine read through. Streams are owned by the caller; anything that needs
//! its own cursor calls [`ByteStream::dup`] instead of re-opening the source.
//!
//! Two concrete sources are provided:
//!
//! - [`MemStream`]: an in-memory buffer shared between duplicates.
//! - [`FileStream`]: a local file or raw block device, read with positional
//!   I/O so duplicates never disturb each other's position.
//!
//! [`StreamCursor`] adapts any stream to `std::io::Read + Seek`.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use crate::error::{EBADF, EIO};

/// Random-access byte source.
///
/// `read` fills as much of the buffer as the source can provide; a result
/// shorter than the buffer means end of data (or an error that has been
/// recorded in [`last_error`](ByteStream::last_error)).
pub trait ByteStream: Send {
    /// Read up to `buf.len()` bytes at the current position.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write at the current position. Read-only sources reject this.
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "stream is read-only",
        ))
    }

    /// Set the absolute position. Positions past the end are allowed.
    fn seek(&mut self, pos: u64) -> io::Result<()>;

    /// Current absolute position.
    fn tell(&self) -> u64;

    /// Total size in bytes, or `None` if it cannot be determined.
    fn size(&self) -> Option<u64>;

    fn is_open(&self) -> bool;

    /// True if backed by a raw block device.
    fn is_device(&self) -> bool {
        false
    }

    /// Last recorded POSIX error number (0 if none).
    fn last_error(&self) -> i32 {
        0
    }

    fn clear_error(&mut self) {}

    /// Create an independent cursor over the same underlying bytes.
    fn dup(&self) -> io::Result<Box<dyn ByteStream>>;

    /// Release the underlying resource. Further reads fail with `EBADF`.
    fn close(&mut self);

    /// Seek to `pos` and read into `buf`, returning the number of bytes read.
    fn seek_and_read(&mut self, pos: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.seek(pos)?;
        self.read(buf)
    }
}

fn not_open() -> io::Error {
    io::Error::other("stream is not open")
}

// ---------------------------------------------------------------------------
// MemStream
// ---------------------------------------------------------------------------

/// Read-only stream over an in-memory buffer.
#[derive(Debug, Clone)]
pub struct MemStream {
    data: Option<Arc<[u8]>>,
    pos: u64,
    last_error: i32,
}

impl MemStream {
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            data: Some(data.into()),
            pos: 0,
            last_error: 0,
        }
    }
}

impl ByteStream for MemStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(data) = &self.data else {
            self.last_error = EBADF;
            return Err(not_open());
        };
        let len = data.len() as u64;
        if self.pos >= len {
            return Ok(0);
        }
        let start = self.pos as usize;
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        self.pos += n as u64;
        Ok(n)
    }

    fn seek(&mut self, pos: u64) -> io::Result<()> {
        if self.data.is_none() {
            self.last_error = EBADF;
            return Err(not_open());
        }
        self.pos = pos;
        Ok(())
    }

    fn tell(&self) -> u64 {
        self.pos
    }

    fn size(&self) -> Option<u64> {
        self.data.as_ref().map(|d| d.len() as u64)
    }

    fn is_open(&self) -> bool {
        self.data.is_some()
    }

    fn last_error(&self) -> i32 {
        self.last_error
    }

    fn clear_error(&mut self) {
        self.last_error = 0;
    }

    fn dup(&self) -> io::Result<Box<dyn ByteStream>> {
        match &self.data {
            Some(data) => Ok(Box::new(MemStream {
                data: Some(Arc::clone(data)),
                pos: 0,
                last_error: 0,
            })),
            None => Err(not_open()),
        }
    }

    fn close(&mut self) {
        self.data = None;
    }
}

// ---------------------------------------------------------------------------
// FileStream
// ---------------------------------------------------------------------------

/// Read-only stream over a local file or block device.
#[derive(Debug)]
pub struct FileStream {
    file: Option<Arc<File>>,
    pos: u64,
    size: Option<u64>,
    device: bool,
    last_error: i32,
}

impl FileStream {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::from_file(File::open(path)?)
    }

    pub fn from_file(file: File) -> io::Result<Self> {
        let meta = file.metadata()?;
        let device = is_block_device(&meta);
        // Device nodes report a zero length in their metadata.
        let size = if device {
            (&file).seek(SeekFrom::End(0)).ok()
        } else {
            Some(meta.len())
        };
        log::debug!(
            "Opened file stream: size={:?}, device={}",
            size,
            device
        );
        Ok(Self {
            file: Some(Arc::new(file)),
            pos: 0,
            size,
            device,
            last_error: 0,
        })
    }
}

#[cfg(unix)]
fn is_block_device(meta: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::FileTypeExt;
    let ft = meta.file_type();
    ft.is_block_device() || ft.is_char_device()
}

#[cfg(not(unix))]
fn is_block_device(_meta: &std::fs::Metadata) -> bool {
    false
}

#[cfg(unix)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.read_at(buf, offset)
}

#[cfg(windows)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_read(buf, offset)
}

#[cfg(not(any(unix, windows)))]
fn read_at(_file: &File, _buf: &mut [u8], _offset: u64) -> io::Result<usize> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "positional reads are not supported on this platform",
    ))
}

impl ByteStream for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let file = match &self.file {
            Some(f) => Arc::clone(f),
            None => {
                self.last_error = EBADF;
                return Err(not_open());
            }
        };

        let mut total = 0;
        while total < buf.len() {
            match read_at(&file, &mut buf[total..], self.pos + total as u64) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.last_error = EIO;
                    if total == 0 {
                        return Err(e);
                    }
                    break;
                }
            }
        }
        self.pos += total as u64;
        Ok(total)
    }

    fn seek(&mut self, pos: u64) -> io::Result<()> {
        if self.file.is_none() {
            self.last_error = EBADF;
            return Err(not_open());
        }
        self.pos = pos;
        Ok(())
    }

    fn tell(&self) -> u64 {
        self.pos
    }

    fn size(&self) -> Option<u64> {
        self.file.as_ref().and(self.size)
    }

    fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn is_device(&self) -> bool {
        self.device
    }

    fn last_error(&self) -> i32 {
        self.last_error
    }

    fn clear_error(&mut self) {
        self.last_error = 0;
    }

    fn dup(&self) -> io::Result<Box<dyn ByteStream>> {
        match &self.file {
            Some(file) => Ok(Box::new(FileStream {
                file: Some(Arc::clone(file)),
                pos: 0,
                size: self.size,
                device: self.device,
                last_error: 0,
            })),
            None => Err(not_open()),
        }
    }

    fn close(&mut self) {
        self.file = None;
    }
}

// ---------------------------------------------------------------------------
// std::io adapter
// ---------------------------------------------------------------------------

/// Exposes a [`ByteStream`] as `std::io::Read + Seek`.
pub struct StreamCursor<'a> {
    inner: &'a mut dyn ByteStream,
}

impl<'a> StreamCursor<'a> {
    pub fn new(inner: &'a mut dyn ByteStream) -> Self {
        Self { inner }
    }
}

impl Read for StreamCursor<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Seek for StreamCursor<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(p) => i128::from(p),
            SeekFrom::Current(d) => i128::from(self.inner.tell()) + i128::from(d),
            SeekFrom::End(d) => {
                let size = self.inner.size().ok_or_else(|| {
                    io::Error::new(io::ErrorKind::Unsupported, "stream size is unknown")
                })?;
                i128::from(size) + i128::from(d)
            }
        };
        let target = u64::try_from(target).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek to a negative position")
        })?;
        self.inner.seek(target)?;
        Ok(target)
    }
}

#[cfg(test)]
#[path = "tests/stream_tests.rs"]
mod tests;
