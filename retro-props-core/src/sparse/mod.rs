//! Block-mapped disc image reader.
//!
//! Container formats (CISO, WBFS, GCZ, XDVDFS partitions) store a disc as a
//! sequence of fixed-size blocks that may be missing (sparse), relocated, or
//! compressed. A [`BlockMap`] describes how one format translates a logical
//! block index into physical storage; [`SparseBlockReader`] walks that map to
//! present the disc as a flat, seekable [`ByteStream`].
//!
//! Because the reader is itself a `ByteStream`, readers stack: an XDVDFS
//! partition can sit on top of a CISO container without either knowing.

use std::io;

use crate::error::{AnalysisError, EBADF, EIO};
use crate::stream::ByteStream;

pub mod ciso;
pub mod container;
pub mod gcz;
pub mod wbfs;
pub mod xdvdfs;

pub use ciso::CisoMap;
pub use container::DiscContainer;
pub use gcz::GczMap;
pub use wbfs::WbfsMap;
pub use xdvdfs::XdvdfsPartition;

// ---------------------------------------------------------------------------
// Block addresses
// ---------------------------------------------------------------------------

/// Physical location of one logical block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockAddr {
    /// Block is not stored; reads as zeros.
    Sparse,
    /// Block index is outside the image.
    Invalid,
    /// Byte offset of the block in the backing stream.
    Physical(u64),
}

impl BlockAddr {
    /// Decode the integer form used by block tables: `0` is sparse, any
    /// negative value is invalid.
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            0 => Self::Sparse,
            r if r < 0 => Self::Invalid,
            r => Self::Physical(r as u64),
        }
    }

    /// Integer form. `Physical(0)` has no distinct encoding and maps to `0`.
    pub fn raw(self) -> i64 {
        match self {
            Self::Sparse => 0,
            Self::Invalid => -1,
            Self::Physical(addr) => addr as i64,
        }
    }
}

// ---------------------------------------------------------------------------
// BlockMap
// ---------------------------------------------------------------------------

/// Logical-to-physical translation for one container format.
pub trait BlockMap: Send {
    /// Block size in bytes. Must be a non-zero power of two.
    fn block_size(&self) -> u32;

    /// Size of the logical (uncompressed) image in bytes.
    fn logical_size(&self) -> u64;

    fn phys_block_addr(&self, block_idx: u32) -> BlockAddr;

    /// Read `buf.len()` bytes starting `pos` bytes into logical block
    /// `block_idx`.
    ///
    /// Returns the number of bytes produced, or `None` if the block index is
    /// invalid. A count shorter than `buf.len()` means the backing read came
    /// up short. Formats that compress blocks override this.
    fn read_block(
        &mut self,
        stream: &mut dyn ByteStream,
        block_idx: u32,
        buf: &mut [u8],
        pos: u32,
    ) -> Option<usize> {
        match self.phys_block_addr(block_idx) {
            BlockAddr::Invalid => None,
            BlockAddr::Sparse => {
                buf.fill(0);
                Some(buf.len())
            }
            BlockAddr::Physical(addr) => {
                match stream.seek_and_read(addr + u64::from(pos), buf) {
                    Ok(n) => Some(n),
                    Err(e) => {
                        log::warn!(
                            "Block {} read failed at 0x{:X}: {}",
                            block_idx,
                            addr + u64::from(pos),
                            e
                        );
                        Some(0)
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SparseBlockReader
// ---------------------------------------------------------------------------

/// Flat, seekable view over a block-mapped image.
pub struct SparseBlockReader<M: BlockMap> {
    stream: Box<dyn ByteStream>,
    map: M,
    pos: u64,
    last_error: i32,
}

impl<M: BlockMap> SparseBlockReader<M> {
    /// Wrap `stream` with `map`.
    ///
    /// Fails if the stream is not open. A map with an unusable block size
    /// still constructs, but the reader reports itself closed and every read
    /// returns 0.
    pub fn new(stream: Box<dyn ByteStream>, map: M) -> Result<Self, AnalysisError> {
        if !stream.is_open() {
            return Err(AnalysisError::NotOpen);
        }
        let block_size = map.block_size();
        let last_error = if block_size.is_power_of_two() {
            0
        } else {
            log::warn!("Rejecting block map with block size {}", block_size);
            EBADF
        };
        log::debug!(
            "Sparse reader: block_size={}, logical_size={}",
            block_size,
            map.logical_size()
        );
        Ok(Self {
            stream,
            map,
            pos: 0,
            last_error,
        })
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    fn geometry_valid(&self) -> bool {
        self.map.block_size().is_power_of_two()
    }
}

impl<M: BlockMap + Clone + 'static> ByteStream for SparseBlockReader<M> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.is_open() {
            self.last_error = EBADF;
            return Ok(0);
        }

        let size = self.map.logical_size();
        if self.pos >= size || buf.is_empty() {
            return Ok(0);
        }
        let want = (size - self.pos).min(buf.len() as u64) as usize;
        let block_size = u64::from(self.map.block_size());

        let mut done = 0usize;
        while done < want {
            let Ok(block_idx) = u32::try_from(self.pos / block_size) else {
                break;
            };
            let offset = (self.pos % block_size) as u32;
            let chunk = ((block_size - u64::from(offset)) as usize).min(want - done);

            let Some(n) = self.map.read_block(
                self.stream.as_mut(),
                block_idx,
                &mut buf[done..done + chunk],
                offset,
            ) else {
                log::debug!("Read stopped at invalid block {}", block_idx);
                break;
            };

            done += n;
            self.pos += n as u64;
            if n < chunk {
                self.last_error = match self.stream.last_error() {
                    0 => EIO,
                    e => e,
                };
                break;
            }
        }
        Ok(done)
    }

    fn seek(&mut self, pos: u64) -> io::Result<()> {
        self.pos = pos;
        Ok(())
    }

    fn tell(&self) -> u64 {
        self.pos
    }

    fn size(&self) -> Option<u64> {
        Some(self.map.logical_size())
    }

    fn is_open(&self) -> bool {
        self.stream.is_open() && self.geometry_valid()
    }

    fn is_device(&self) -> bool {
        self.stream.is_device()
    }

    fn last_error(&self) -> i32 {
        self.last_error
    }

    fn clear_error(&mut self) {
        self.last_error = 0;
        self.stream.clear_error();
    }

    fn dup(&self) -> io::Result<Box<dyn ByteStream>> {
        Ok(Box::new(SparseBlockReader {
            stream: self.stream.dup()?,
            map: self.map.clone(),
            pos: 0,
            last_error: 0,
        }))
    }

    fn close(&mut self) {
        self.stream.close();
    }
}

#[cfg(test)]
#[path = "../tests/sparse_tests.rs"]
mod tests;
