//! GCZ (Dolphin compressed GameCube/Wii image) block map.
//!
//! Header (32 bytes, little-endian):
//!
//! | Offset | Size | Field                    |
//! |--------|------|--------------------------|
//! | 0x00   | 4    | magic `0xB10BC001`       |
//! | 0x04   | 4    | sub type                 |
//! | 0x08   | 8    | compressed data size     |
//! | 0x10   | 8    | uncompressed data size   |
//! | 0x18   | 4    | block size               |
//! | 0x1C   | 4    | number of blocks         |
//!
//! Followed by `num_blocks` u64 block pointers and `num_blocks` u32 hashes.
//! Bit 63 of a pointer marks a block stored without compression; everything
//! else is a zlib stream.

use std::io::Read;

use flate2::read::ZlibDecoder;

use super::{BlockAddr, BlockMap};
use crate::error::AnalysisError;
use crate::stream::ByteStream;

pub const GCZ_MAGIC: u32 = 0xB10B_C001;

const GCZ_HEADER_SIZE: usize = 32;
const GCZ_UNCOMPRESSED_FLAG: u64 = 1 << 63;
const GCZ_MAX_BLOCK_SIZE: u32 = 16 * 1024 * 1024;
const GCZ_MAX_BLOCKS: u32 = 1 << 22;

/// Largest zlib stream a block of `n` bytes can compress to.
fn zlib_bound(n: u64) -> u64 {
    n + (n >> 12) + (n >> 14) + (n >> 25) + 13
}

#[derive(Debug, Clone)]
pub struct GczMap {
    compressed_data_size: u64,
    data_size: u64,
    block_size: u32,
    pointers: Vec<u64>,
    data_offset: u64,
    /// Most recently inflated block.
    cache: Option<(u32, Vec<u8>)>,
}

impl GczMap {
    /// Read the header and block pointer table.
    ///
    /// Returns `Ok(None)` if the stream is not a GCZ image.
    pub fn open(stream: &mut dyn ByteStream) -> Result<Option<Self>, AnalysisError> {
        let mut header = [0u8; GCZ_HEADER_SIZE];
        if stream.seek_and_read(0, &mut header)? < GCZ_HEADER_SIZE {
            return Ok(None);
        }
        let le32 = |o: usize| u32::from_le_bytes([header[o], header[o + 1], header[o + 2], header[o + 3]]);
        let le64 = |o: usize| {
            let mut b = [0u8; 8];
            b.copy_from_slice(&header[o..o + 8]);
            u64::from_le_bytes(b)
        };

        if le32(0) != GCZ_MAGIC {
            return Ok(None);
        }
        let sub_type = le32(4);
        let compressed_data_size = le64(8);
        let data_size = le64(16);
        let block_size = le32(24);
        let num_blocks = le32(28);

        if !block_size.is_power_of_two() || block_size > GCZ_MAX_BLOCK_SIZE {
            log::debug!("GCZ: invalid block size {}", block_size);
            return Ok(None);
        }
        if num_blocks > GCZ_MAX_BLOCKS
            || u64::from(num_blocks) * u64::from(block_size) < data_size
        {
            log::debug!(
                "GCZ: block count {} does not cover {} bytes",
                num_blocks,
                data_size
            );
            return Ok(None);
        }

        let mut table = vec![0u8; num_blocks as usize * 8];
        if stream.seek_and_read(GCZ_HEADER_SIZE as u64, &mut table)? < table.len() {
            return Ok(None);
        }
        let pointers: Vec<u64> = table
            .chunks_exact(8)
            .map(|c| {
                let mut b = [0u8; 8];
                b.copy_from_slice(c);
                u64::from_le_bytes(b)
            })
            .collect();

        // Pointers are followed by one u32 hash per block.
        let data_offset = GCZ_HEADER_SIZE as u64 + u64::from(num_blocks) * 12;

        if let Some(total) = stream.size() {
            if data_offset
                .checked_add(compressed_data_size)
                .is_none_or(|end| end > total)
            {
                log::debug!(
                    "GCZ: {} bytes of block data do not fit in a {} byte file",
                    compressed_data_size,
                    total
                );
                return Ok(None);
            }
        }
        let mut prev = 0u64;
        for (i, p) in pointers.iter().enumerate() {
            let start = p & !GCZ_UNCOMPRESSED_FLAG;
            if start < prev || start > compressed_data_size {
                log::debug!("GCZ: block pointer {} out of order or range (0x{:X})", i, start);
                return Ok(None);
            }
            prev = start;
        }

        log::debug!(
            "GCZ: sub_type={}, block_size={}, blocks={}, data_size={}",
            sub_type,
            block_size,
            num_blocks,
            data_size
        );
        Ok(Some(Self {
            compressed_data_size,
            data_size,
            block_size,
            pointers,
            data_offset,
            cache: None,
        }))
    }

    fn block_extent(&self, block_idx: u32) -> Option<(u64, u64, bool)> {
        let idx = block_idx as usize;
        let ptr = *self.pointers.get(idx)?;
        let start = ptr & !GCZ_UNCOMPRESSED_FLAG;
        let end = match self.pointers.get(idx + 1) {
            Some(next) => next & !GCZ_UNCOMPRESSED_FLAG,
            None => self.compressed_data_size,
        };
        let stored = ptr & GCZ_UNCOMPRESSED_FLAG != 0;
        Some((start, end.saturating_sub(start), stored))
    }

    fn inflate_block(
        &mut self,
        stream: &mut dyn ByteStream,
        block_idx: u32,
        offset: u64,
        len: u64,
    ) -> Option<&[u8]> {
        if self.cache.as_ref().is_none_or(|(idx, _)| *idx != block_idx) {
            let mut packed = vec![0u8; len as usize];
            match stream.seek_and_read(self.data_offset + offset, &mut packed) {
                Ok(n) if n == packed.len() => {}
                Ok(n) => {
                    log::warn!("GCZ: block {} truncated ({} of {} bytes)", block_idx, n, len);
                    return None;
                }
                Err(e) => {
                    log::warn!("GCZ: block {} read failed: {}", block_idx, e);
                    return None;
                }
            }

            let mut out = Vec::with_capacity(self.block_size as usize);
            let mut decoder = ZlibDecoder::new(&packed[..]).take(u64::from(self.block_size));
            if let Err(e) = decoder.read_to_end(&mut out) {
                log::warn!("GCZ: block {} failed to inflate: {}", block_idx, e);
                return None;
            }
            self.cache = Some((block_idx, out));
        }
        self.cache.as_ref().map(|(_, data)| data.as_slice())
    }
}

impl BlockMap for GczMap {
    fn block_size(&self) -> u32 {
        self.block_size
    }

    fn logical_size(&self) -> u64 {
        self.data_size
    }

    fn phys_block_addr(&self, block_idx: u32) -> BlockAddr {
        match self.block_extent(block_idx) {
            Some((start, _, _)) => BlockAddr::Physical(self.data_offset + start),
            None => BlockAddr::Invalid,
        }
    }

    fn read_block(
        &mut self,
        stream: &mut dyn ByteStream,
        block_idx: u32,
        buf: &mut [u8],
        pos: u32,
    ) -> Option<usize> {
        let (start, len, stored) = self.block_extent(block_idx)?;
        if stored {
            let addr = self.data_offset + start + u64::from(pos);
            return Some(stream.seek_and_read(addr, buf).unwrap_or_else(|e| {
                log::warn!("GCZ: stored block {} read failed: {}", block_idx, e);
                0
            }));
        }

        if len > zlib_bound(u64::from(self.block_size)) {
            log::warn!("GCZ: block {} claims {} packed bytes", block_idx, len);
            return Some(0);
        }
        let Some(data) = self.inflate_block(stream, block_idx, start, len) else {
            return Some(0);
        };
        let pos = pos as usize;
        if pos >= data.len() {
            return Some(0);
        }
        let n = buf.len().min(data.len() - pos);
        buf[..n].copy_from_slice(&data[pos..pos + n]);
        Some(n)
    }
}
