//! WBFS (Wii Backup File System) block map.
//!
//! A WBFS file holds one or more discs split into large "WBFS sectors".
//! Only the first disc slot is exposed. Multi-byte fields are big-endian.
//!
//! | Offset | Size | Field                                  |
//! |--------|------|----------------------------------------|
//! | 0x00   | 4    | magic `"WBFS"`                         |
//! | 0x04   | 4    | number of HD sectors (BE)              |
//! | 0x08   | 1    | log2 of the HD sector size             |
//! | 0x09   | 1    | log2 of the WBFS sector size           |
//! | 0x0C   | ...  | disc table, one byte per slot          |
//!
//! Disc info for slot 0 starts at one HD sector: a 0x100-byte copy of the
//! disc header followed by the `u16` WBFS-sector table.

use super::{BlockAddr, BlockMap};
use crate::error::AnalysisError;
use crate::stream::ByteStream;

pub const WBFS_MAGIC: &[u8; 4] = b"WBFS";

/// Wii disc sector size (log2): 0x8000 bytes.
const WII_SEC_SZ_S: u8 = 15;
/// Wii sectors on a dual-layer disc.
const WII_SECTORS_PER_DISC: u32 = 143_432 * 2;
const DISC_HEADER_COPY_SIZE: usize = 0x100;

const MIN_HD_SEC_SZ_S: u8 = 9;
const MAX_HD_SEC_SZ_S: u8 = 16;
const MAX_WBFS_SEC_SZ_S: u8 = 30;

#[derive(Debug, Clone)]
pub struct WbfsMap {
    wbfs_sec_sz: u32,
    /// WBFS sector index for each logical block; 0 means not stored.
    wlba: Vec<u16>,
    disc_header: Vec<u8>,
    logical_blocks: u32,
}

impl WbfsMap {
    /// Read the WBFS header and the first disc's sector table.
    ///
    /// Returns `Ok(None)` if the stream is not a WBFS image or holds no disc.
    pub fn open(stream: &mut dyn ByteStream) -> Result<Option<Self>, AnalysisError> {
        let mut head = [0u8; 1 << MIN_HD_SEC_SZ_S];
        if stream.seek_and_read(0, &mut head)? < head.len() || &head[0..4] != WBFS_MAGIC {
            return Ok(None);
        }

        let hd_sec_sz_s = head[8];
        let wbfs_sec_sz_s = head[9];
        if !(MIN_HD_SEC_SZ_S..=MAX_HD_SEC_SZ_S).contains(&hd_sec_sz_s)
            || !(WII_SEC_SZ_S..=MAX_WBFS_SEC_SZ_S).contains(&wbfs_sec_sz_s)
            || wbfs_sec_sz_s < hd_sec_sz_s
        {
            log::debug!(
                "WBFS: invalid sector shifts hd={} wbfs={}",
                hd_sec_sz_s,
                wbfs_sec_sz_s
            );
            return Ok(None);
        }
        if head[12] == 0 {
            log::debug!("WBFS: disc slot 0 is empty");
            return Ok(None);
        }

        let hd_sec_sz = 1u64 << hd_sec_sz_s;
        let wbfs_sec_sz = 1u32 << wbfs_sec_sz_s;
        let n_wbfs_sec_per_disc = (WII_SECTORS_PER_DISC >> (wbfs_sec_sz_s - WII_SEC_SZ_S)) as usize;

        let mut info = vec![0u8; DISC_HEADER_COPY_SIZE + n_wbfs_sec_per_disc * 2];
        if stream.seek_and_read(hd_sec_sz, &mut info)? < info.len() {
            return Ok(None);
        }

        let wlba: Vec<u16> = info[DISC_HEADER_COPY_SIZE..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        let logical_blocks = wlba
            .iter()
            .rposition(|&s| s != 0)
            .map_or(0, |i| i as u32 + 1);
        info.truncate(DISC_HEADER_COPY_SIZE);

        log::debug!(
            "WBFS: wbfs_sec_sz={}, table_len={}, logical_blocks={}",
            wbfs_sec_sz,
            wlba.len(),
            logical_blocks
        );
        Ok(Some(Self {
            wbfs_sec_sz,
            wlba,
            disc_header: info,
            logical_blocks,
        }))
    }

    /// The 0x100-byte disc header copy stored in the disc info block.
    pub fn disc_header(&self) -> &[u8] {
        &self.disc_header
    }
}

impl BlockMap for WbfsMap {
    fn block_size(&self) -> u32 {
        self.wbfs_sec_sz
    }

    fn logical_size(&self) -> u64 {
        u64::from(self.logical_blocks) * u64::from(self.wbfs_sec_sz)
    }

    fn phys_block_addr(&self, block_idx: u32) -> BlockAddr {
        if block_idx >= self.logical_blocks {
            return BlockAddr::Invalid;
        }
        match self.wlba.get(block_idx as usize) {
            None => BlockAddr::Invalid,
            Some(0) => BlockAddr::Sparse,
            Some(&sec) => BlockAddr::Physical(u64::from(sec) * u64::from(self.wbfs_sec_sz)),
        }
    }
}
