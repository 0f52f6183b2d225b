//! CISO (compact ISO) block map for GameCube and Wii images.
//!
//! Layout:
//!
//! | Offset | Size   | Field                                   |
//! |--------|--------|-----------------------------------------|
//! | 0x0000 | 4      | magic `"CISO"`                          |
//! | 0x0004 | 4      | block size (LE, power of two)           |
//! | 0x0008 | 0x7FF8 | block-present flags, one byte per block |
//! | 0x8000 | ...    | present blocks, in logical order        |

use super::{BlockAddr, BlockMap};
use crate::error::AnalysisError;
use crate::stream::ByteStream;

pub const CISO_MAGIC: &[u8; 4] = b"CISO";

/// Size of the CISO header, which is also the offset of the first stored block.
pub const CISO_HEADER_SIZE: usize = 0x8000;

const CISO_MAP_SIZE: usize = CISO_HEADER_SIZE - 8;
const CISO_MIN_BLOCK_SIZE: u32 = 32 * 1024;
const CISO_MAX_BLOCK_SIZE: u32 = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct CisoMap {
    block_size: u32,
    /// Physical slot for each logical block up to the last present one.
    slots: Vec<Option<u32>>,
}

impl CisoMap {
    /// Parse the 0x8000-byte header. Returns `None` if it is not a CISO header.
    pub fn parse(header: &[u8]) -> Option<Self> {
        if header.len() < CISO_HEADER_SIZE || &header[0..4] != CISO_MAGIC {
            return None;
        }
        let block_size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        if !block_size.is_power_of_two()
            || !(CISO_MIN_BLOCK_SIZE..=CISO_MAX_BLOCK_SIZE).contains(&block_size)
        {
            log::debug!("CISO: invalid block size {}", block_size);
            return None;
        }

        let flags = &header[8..8 + CISO_MAP_SIZE];
        let mut slots = Vec::with_capacity(CISO_MAP_SIZE);
        let mut next_slot = 0u32;
        let mut last_used = None;
        for (idx, &flag) in flags.iter().enumerate() {
            match flag {
                0 => slots.push(None),
                1 => {
                    slots.push(Some(next_slot));
                    next_slot += 1;
                    last_used = Some(idx);
                }
                other => {
                    log::debug!("CISO: invalid map flag 0x{:02X} at block {}", other, idx);
                    return None;
                }
            }
        }
        slots.truncate(last_used.map_or(0, |i| i + 1));

        log::debug!(
            "CISO: block_size={}, blocks={}, stored={}",
            block_size,
            slots.len(),
            next_slot
        );
        Some(Self { block_size, slots })
    }

    /// Read and parse the header from the start of `stream`.
    pub fn open(stream: &mut dyn ByteStream) -> Result<Option<Self>, AnalysisError> {
        let mut header = vec![0u8; CISO_HEADER_SIZE];
        let n = stream.seek_and_read(0, &mut header)?;
        if n < CISO_HEADER_SIZE {
            return Ok(None);
        }
        Ok(Self::parse(&header))
    }

    /// Number of blocks actually stored in the file.
    pub fn stored_blocks(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

impl BlockMap for CisoMap {
    fn block_size(&self) -> u32 {
        self.block_size
    }

    fn logical_size(&self) -> u64 {
        self.slots.len() as u64 * u64::from(self.block_size)
    }

    fn phys_block_addr(&self, block_idx: u32) -> BlockAddr {
        match self.slots.get(block_idx as usize) {
            None => BlockAddr::Invalid,
            Some(None) => BlockAddr::Sparse,
            Some(Some(slot)) => BlockAddr::Physical(
                CISO_HEADER_SIZE as u64 + u64::from(*slot) * u64::from(self.block_size),
            ),
        }
    }
}
