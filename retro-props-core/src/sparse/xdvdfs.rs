use super::{BlockAddr, BlockMap};

/// XDVDFS sector size.
pub const XDVDFS_BLOCK_SIZE: u32 = 2048;

/// Linear window onto the XDVDFS game partition of a full Xbox disc image.
///
/// Logical block `n` lives at `base + n * 2048`.
#[derive(Debug, Clone, Copy)]
pub struct XdvdfsPartition {
    base: u64,
    size: u64,
}

impl XdvdfsPartition {
    /// `base` is the partition's byte offset and `size` its length. A zero
    /// base means the image is already extracted and needs no window.
    pub fn new(base: u64, size: u64) -> Option<Self> {
        if base == 0 {
            return None;
        }
        Some(Self { base, size })
    }

    pub fn base(&self) -> u64 {
        self.base
    }
}

impl BlockMap for XdvdfsPartition {
    fn block_size(&self) -> u32 {
        XDVDFS_BLOCK_SIZE
    }

    fn logical_size(&self) -> u64 {
        self.size
    }

    fn phys_block_addr(&self, block_idx: u32) -> BlockAddr {
        let offset = u64::from(block_idx) * u64::from(XDVDFS_BLOCK_SIZE);
        if offset >= self.size {
            BlockAddr::Invalid
        } else {
            BlockAddr::Physical(self.base + offset)
        }
    }
}
