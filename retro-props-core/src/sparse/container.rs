use super::ciso::{CISO_MAGIC, CisoMap};
use super::gcz::{GCZ_MAGIC, GczMap};
use super::wbfs::{WBFS_MAGIC, WbfsMap};
use super::{BlockAddr, BlockMap, XdvdfsPartition};
use crate::error::AnalysisError;
use crate::stream::ByteStream;

/// All supported block-mapped container formats.
#[derive(Debug, Clone)]
pub enum DiscContainer {
    Ciso(CisoMap),
    Wbfs(WbfsMap),
    Gcz(GczMap),
    Xdvdfs(XdvdfsPartition),
}

impl DiscContainer {
    /// Probe `stream` for a container signature (CISO, then WBFS, then GCZ).
    ///
    /// Returns `Ok(None)` if the stream is a plain image. The XDVDFS window
    /// has no signature of its own and is never returned here.
    pub fn open(stream: &mut dyn ByteStream) -> Result<Option<Self>, AnalysisError> {
        if !stream.is_open() {
            return Err(AnalysisError::NotOpen);
        }
        let mut magic = [0u8; 4];
        if stream.seek_and_read(0, &mut magic)? < magic.len() {
            return Ok(None);
        }

        let found = if &magic == CISO_MAGIC {
            CisoMap::open(stream)?.map(Self::Ciso)
        } else if &magic == WBFS_MAGIC {
            WbfsMap::open(stream)?.map(Self::Wbfs)
        } else if u32::from_le_bytes(magic) == GCZ_MAGIC {
            GczMap::open(stream)?.map(Self::Gcz)
        } else {
            None
        };
        if let Some(c) = &found {
            log::debug!("Detected {} container", c.name());
        }
        Ok(found)
    }

    /// Short format name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ciso(_) => "CISO",
            Self::Wbfs(_) => "WBFS",
            Self::Gcz(_) => "GCZ",
            Self::Xdvdfs(_) => "XDVDFS",
        }
    }
}

impl BlockMap for DiscContainer {
    fn block_size(&self) -> u32 {
        match self {
            Self::Ciso(m) => m.block_size(),
            Self::Wbfs(m) => m.block_size(),
            Self::Gcz(m) => m.block_size(),
            Self::Xdvdfs(m) => m.block_size(),
        }
    }

    fn logical_size(&self) -> u64 {
        match self {
            Self::Ciso(m) => m.logical_size(),
            Self::Wbfs(m) => m.logical_size(),
            Self::Gcz(m) => m.logical_size(),
            Self::Xdvdfs(m) => m.logical_size(),
        }
    }

    fn phys_block_addr(&self, block_idx: u32) -> BlockAddr {
        match self {
            Self::Ciso(m) => m.phys_block_addr(block_idx),
            Self::Wbfs(m) => m.phys_block_addr(block_idx),
            Self::Gcz(m) => m.phys_block_addr(block_idx),
            Self::Xdvdfs(m) => m.phys_block_addr(block_idx),
        }
    }

    fn read_block(
        &mut self,
        stream: &mut dyn ByteStream,
        block_idx: u32,
        buf: &mut [u8],
        pos: u32,
    ) -> Option<usize> {
        match self {
            Self::Ciso(m) => m.read_block(stream, block_idx, buf, pos),
            Self::Wbfs(m) => m.read_block(stream, block_idx, buf, pos),
            Self::Gcz(m) => m.read_block(stream, block_idx, buf, pos),
            Self::Xdvdfs(m) => m.read_block(stream, block_idx, buf, pos),
        }
    }
}
