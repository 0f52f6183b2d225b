//! XDVDFS volume header.
//!
//! The header occupies one 2048-byte sector, 32 sectors into the XDVDFS
//! partition:
//!
//! | Offset | Size | Field                                  |
//! |--------|------|----------------------------------------|
//! | 0x000  | 20   | magic `"MICROSOFT*XBOX*MEDIA"`         |
//! | 0x014  | 4    | root directory sector (LE)             |
//! | 0x018  | 4    | root directory size (LE)               |
//! | 0x01C  | 8    | creation time, Windows FILETIME (LE)   |
//! | 0x024  | 1992 | unused                                 |
//! | 0x7EC  | 20   | magic again                            |

use retro_props_core::sparse::xdvdfs::XDVDFS_BLOCK_SIZE;

pub const XDVDFS_MAGIC: &[u8; 20] = b"MICROSOFT*XBOX*MEDIA";

/// Sector of the header within the partition.
pub const XDVDFS_HEADER_LBA: u64 = 32;

/// Byte offset of the header within the partition.
pub const XDVDFS_HEADER_OFFSET: u64 = XDVDFS_HEADER_LBA * XDVDFS_BLOCK_SIZE as u64;

/// FILETIME ticks between 1601-01-01 and 1970-01-01.
const FILETIME_1970: i128 = 116_444_736_000_000_000;
const HECTONANOSEC_PER_SEC: i128 = 10_000_000;

const OFF_ROOT_SECTOR: usize = 0x14;
const OFF_ROOT_SIZE: usize = 0x18;
const OFF_TIMESTAMP: usize = 0x1C;
const OFF_UNUSED: usize = 0x24;
const UNUSED_LEN: usize = 1992;
const OFF_FOOTER: usize = OFF_UNUSED + UNUSED_LEN;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XdvdfsHeader {
    pub magic: [u8; 20],
    pub root_dir_sector: u32,
    pub root_dir_size: u32,
    /// 100 ns ticks since 1601-01-01 UTC.
    pub timestamp: u64,
    pub unused: Box<[u8; UNUSED_LEN]>,
    pub magic_footer: [u8; 20],
}

impl XdvdfsHeader {
    pub const SIZE: usize = XDVDFS_BLOCK_SIZE as usize;

    pub fn decode(buf: &[u8; Self::SIZE]) -> Self {
        let mut magic = [0u8; 20];
        magic.copy_from_slice(&buf[..OFF_ROOT_SECTOR]);
        let mut unused = Box::new([0u8; UNUSED_LEN]);
        unused.copy_from_slice(&buf[OFF_UNUSED..OFF_FOOTER]);
        let mut magic_footer = [0u8; 20];
        magic_footer.copy_from_slice(&buf[OFF_FOOTER..]);

        let mut ts = [0u8; 8];
        ts.copy_from_slice(&buf[OFF_TIMESTAMP..OFF_UNUSED]);
        Self {
            magic,
            root_dir_sector: u32::from_le_bytes([
                buf[OFF_ROOT_SECTOR],
                buf[OFF_ROOT_SECTOR + 1],
                buf[OFF_ROOT_SECTOR + 2],
                buf[OFF_ROOT_SECTOR + 3],
            ]),
            root_dir_size: u32::from_le_bytes([
                buf[OFF_ROOT_SIZE],
                buf[OFF_ROOT_SIZE + 1],
                buf[OFF_ROOT_SIZE + 2],
                buf[OFF_ROOT_SIZE + 3],
            ]),
            timestamp: u64::from_le_bytes(ts),
            unused,
            magic_footer,
        }
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[..OFF_ROOT_SECTOR].copy_from_slice(&self.magic);
        out[OFF_ROOT_SECTOR..OFF_ROOT_SIZE].copy_from_slice(&self.root_dir_sector.to_le_bytes());
        out[OFF_ROOT_SIZE..OFF_TIMESTAMP].copy_from_slice(&self.root_dir_size.to_le_bytes());
        out[OFF_TIMESTAMP..OFF_UNUSED].copy_from_slice(&self.timestamp.to_le_bytes());
        out[OFF_UNUSED..OFF_FOOTER].copy_from_slice(&self.unused[..]);
        out[OFF_FOOTER..].copy_from_slice(&self.magic_footer);
        out
    }

    /// Both magic copies must match exactly.
    pub fn has_valid_magic(&self) -> bool {
        &self.magic == XDVDFS_MAGIC && &self.magic_footer == XDVDFS_MAGIC
    }

    /// Creation time as seconds since the Unix epoch.
    pub fn unix_timestamp(&self) -> i64 {
        ((i128::from(self.timestamp) - FILETIME_1970) / HECTONANOSEC_PER_SEC) as i64
    }
}

#[cfg(test)]
#[path = "tests/xdvdfs_tests.rs"]
mod tests;
