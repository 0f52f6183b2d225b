//! Xbox Game Disc generation and manufacturing-wave classification.
//!
//! Every XGD1 disc and every XGD2 disc from one manufacturing wave shares a
//! bit-identical ISO-9660 creation time, so an exact match against a table
//! fixes both generation and wave. XGD3 discs have per-title timestamps but
//! always end in one of a few hour/offset patterns.

use retro_props_core::iso9660::{PrimaryVolumeDescriptor, PvdDateTime};
use retro_props_core::sparse::xdvdfs::XDVDFS_BLOCK_SIZE;

/// XDVDFS partition start, in 2048-byte blocks.
const XGD1_LBA: u64 = 198_144;
const XGD2_LBA: u64 = 129_824;
const XGD3_LBA: u64 = 16_640;

/// Known (generation, wave, creation time) triples.
const XGD_TABLE: &[(u8, u8, i64)] = &[
    (1, 0, 1000334575),
    (2, 1, 1128716326),
    (2, 2, 1141708147),
    (2, 3, 1231977600),
    (2, 4, 1251158400),
    (2, 5, 1254787200),
    (2, 6, 1256860800),
    (2, 7, 1266796800),
    (2, 8, 1283644800),
    (2, 9, 1284595200),
    (2, 10, 1288310400),
    (2, 11, 1295395200),
    (2, 12, 1307923200),
    (2, 13, 1310515200),
    (2, 14, 1323302400),
    (2, 15, 1329868800),
    (2, 16, 1340323200),
    (2, 17, 1352332800),
    (2, 18, 1353283200),
    (2, 19, 1377561600),
    (2, 20, 1430092800),
];

/// Tail of the encoded creation time (`HHMMSScc` plus offset byte) seen on
/// XGD3 discs.
const XGD3_TIME_PATTERNS: &[&[u8; 9]] = &[
    // 17:00:00.00 -07:00
    b"17000000\xE4",
    // 16:00:00.00 -08:00
    b"16000000\xE0",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XboxDiscType {
    /// Bare XDVDFS with no video partition in front.
    Extracted,
    Xgd1,
    Xgd2 { wave: u8 },
    Xgd3,
}

impl XboxDiscType {
    /// Byte offset of the XDVDFS partition in the image.
    pub fn xdvdfs_base(self) -> u64 {
        let lba = match self {
            Self::Extracted => 0,
            Self::Xgd1 => XGD1_LBA,
            Self::Xgd2 { .. } => XGD2_LBA,
            Self::Xgd3 => XGD3_LBA,
        };
        lba * u64::from(XDVDFS_BLOCK_SIZE)
    }

    /// Generation number, 0 for extracted images.
    pub fn generation(self) -> u8 {
        match self {
            Self::Extracted => 0,
            Self::Xgd1 => 1,
            Self::Xgd2 { .. } => 2,
            Self::Xgd3 => 3,
        }
    }

    /// Manufacturing wave; 0 when not applicable.
    pub fn wave(self) -> u8 {
        match self {
            Self::Xgd2 { wave } => wave,
            _ => 0,
        }
    }

    /// XGD2 and later are Xbox 360 discs.
    pub fn is_xbox360(self) -> bool {
        self.generation() >= 2
    }

    pub fn description(self) -> String {
        match self {
            Self::Extracted => "Extracted XDVDFS".to_string(),
            Self::Xgd1 => "Xbox Game Disc 1".to_string(),
            Self::Xgd2 { wave } => format!("Xbox Game Disc 2 (Wave {})", wave),
            Self::Xgd3 => "Xbox Game Disc 3".to_string(),
        }
    }
}

/// Exact lookup of a creation time in the wave table.
pub fn lookup_wave(btime: i64) -> Option<XboxDiscType> {
    XGD_TABLE
        .iter()
        .find(|&&(_, _, t)| t == btime)
        .map(|&(xgd, wave, _)| match xgd {
            1 => XboxDiscType::Xgd1,
            _ => XboxDiscType::Xgd2 { wave },
        })
}

/// True if the raw creation time ends in a known XGD3 pattern.
pub fn matches_xgd3_pattern(btime: &PvdDateTime) -> bool {
    let raw = btime.encode();
    XGD3_TIME_PATTERNS.iter().any(|p| raw[8..] == p[..])
}

/// Classify a disc by its PVD creation time.
///
/// Returns `None` if the time does not decode or matches nothing, meaning
/// the volume is not an Xbox Game Disc.
pub fn classify_btime(btime: &PvdDateTime) -> Option<XboxDiscType> {
    let Some(epoch) = btime.to_unix_time() else {
        log::debug!("XGD: creation time does not decode");
        return None;
    };
    if let Some(t) = lookup_wave(epoch) {
        log::debug!("XGD: creation time {} matches {:?}", epoch, t);
        return Some(t);
    }
    if matches_xgd3_pattern(btime) {
        log::debug!("XGD: creation time {} matches an XGD3 pattern", epoch);
        return Some(XboxDiscType::Xgd3);
    }
    log::debug!(
        "XGD: creation time {} ({:?}) matches no known wave or XGD3 pattern",
        epoch,
        String::from_utf8_lossy(&btime.digits)
    );
    None
}

pub fn classify_pvd(pvd: &PrimaryVolumeDescriptor) -> Option<XboxDiscType> {
    classify_btime(&pvd.btime)
}

#[cfg(test)]
#[path = "tests/xgd_tests.rs"]
mod tests;
