//! ISO-9660 Primary Volume Descriptor.
//!
//! The PVD is the 2048-byte sector at LBA 16. Numeric fields marked
//! "both-endian" are stored twice, little-endian then big-endian; both copies
//! are kept so a decoded descriptor re-encodes to the exact input bytes.

use chrono::{NaiveDate, NaiveTime};

use crate::error::AnalysisError;
use crate::fields::RomFields;
use crate::stream::ByteStream;
use crate::util::{format_bytes, read_ascii_fixed};

pub const ISO_SECTOR_SIZE: usize = 2048;

/// Byte offset of the Primary Volume Descriptor.
pub const PVD_OFFSET: u64 = 16 * ISO_SECTOR_SIZE as u64;

pub const ISO_STANDARD_ID: &[u8; 5] = b"CD001";

const PVD_TYPE_PRIMARY: u8 = 1;

// ---------------------------------------------------------------------------
// Field primitives
// ---------------------------------------------------------------------------

fn arr<const N: usize>(buf: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[offset..offset + N]);
    out
}

/// A numeric field stored in both byte orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BothEndian<T> {
    pub le: T,
    pub be: T,
}

impl<T: Copy + PartialEq> BothEndian<T> {
    /// The little-endian copy, which is authoritative.
    pub fn get(&self) -> T {
        self.le
    }

    /// True if both copies agree.
    pub fn is_consistent(&self) -> bool {
        self.le == self.be
    }
}

impl BothEndian<u16> {
    fn decode(buf: &[u8], offset: usize) -> Self {
        Self {
            le: u16::from_le_bytes(arr(buf, offset)),
            be: u16::from_be_bytes(arr(buf, offset + 2)),
        }
    }

    fn encode(&self, out: &mut [u8], offset: usize) {
        out[offset..offset + 2].copy_from_slice(&self.le.to_le_bytes());
        out[offset + 2..offset + 4].copy_from_slice(&self.be.to_be_bytes());
    }

    pub fn new(value: u16) -> Self {
        Self { le: value, be: value }
    }
}

impl BothEndian<u32> {
    fn decode(buf: &[u8], offset: usize) -> Self {
        Self {
            le: u32::from_le_bytes(arr(buf, offset)),
            be: u32::from_be_bytes(arr(buf, offset + 4)),
        }
    }

    fn encode(&self, out: &mut [u8], offset: usize) {
        out[offset..offset + 4].copy_from_slice(&self.le.to_le_bytes());
        out[offset + 4..offset + 8].copy_from_slice(&self.be.to_be_bytes());
    }

    pub fn new(value: u32) -> Self {
        Self { le: value, be: value }
    }
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// 17-byte volume timestamp: `YYYYMMDDHHMMSScc` in ASCII plus a signed
/// offset from GMT in 15-minute units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PvdDateTime {
    pub digits: [u8; 16],
    pub tz_offset: i8,
}

impl PvdDateTime {
    pub const SIZE: usize = 17;

    pub fn decode(buf: &[u8; Self::SIZE]) -> Self {
        Self {
            digits: arr(buf, 0),
            tz_offset: buf[16] as i8,
        }
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[..16].copy_from_slice(&self.digits);
        out[16] = self.tz_offset as u8;
        out
    }

    /// Build from a `YYYYMMDDHHMMSScc` string. Returns `None` if the string
    /// is not 16 bytes.
    pub fn from_digits(digits: &str, tz_offset: i8) -> Option<Self> {
        let bytes: [u8; 16] = digits.as_bytes().try_into().ok()?;
        Some(Self {
            digits: bytes,
            tz_offset,
        })
    }

    /// True for the "not specified" encodings (all `'0'` or all NUL).
    pub fn is_unset(&self) -> bool {
        self.digits.iter().all(|&b| b == b'0') || self.digits.iter().all(|&b| b == 0)
    }

    /// Seconds since the Unix epoch in UTC, or `None` if unset or malformed.
    ///
    /// The offset byte counts 15-minute steps from GMT and must lie in
    /// -48..=52.
    pub fn to_unix_time(&self) -> Option<i64> {
        if self.is_unset()
            || !self.digits.iter().all(u8::is_ascii_digit)
            || !(-48..=52).contains(&self.tz_offset)
        {
            return None;
        }
        let num = |range: std::ops::Range<usize>| -> u32 {
            self.digits[range]
                .iter()
                .fold(0, |acc, &d| acc * 10 + u32::from(d - b'0'))
        };
        let date = NaiveDate::from_ymd_opt(num(0..4) as i32, num(4..6), num(6..8))?;
        let time = NaiveTime::from_hms_opt(num(8..10), num(10..12), num(12..14))?;
        let local = date.and_time(time).and_utc().timestamp();
        Some(local - i64::from(self.tz_offset) * 15 * 60)
    }
}

// ---------------------------------------------------------------------------
// Primary Volume Descriptor
// ---------------------------------------------------------------------------

/// Decoded Primary Volume Descriptor. Text fields are kept as raw
/// space-padded bytes; see [`PrimaryVolumeDescriptor::text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryVolumeDescriptor {
    pub descriptor_type: u8,
    pub standard_id: [u8; 5],
    pub version: u8,
    pub unused1: u8,
    pub system_id: [u8; 32],
    pub volume_id: [u8; 32],
    pub unused2: [u8; 8],
    pub volume_space_size: BothEndian<u32>,
    pub unused3: [u8; 32],
    pub volume_set_size: BothEndian<u16>,
    pub volume_sequence_number: BothEndian<u16>,
    pub logical_block_size: BothEndian<u16>,
    pub path_table_size: BothEndian<u32>,
    pub path_table_lba_l: u32,
    pub path_table_opt_lba_l: u32,
    /// Stored big-endian.
    pub path_table_lba_m: u32,
    /// Stored big-endian.
    pub path_table_opt_lba_m: u32,
    pub root_directory_record: [u8; 34],
    pub volume_set_id: [u8; 128],
    pub publisher: [u8; 128],
    pub data_preparer: [u8; 128],
    pub application: [u8; 128],
    pub copyright_file: [u8; 37],
    pub abstract_file: [u8; 37],
    pub bibliographic_file: [u8; 37],
    pub btime: PvdDateTime,
    pub mtime: PvdDateTime,
    pub exptime: PvdDateTime,
    pub efftime: PvdDateTime,
    pub file_structure_version: u8,
    pub reserved1: u8,
    pub application_data: [u8; 512],
    pub reserved2: [u8; 653],
}

impl PrimaryVolumeDescriptor {
    pub const SIZE: usize = ISO_SECTOR_SIZE;

    pub fn decode(buf: &[u8; Self::SIZE]) -> Self {
        Self {
            descriptor_type: buf[0],
            standard_id: arr(buf, 1),
            version: buf[6],
            unused1: buf[7],
            system_id: arr(buf, 8),
            volume_id: arr(buf, 40),
            unused2: arr(buf, 72),
            volume_space_size: BothEndian::<u32>::decode(buf, 80),
            unused3: arr(buf, 88),
            volume_set_size: BothEndian::<u16>::decode(buf, 120),
            volume_sequence_number: BothEndian::<u16>::decode(buf, 124),
            logical_block_size: BothEndian::<u16>::decode(buf, 128),
            path_table_size: BothEndian::<u32>::decode(buf, 132),
            path_table_lba_l: u32::from_le_bytes(arr(buf, 140)),
            path_table_opt_lba_l: u32::from_le_bytes(arr(buf, 144)),
            path_table_lba_m: u32::from_be_bytes(arr(buf, 148)),
            path_table_opt_lba_m: u32::from_be_bytes(arr(buf, 152)),
            root_directory_record: arr(buf, 156),
            volume_set_id: arr(buf, 190),
            publisher: arr(buf, 318),
            data_preparer: arr(buf, 446),
            application: arr(buf, 574),
            copyright_file: arr(buf, 702),
            abstract_file: arr(buf, 739),
            bibliographic_file: arr(buf, 776),
            btime: PvdDateTime::decode(&arr(buf, 813)),
            mtime: PvdDateTime::decode(&arr(buf, 830)),
            exptime: PvdDateTime::decode(&arr(buf, 847)),
            efftime: PvdDateTime::decode(&arr(buf, 864)),
            file_structure_version: buf[881],
            reserved1: buf[882],
            application_data: arr(buf, 883),
            reserved2: arr(buf, 1395),
        }
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0] = self.descriptor_type;
        out[1..6].copy_from_slice(&self.standard_id);
        out[6] = self.version;
        out[7] = self.unused1;
        out[8..40].copy_from_slice(&self.system_id);
        out[40..72].copy_from_slice(&self.volume_id);
        out[72..80].copy_from_slice(&self.unused2);
        self.volume_space_size.encode(&mut out, 80);
        out[88..120].copy_from_slice(&self.unused3);
        self.volume_set_size.encode(&mut out, 120);
        self.volume_sequence_number.encode(&mut out, 124);
        self.logical_block_size.encode(&mut out, 128);
        self.path_table_size.encode(&mut out, 132);
        out[140..144].copy_from_slice(&self.path_table_lba_l.to_le_bytes());
        out[144..148].copy_from_slice(&self.path_table_opt_lba_l.to_le_bytes());
        out[148..152].copy_from_slice(&self.path_table_lba_m.to_be_bytes());
        out[152..156].copy_from_slice(&self.path_table_opt_lba_m.to_be_bytes());
        out[156..190].copy_from_slice(&self.root_directory_record);
        out[190..318].copy_from_slice(&self.volume_set_id);
        out[318..446].copy_from_slice(&self.publisher);
        out[446..574].copy_from_slice(&self.data_preparer);
        out[574..702].copy_from_slice(&self.application);
        out[702..739].copy_from_slice(&self.copyright_file);
        out[739..776].copy_from_slice(&self.abstract_file);
        out[776..813].copy_from_slice(&self.bibliographic_file);
        out[813..830].copy_from_slice(&self.btime.encode());
        out[830..847].copy_from_slice(&self.mtime.encode());
        out[847..864].copy_from_slice(&self.exptime.encode());
        out[864..881].copy_from_slice(&self.efftime.encode());
        out[881] = self.file_structure_version;
        out[882] = self.reserved1;
        out[883..1395].copy_from_slice(&self.application_data);
        out[1395..2048].copy_from_slice(&self.reserved2);
        out
    }

    /// True if this is a type-1 descriptor with the `CD001` signature.
    pub fn is_valid(&self) -> bool {
        self.descriptor_type == PVD_TYPE_PRIMARY
            && &self.standard_id == ISO_STANDARD_ID
            && self.version == 1
    }

    /// Decode a padded text field.
    pub fn text(field: &[u8]) -> String {
        read_ascii_fixed(field)
    }

    /// Volume size in bytes.
    pub fn volume_size(&self) -> u64 {
        u64::from(self.volume_space_size.get()) * u64::from(self.logical_block_size.get())
    }

    /// Field set describing this volume, on a tab named "ISO-9660".
    pub fn fields(&self) -> RomFields {
        let mut f = RomFields::new();
        f.set_tab_name(0, "ISO-9660");

        let texts: [(&str, &[u8]); 9] = [
            ("System ID", &self.system_id),
            ("Volume ID", &self.volume_id),
            ("Volume Set ID", &self.volume_set_id),
            ("Publisher", &self.publisher),
            ("Data Preparer", &self.data_preparer),
            ("Application", &self.application),
            ("Copyright File", &self.copyright_file),
            ("Abstract File", &self.abstract_file),
            ("Bibliographic File", &self.bibliographic_file),
        ];
        for (name, raw) in texts {
            f.add_string(name, Self::text(raw));
        }
        f.add_string("Volume Size", format_bytes(self.volume_size()));

        let times = [
            ("Creation Time", &self.btime),
            ("Modification Time", &self.mtime),
            ("Expiration Time", &self.exptime),
            ("Effective Time", &self.efftime),
        ];
        for (name, t) in times {
            match t.to_unix_time() {
                Some(ts) => f.add_datetime(name, ts, true, true),
                None => f.add_string(name, "Unknown"),
            }
        }
        f
    }
}

/// Read the PVD at LBA 16.
///
/// Returns `Ok(None)` if the stream is too short or the sector is not a
/// Primary Volume Descriptor.
pub fn read_pvd(
    stream: &mut dyn ByteStream,
) -> Result<Option<PrimaryVolumeDescriptor>, AnalysisError> {
    let mut buf = [0u8; PrimaryVolumeDescriptor::SIZE];
    if stream.seek_and_read(PVD_OFFSET, &mut buf)? < buf.len() {
        return Ok(None);
    }
    let pvd = PrimaryVolumeDescriptor::decode(&buf);
    Ok(pvd.is_valid().then_some(pvd))
}

#[cfg(test)]
#[path = "tests/iso9660_tests.rs"]
mod tests;
