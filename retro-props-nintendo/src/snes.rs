//! SNES (Super Famicom) and Satellaview BS-X ROM analyzer.
//!
//! Supports:
//! - Headerless ROMs (.sfc)
//! - ROMs with a 512-byte copier header (.smc, .swc, .fig)
//! - LoROM, HiROM, and ExHiROM header locations
//! - Satellaview BS-X flash cartridge images (.bs)
//!
//! The 80-byte header sits at the end of the first ROM bank: 0x7FB0 for
//! LoROM, 0xFFB0 for HiROM, 0x40FFB0 for ExHiROM. Its first 48 bytes hold
//! either the standard cartridge layout or the BS-X layout; the last 32 bytes
//! are the native and emulation-mode interrupt vectors.

use retro_props_core::util::{format_bytes, is_printable_ascii, read_ascii_fixed};
use retro_props_core::{
    AnalysisError, AnalysisOptions, ByteStream, Platform, Region, RomAnalyzer, RomFields,
    RomIdentification,
};

use crate::licensee::{maker_code_name, old_licensee_name};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const SNES_HEADER_SIZE: usize = 80;

/// Size of the preamble added by backup units.
pub const COPIER_HEADER_SIZE: u64 = 512;

/// Old publisher code meaning "the extended header is present".
const OLD_PUBLISHER_EXTENDED: u8 = 0x33;

/// BS-X byte 0x2B value meaning "the extended header is invalid".
const BSX_EXT_INVALID: u8 = 0x01;

/// Minimum candidate score to accept a header.
const MIN_SCORE: u32 = 7;

const CHECKSUM_CHUNK: usize = 64 * 1024;

// Standard layout offsets within the 80-byte header.
const OFF_TITLE: usize = 0x10;
const OFF_MAP_MODE: usize = 0x25;
const OFF_ROM_TYPE: usize = 0x26;
const OFF_ROM_SIZE: usize = 0x27;
const OFF_SRAM_SIZE: usize = 0x28;
const OFF_DESTINATION: usize = 0x29;
const OFF_OLD_PUBLISHER: usize = 0x2A;
const OFF_VERSION: usize = 0x2B;
const OFF_COMPLEMENT: usize = 0x2C;
const OFF_CHECKSUM: usize = 0x2E;

// BS-X layout offsets.
const OFF_BSX_BLOCK_ALLOC: usize = 0x20;
const OFF_BSX_LIMITED_STARTS: usize = 0x24;
const OFF_BSX_MONTH: usize = 0x26;
const OFF_BSX_DAY: usize = 0x27;
const OFF_BSX_MAP_MODE: usize = 0x28;
const OFF_BSX_FILE_TYPE: usize = 0x29;

const OFF_VECTORS: usize = 0x30;

fn le16(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

fn le32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

fn arr<const N: usize>(buf: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[offset..offset + N]);
    out
}

/// True if `checksum` and `complement` are bitwise inverses.
pub fn checksum_pair_valid(checksum: u16, complement: u16) -> bool {
    checksum ^ complement == 0xFFFF
}

// ---------------------------------------------------------------------------
// Header records
// ---------------------------------------------------------------------------

/// Standard cartridge header, including the extended block at 0x00..0x10.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnesStandardHeader {
    pub new_publisher_code: [u8; 2],
    pub id4: [u8; 4],
    pub ext_reserved: [u8; 6],
    pub exp_flash_size: u8,
    pub exp_ram_size: u8,
    pub special_version: u8,
    pub cart_type: u8,
    pub title: [u8; 21],
    pub rom_mapping: u8,
    pub rom_type: u8,
    pub rom_size: u8,
    pub sram_size: u8,
    pub destination_code: u8,
    pub old_publisher_code: u8,
    pub version: u8,
    pub checksum_complement: u16,
    pub checksum: u16,
}

impl SnesStandardHeader {
    fn decode(buf: &[u8]) -> Self {
        Self {
            new_publisher_code: arr(buf, 0x00),
            id4: arr(buf, 0x02),
            ext_reserved: arr(buf, 0x06),
            exp_flash_size: buf[0x0C],
            exp_ram_size: buf[0x0D],
            special_version: buf[0x0E],
            cart_type: buf[0x0F],
            title: arr(buf, OFF_TITLE),
            rom_mapping: buf[OFF_MAP_MODE],
            rom_type: buf[OFF_ROM_TYPE],
            rom_size: buf[OFF_ROM_SIZE],
            sram_size: buf[OFF_SRAM_SIZE],
            destination_code: buf[OFF_DESTINATION],
            old_publisher_code: buf[OFF_OLD_PUBLISHER],
            version: buf[OFF_VERSION],
            checksum_complement: le16(buf, OFF_COMPLEMENT),
            checksum: le16(buf, OFF_CHECKSUM),
        }
    }

    fn encode(&self, out: &mut [u8]) {
        out[0x00..0x02].copy_from_slice(&self.new_publisher_code);
        out[0x02..0x06].copy_from_slice(&self.id4);
        out[0x06..0x0C].copy_from_slice(&self.ext_reserved);
        out[0x0C] = self.exp_flash_size;
        out[0x0D] = self.exp_ram_size;
        out[0x0E] = self.special_version;
        out[0x0F] = self.cart_type;
        out[OFF_TITLE..OFF_TITLE + 21].copy_from_slice(&self.title);
        out[OFF_MAP_MODE] = self.rom_mapping;
        out[OFF_ROM_TYPE] = self.rom_type;
        out[OFF_ROM_SIZE] = self.rom_size;
        out[OFF_SRAM_SIZE] = self.sram_size;
        out[OFF_DESTINATION] = self.destination_code;
        out[OFF_OLD_PUBLISHER] = self.old_publisher_code;
        out[OFF_VERSION] = self.version;
        out[OFF_COMPLEMENT..OFF_COMPLEMENT + 2]
            .copy_from_slice(&self.checksum_complement.to_le_bytes());
        out[OFF_CHECKSUM..OFF_CHECKSUM + 2].copy_from_slice(&self.checksum.to_le_bytes());
    }

    /// The extended block is only meaningful when the old publisher code is 0x33.
    pub fn has_extended_header(&self) -> bool {
        self.old_publisher_code == OLD_PUBLISHER_EXTENDED
    }
}

/// Satellaview BS-X flash header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnesBsxHeader {
    pub new_publisher_code: [u8; 2],
    pub program_type: u32,
    pub ext_reserved: [u8; 10],
    pub title: [u8; 16],
    pub block_alloc: u32,
    pub limited_starts: u16,
    pub month: u8,
    pub day: u8,
    pub rom_mapping: u8,
    pub file_type: u8,
    /// 0x33 if valid, 0x00 if the file was deleted.
    pub old_publisher_code: u8,
    /// 0x01 means the extended block is invalid.
    pub x7fdb: u8,
    pub checksum_complement: u16,
    pub checksum: u16,
}

impl SnesBsxHeader {
    fn decode(buf: &[u8]) -> Self {
        Self {
            new_publisher_code: arr(buf, 0x00),
            program_type: le32(buf, 0x02),
            ext_reserved: arr(buf, 0x06),
            title: arr(buf, OFF_TITLE),
            block_alloc: le32(buf, OFF_BSX_BLOCK_ALLOC),
            limited_starts: le16(buf, OFF_BSX_LIMITED_STARTS),
            month: buf[OFF_BSX_MONTH],
            day: buf[OFF_BSX_DAY],
            rom_mapping: buf[OFF_BSX_MAP_MODE],
            file_type: buf[OFF_BSX_FILE_TYPE],
            old_publisher_code: buf[OFF_OLD_PUBLISHER],
            x7fdb: buf[OFF_VERSION],
            checksum_complement: le16(buf, OFF_COMPLEMENT),
            checksum: le16(buf, OFF_CHECKSUM),
        }
    }

    fn encode(&self, out: &mut [u8]) {
        out[0x00..0x02].copy_from_slice(&self.new_publisher_code);
        out[0x02..0x06].copy_from_slice(&self.program_type.to_le_bytes());
        out[0x06..0x10].copy_from_slice(&self.ext_reserved);
        out[OFF_TITLE..OFF_TITLE + 16].copy_from_slice(&self.title);
        out[OFF_BSX_BLOCK_ALLOC..OFF_BSX_BLOCK_ALLOC + 4]
            .copy_from_slice(&self.block_alloc.to_le_bytes());
        out[OFF_BSX_LIMITED_STARTS..OFF_BSX_LIMITED_STARTS + 2]
            .copy_from_slice(&self.limited_starts.to_le_bytes());
        out[OFF_BSX_MONTH] = self.month;
        out[OFF_BSX_DAY] = self.day;
        out[OFF_BSX_MAP_MODE] = self.rom_mapping;
        out[OFF_BSX_FILE_TYPE] = self.file_type;
        out[OFF_OLD_PUBLISHER] = self.old_publisher_code;
        out[OFF_VERSION] = self.x7fdb;
        out[OFF_COMPLEMENT..OFF_COMPLEMENT + 2]
            .copy_from_slice(&self.checksum_complement.to_le_bytes());
        out[OFF_CHECKSUM..OFF_CHECKSUM + 2].copy_from_slice(&self.checksum.to_le_bytes());
    }

    pub fn has_extended_header(&self) -> bool {
        self.x7fdb != BSX_EXT_INVALID
    }

    pub fn is_deleted(&self) -> bool {
        self.old_publisher_code == 0x00
    }

    /// Broadcast (month, day). Month is the upper nibble, day the upper five bits.
    pub fn date(&self) -> (u8, u8) {
        (self.month >> 4, self.day >> 3)
    }
}

/// Which of the two 48-byte layouts a header uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnesLayoutKind {
    Standard,
    Bsx,
}

impl SnesLayoutKind {
    /// Pick the layout from the discriminating bytes.
    ///
    /// The standard layout wins whenever its mapping byte is a known value.
    /// Otherwise the BS-X layout is used if its own mapping byte is known and
    /// its publisher byte is 0x33 (valid) or 0x00 (deleted).
    pub fn detect(buf: &[u8; SNES_HEADER_SIZE]) -> Self {
        if rom_mapping_name(buf[OFF_MAP_MODE]).is_some() {
            return Self::Standard;
        }
        if rom_mapping_name(buf[OFF_BSX_MAP_MODE]).is_some()
            && matches!(buf[OFF_OLD_PUBLISHER], OLD_PUBLISHER_EXTENDED | 0x00)
        {
            return Self::Bsx;
        }
        Self::Standard
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnesLayout {
    Standard(SnesStandardHeader),
    Bsx(SnesBsxHeader),
}

/// 65C816 native-mode vectors (header bytes 0x30..0x40).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeVectors {
    pub reserved: [u8; 4],
    pub cop: u16,
    pub brk: u16,
    pub abort: u16,
    pub nmi: u16,
    pub reset: u16,
    pub irq: u16,
}

/// 6502 emulation-mode vectors (header bytes 0x40..0x50). IRQ and BRK share
/// one vector in this mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmulationVectors {
    pub reserved1: [u8; 4],
    pub cop: u16,
    pub reserved2: [u8; 2],
    pub abort: u16,
    pub nmi: u16,
    pub res: u16,
    pub irq_brk: u16,
}

/// Decoded 80-byte SNES ROM header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnesRomHeader {
    pub layout: SnesLayout,
    pub native: NativeVectors,
    pub emulation: EmulationVectors,
}

impl SnesRomHeader {
    pub const SIZE: usize = SNES_HEADER_SIZE;

    pub fn decode(buf: &[u8; Self::SIZE], kind: SnesLayoutKind) -> Self {
        let layout = match kind {
            SnesLayoutKind::Standard => SnesLayout::Standard(SnesStandardHeader::decode(buf)),
            SnesLayoutKind::Bsx => SnesLayout::Bsx(SnesBsxHeader::decode(buf)),
        };
        let v = &buf[OFF_VECTORS..];
        Self {
            layout,
            native: NativeVectors {
                reserved: arr(v, 0x00),
                cop: le16(v, 0x04),
                brk: le16(v, 0x06),
                abort: le16(v, 0x08),
                nmi: le16(v, 0x0A),
                reset: le16(v, 0x0C),
                irq: le16(v, 0x0E),
            },
            emulation: EmulationVectors {
                reserved1: arr(v, 0x10),
                cop: le16(v, 0x14),
                reserved2: arr(v, 0x16),
                abort: le16(v, 0x18),
                nmi: le16(v, 0x1A),
                res: le16(v, 0x1C),
                irq_brk: le16(v, 0x1E),
            },
        }
    }

    /// Decode with the layout chosen by [`SnesLayoutKind::detect`].
    pub fn decode_detect(buf: &[u8; Self::SIZE]) -> Self {
        Self::decode(buf, SnesLayoutKind::detect(buf))
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        match &self.layout {
            SnesLayout::Standard(h) => h.encode(&mut out),
            SnesLayout::Bsx(h) => h.encode(&mut out),
        }

        let n = &self.native;
        let v = &mut out[OFF_VECTORS..];
        v[0x00..0x04].copy_from_slice(&n.reserved);
        for (off, val) in [
            (0x04, n.cop),
            (0x06, n.brk),
            (0x08, n.abort),
            (0x0A, n.nmi),
            (0x0C, n.reset),
            (0x0E, n.irq),
        ] {
            v[off..off + 2].copy_from_slice(&val.to_le_bytes());
        }

        let e = &self.emulation;
        v[0x10..0x14].copy_from_slice(&e.reserved1);
        v[0x16..0x18].copy_from_slice(&e.reserved2);
        for (off, val) in [
            (0x14, e.cop),
            (0x18, e.abort),
            (0x1A, e.nmi),
            (0x1C, e.res),
            (0x1E, e.irq_brk),
        ] {
            v[off..off + 2].copy_from_slice(&val.to_le_bytes());
        }
        out
    }

    pub fn kind(&self) -> SnesLayoutKind {
        match self.layout {
            SnesLayout::Standard(_) => SnesLayoutKind::Standard,
            SnesLayout::Bsx(_) => SnesLayoutKind::Bsx,
        }
    }

    pub fn title_bytes(&self) -> &[u8] {
        match &self.layout {
            SnesLayout::Standard(h) => &h.title,
            SnesLayout::Bsx(h) => &h.title,
        }
    }

    pub fn title(&self) -> String {
        read_ascii_fixed(self.title_bytes())
    }

    pub fn rom_mapping(&self) -> u8 {
        match &self.layout {
            SnesLayout::Standard(h) => h.rom_mapping,
            SnesLayout::Bsx(h) => h.rom_mapping,
        }
    }

    pub fn checksum(&self) -> u16 {
        match &self.layout {
            SnesLayout::Standard(h) => h.checksum,
            SnesLayout::Bsx(h) => h.checksum,
        }
    }

    pub fn checksum_complement(&self) -> u16 {
        match &self.layout {
            SnesLayout::Standard(h) => h.checksum_complement,
            SnesLayout::Bsx(h) => h.checksum_complement,
        }
    }

    pub fn has_valid_checksum_pair(&self) -> bool {
        checksum_pair_valid(self.checksum(), self.checksum_complement())
    }
}

// ---------------------------------------------------------------------------
// Lookup functions
// ---------------------------------------------------------------------------

/// Name for a ROM mapping byte, or `None` if the value is not a known mapping.
pub fn rom_mapping_name(mapping: u8) -> Option<&'static str> {
    match mapping {
        0x20 => Some("LoROM"),
        0x21 => Some("HiROM"),
        0x22 => Some("LoROM + S-DD1"),
        0x23 => Some("LoROM + SA-1"),
        0x25 => Some("ExHiROM"),
        0x30 => Some("LoROM + FastROM"),
        0x31 => Some("HiROM + FastROM"),
        0x32 => Some("ExLoROM + FastROM"),
        0x35 => Some("ExHiROM + FastROM"),
        _ => None,
    }
}

fn speed_name(mapping: u8) -> &'static str {
    if mapping & 0x10 != 0 {
        "FastROM (3.58 MHz)"
    } else {
        "SlowROM (2.68 MHz)"
    }
}

fn enhancement_chip_name(rom_type: u8) -> &'static str {
    match rom_type & 0xF0 {
        0x00 => "DSP-1",
        0x10 => "Super FX",
        0x20 => "OBC1",
        0x30 => "SA-1",
        0x40 => "S-DD1",
        0x50 => "S-RTC",
        0xE0 => "Other",
        0xF0 => "Custom",
        _ => "Unknown",
    }
}

/// Cartridge hardware described by the ROM type byte.
pub fn cartridge_hw_name(rom_type: u8) -> String {
    let chip = enhancement_chip_name(rom_type);
    match rom_type & 0x0F {
        0x00 => "ROM".to_string(),
        0x01 => "ROM + RAM".to_string(),
        0x02 => "ROM + RAM + Battery".to_string(),
        0x03 => format!("ROM + {}", chip),
        0x04 => format!("ROM + RAM + {}", chip),
        0x05 => format!("ROM + RAM + Battery + {}", chip),
        0x06 => format!("ROM + Battery + {}", chip),
        0x09 => format!("ROM + Battery + RTC-4513 + {}", chip),
        0x0A => format!("ROM + Battery + RTC + {}", chip),
        other => format!("Unknown (0x{:02X})", other),
    }
}

/// Destination code name.
pub fn destination_name(code: u8) -> Option<&'static str> {
    match code {
        0x00 => Some("Japan"),
        0x01 => Some("North America"),
        0x02 => Some("Europe"),
        0x03 => Some("Scandinavia"),
        0x06 => Some("France"),
        0x07 => Some("Netherlands"),
        0x08 => Some("Spain"),
        0x09 => Some("Germany"),
        0x0A => Some("Italy"),
        0x0B => Some("China"),
        0x0D => Some("South Korea"),
        0x0E => Some("All"),
        0x0F => Some("Canada"),
        0x10 => Some("Brazil"),
        0x11 => Some("Australia"),
        0x12 => Some("Other (X)"),
        0x13 => Some("Other (Y)"),
        0x14 => Some("Other (Z)"),
        _ => None,
    }
}

/// Map a destination code to a region.
pub fn country_to_region(code: u8) -> Region {
    match code {
        0x00 => Region::Japan,
        0x01 => Region::Usa,
        0x02 => Region::Europe,
        0x03 => Region::Scandinavia,
        0x06 => Region::France,
        0x07 => Region::Netherlands,
        0x08 => Region::Spain,
        0x09 => Region::Germany,
        0x0A => Region::Italy,
        0x0B => Region::China,
        0x0D => Region::Korea,
        0x0E => Region::World,
        0x0F => Region::Canada,
        0x10 => Region::Brazil,
        0x11 => Region::Australia,
        _ => Region::Unknown,
    }
}

fn bsx_program_type_name(program_type: u32) -> String {
    match program_type {
        0x000 => "65c816 program".to_string(),
        0x100 => "BS-X script".to_string(),
        0x200 => "SA-1 program".to_string(),
        other => format!("Unknown (0x{:08X})", other),
    }
}

fn publisher_from_new_code(code: &[u8; 2]) -> String {
    let code = read_ascii_fixed(code);
    match maker_code_name(&code) {
        Some(name) => format!("{} ({})", code, name),
        None => code,
    }
}

fn publisher_from_old_code(code: u8) -> String {
    match old_licensee_name(code) {
        Some(name) => format!("{:02X} ({})", code, name),
        None => format!("{:02X}", code),
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Candidate header locations, in preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLocation {
    LoRom,
    HiRom,
    ExHiRom,
}

impl HeaderLocation {
    pub const CANDIDATES: [Self; 3] = [Self::LoRom, Self::HiRom, Self::ExHiRom];

    /// Header offset in a headerless image.
    pub fn address(self) -> u64 {
        match self {
            Self::LoRom => 0x7FB0,
            Self::HiRom => 0xFFB0,
            Self::ExHiRom => 0x40_FFB0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::LoRom => "LoROM",
            Self::HiRom => "HiROM",
            Self::ExHiRom => "ExHiROM",
        }
    }

    /// Location implied by a mapping byte.
    pub fn from_mapping(mapping: u8) -> Option<Self> {
        match mapping {
            0x20 | 0x22 | 0x23 | 0x30 | 0x32 => Some(Self::LoRom),
            0x21 | 0x31 => Some(Self::HiRom),
            0x25 | 0x35 => Some(Self::ExHiRom),
            _ => None,
        }
    }
}

/// Best-scoring header found in an image.
#[derive(Debug, Clone)]
pub struct SnesDetection {
    pub location: HeaderLocation,
    pub copier_header: bool,
    pub header: SnesRomHeader,
    pub score: u32,
}

impl SnesDetection {
    /// Offset of ROM data in the file.
    pub fn data_offset(&self) -> u64 {
        if self.copier_header {
            COPIER_HEADER_SIZE
        } else {
            0
        }
    }
}

/// Score one candidate header. Higher is more plausible.
pub fn score_candidate(header: &SnesRomHeader, location: HeaderLocation) -> u32 {
    let mut score = 0;
    if header.has_valid_checksum_pair() {
        score += 4;
    }
    if HeaderLocation::from_mapping(header.rom_mapping()) == Some(location) {
        score += 3;
    }
    let title = header.title_bytes();
    if is_printable_ascii(title) && title.iter().any(|&b| b != 0 && b != b' ') {
        score += 1;
    }
    match &header.layout {
        SnesLayout::Standard(h) => {
            if (0x07..=0x0D).contains(&h.rom_size) {
                score += 1;
            }
            if h.sram_size <= 0x07 {
                score += 1;
            }
        }
        SnesLayout::Bsx(h) => {
            let (month, _) = h.date();
            if month <= 12 {
                score += 1;
            }
            if h.has_extended_header() {
                score += 1;
            }
        }
    }
    if header.emulation.res >= 0x8000 {
        score += 1;
    }
    score
}

/// Find the most plausible SNES header in `stream`.
///
/// Returns `Ok(None)` if no candidate reaches the acceptance threshold.
/// Ties go to the earlier candidate (LoROM, then HiROM, then ExHiROM).
pub fn detect_header(
    stream: &mut dyn ByteStream,
) -> Result<Option<SnesDetection>, AnalysisError> {
    let size = stream.size();
    let copier_header = size.is_some_and(|s| s % 1024 == COPIER_HEADER_SIZE);
    let base = if copier_header { COPIER_HEADER_SIZE } else { 0 };

    let mut best: Option<SnesDetection> = None;
    for location in HeaderLocation::CANDIDATES {
        let addr = base + location.address();
        if size.is_some_and(|s| addr + SNES_HEADER_SIZE as u64 > s) {
            continue;
        }
        let mut buf = [0u8; SNES_HEADER_SIZE];
        if stream.seek_and_read(addr, &mut buf)? < SNES_HEADER_SIZE {
            continue;
        }
        let header = SnesRomHeader::decode_detect(&buf);
        let score = score_candidate(&header, location);
        log::debug!(
            "SNES candidate {} at 0x{:X}: {:?} layout, score {}",
            location.name(),
            addr,
            header.kind(),
            score
        );
        if best.as_ref().is_none_or(|b| score > b.score) {
            best = Some(SnesDetection {
                location,
                copier_header,
                header,
                score,
            });
        }
    }
    Ok(best.filter(|b| b.score >= MIN_SCORE))
}

// ---------------------------------------------------------------------------
// Checksum
// ---------------------------------------------------------------------------

/// Compute the SNES internal checksum over `rom_len` bytes starting at
/// `data_offset`.
///
/// Sizes that are not a power of two are handled the way the hardware
/// mirrors them: the tail past the largest power of two is repeated until it
/// fills a second block of that size.
pub fn compute_checksum(
    stream: &mut dyn ByteStream,
    data_offset: u64,
    rom_len: u64,
) -> Result<u16, AnalysisError> {
    if rom_len == 0 {
        return Ok(0);
    }
    let power = 1u64 << (63 - rom_len.leading_zeros());

    let mut sum: u16 = 0;
    let mut buf = vec![0u8; CHECKSUM_CHUNK];
    let mut pos = 0u64;
    while pos < power {
        let want = (power - pos).min(CHECKSUM_CHUNK as u64) as usize;
        let n = stream.seek_and_read(data_offset + pos, &mut buf[..want])?;
        if n < want {
            return Err(AnalysisError::TooSmall {
                expected: data_offset + rom_len,
                actual: data_offset + pos + n as u64,
            });
        }
        for &b in &buf[..n] {
            sum = sum.wrapping_add(u16::from(b));
        }
        pos += n as u64;
    }

    let rest_len = rom_len - power;
    if rest_len > 0 {
        let mut rest = vec![0u8; rest_len as usize];
        let n = stream.seek_and_read(data_offset + power, &mut rest)?;
        if n < rest.len() {
            return Err(AnalysisError::TooSmall {
                expected: data_offset + rom_len,
                actual: data_offset + power + n as u64,
            });
        }
        let rest_sum = rest
            .iter()
            .fold(0u16, |acc, &b| acc.wrapping_add(u16::from(b)));
        let repeats = power / rest_len;
        let partial = (power % rest_len) as usize;
        sum = sum.wrapping_add(rest_sum.wrapping_mul(repeats as u16));
        for &b in &rest[..partial] {
            sum = sum.wrapping_add(u16::from(b));
        }
    }
    Ok(sum)
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Analyzer for SNES/Super Famicom ROMs and BS-X flash images.
#[derive(Debug, Default)]
pub struct SnesAnalyzer;

impl SnesAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

fn system_name_for(code: u8) -> &'static str {
    match code {
        0x00 => "Super Famicom",
        0x0D => "Super Comboy",
        _ => "Super Nintendo Entertainment System",
    }
}

fn describe_standard(h: &SnesStandardHeader, id: &mut RomIdentification, f: &mut RomFields) {
    let title = read_ascii_fixed(&h.title);
    f.add_string("Title", title.clone());
    id.internal_name = Some(title);

    if h.has_extended_header() {
        let game_id = read_ascii_fixed(&h.id4);
        if !game_id.is_empty() {
            f.add_string("Game ID", game_id.clone());
            id.serial_number = Some(game_id);
        }
        let publisher = publisher_from_new_code(&h.new_publisher_code);
        f.add_string("Publisher", publisher.clone());
        id.maker_code = Some(publisher);
    } else {
        let publisher = publisher_from_old_code(h.old_publisher_code);
        f.add_string("Publisher", publisher.clone());
        id.maker_code = Some(publisher);
    }

    f.add_string(
        "ROM Mapping",
        rom_mapping_name(h.rom_mapping)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Unknown (0x{:02X})", h.rom_mapping)),
    );
    f.add_string("Speed", speed_name(h.rom_mapping));
    f.add_string("Cartridge HW", cartridge_hw_name(h.rom_type));

    let region = country_to_region(h.destination_code);
    f.add_string(
        "Region",
        destination_name(h.destination_code)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Unknown (0x{:02X})", h.destination_code)),
    );
    id.regions.push(region);

    let version = format!("1.{}", h.version);
    f.add_string("Revision", version.clone());
    id.version = Some(version);

    if h.rom_size <= 0x0D {
        let rom_bytes = 1024u64 << h.rom_size;
        f.add_string("ROM Size", format_bytes(rom_bytes));
        id.expected_size = Some(rom_bytes);
    }
    let sram = if h.sram_size == 0 {
        "None".to_string()
    } else if h.sram_size <= 0x0D {
        format_bytes(1024u64 << h.sram_size)
    } else {
        format!("Unknown (0x{:02X})", h.sram_size)
    };
    f.add_string("SRAM Size", sram);

    id.system_name = Some(system_name_for(h.destination_code).to_string());
}

fn describe_bsx(h: &SnesBsxHeader, id: &mut RomIdentification, f: &mut RomFields) {
    let title = read_ascii_fixed(&h.title);
    f.add_string("Title", title.clone());
    id.internal_name = Some(title);

    let publisher = if h.has_extended_header() {
        publisher_from_new_code(&h.new_publisher_code)
    } else {
        publisher_from_old_code(h.old_publisher_code)
    };
    f.add_string("Publisher", publisher.clone());
    id.maker_code = Some(publisher);

    f.add_string(
        "ROM Mapping",
        rom_mapping_name(h.rom_mapping)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Unknown (0x{:02X})", h.rom_mapping)),
    );
    if h.has_extended_header() {
        f.add_string("Program Type", bsx_program_type_name(h.program_type));
    }

    let (month, day) = h.date();
    if month != 0 {
        f.add_string("Broadcast Date", format!("{:02}/{:02}", month, day));
    }
    let starts = if h.limited_starts & 0x8000 == 0 {
        "Unlimited".to_string()
    } else {
        format!("0x{:04X}", h.limited_starts)
    };
    f.add_string("Limited Starts", starts);
    f.add_string("File Type", format!("0x{:02X}", h.file_type));
    if h.is_deleted() {
        f.add_string("Status", "Deleted");
    }

    id.regions.push(Region::Japan);
    id.system_name = Some("Satellaview BS-X".to_string());
}

impl RomAnalyzer for SnesAnalyzer {
    fn analyze(
        &self,
        stream: &mut dyn ByteStream,
        options: &AnalysisOptions,
    ) -> Result<RomIdentification, AnalysisError> {
        let file_size = stream.size();
        let detection = detect_header(stream)?
            .ok_or_else(|| AnalysisError::invalid_format("No valid SNES header found"))?;
        let header = &detection.header;

        let mut id = RomIdentification::new().with_platform(Platform::Snes);
        id.file_size = file_size;

        let mut fields = RomFields::new();
        fields.set_tab_name(0, "SNES");
        match &header.layout {
            SnesLayout::Standard(h) => describe_standard(h, &mut id, &mut fields),
            SnesLayout::Bsx(h) => describe_bsx(h, &mut id, &mut fields),
        }

        fields.add_string("Header Location", detection.location.name());
        fields.add_string(
            "Format",
            if detection.copier_header {
                "SMC (copier header)"
            } else {
                "SFC (headerless)"
            },
        );
        fields.add_string("Checksum", format!("0x{:04X}", header.checksum()));
        fields.add_string(
            "Checksum Complement Valid",
            if header.has_valid_checksum_pair() {
                "Yes"
            } else {
                "No"
            },
        );

        if !options.quick
            && let SnesLayout::Standard(_) = header.layout
            && let Some(size) = file_size
        {
            let rom_len = size.saturating_sub(detection.data_offset());
            let computed = compute_checksum(stream, detection.data_offset(), rom_len)?;
            let status = if computed == header.checksum() {
                "OK".to_string()
            } else {
                format!(
                    "MISMATCH (expected 0x{:04X}, computed 0x{:04X})",
                    header.checksum(),
                    computed
                )
            };
            fields.add_string("Checksum Status", status);
        }

        Ok(id.with_fields(fields))
    }

    fn platform(&self) -> Platform {
        Platform::Snes
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["sfc", "smc", "swc", "fig", "bs"]
    }

    fn mime_types(&self) -> &'static [&'static str] {
        &["application/vnd.nintendo.snes.rom", "application/x-snes-rom"]
    }

    fn can_handle(&self, stream: &mut dyn ByteStream) -> bool {
        matches!(detect_header(stream), Ok(Some(_)))
    }
}

#[cfg(test)]
#[path = "tests/snes_tests.rs"]
mod tests;
