//! Nintendo GameCube disc image analyzer.
//!
//! Supports:
//! - ISO/GCM images (.iso, .gcm)
//! - CISO compact images (.ciso)
//! - GCZ compressed images (.gcz)
//!
//! Container images are opened through [`SparseBlockReader`] so the disc
//! header is read from the logical address space. The header decoding here
//! is shared with the Wii analyzer; both consoles use the same boot block.

use retro_props_core::util::{format_bytes, read_ascii_fixed};
use retro_props_core::{
    AnalysisError, AnalysisOptions, ByteStream, DiscContainer, Platform, Region, RomAnalyzer,
    RomFields, RomIdentification, SparseBlockReader,
};

use crate::licensee::maker_code_name;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Big-endian magic at 0x18 on Wii discs.
pub const WII_MAGIC: u32 = 0x5D1C_9EA3;

/// Big-endian magic at 0x1C on GameCube discs.
pub const GCN_MAGIC: u32 = 0xC233_9F3D;

const OFF_WII_MAGIC: usize = 0x18;
const OFF_GCN_MAGIC: usize = 0x1C;
const OFF_TITLE: usize = 0x20;
const TITLE_LEN: usize = 64;

// ---------------------------------------------------------------------------
// Disc header
// ---------------------------------------------------------------------------

/// First 0x60 bytes of a GameCube/Wii boot block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscHeader {
    /// Console ID, two-character game code, region code, two-character maker.
    pub id6: [u8; 6],
    pub disc_number: u8,
    pub revision: u8,
    pub audio_streaming: u8,
    pub stream_buffer_size: u8,
    pub reserved: [u8; 14],
    pub wii_magic: u32,
    pub gcn_magic: u32,
    pub title: [u8; TITLE_LEN],
}

impl DiscHeader {
    pub const SIZE: usize = 0x60;

    pub fn decode(buf: &[u8; Self::SIZE]) -> Self {
        let mut id6 = [0u8; 6];
        id6.copy_from_slice(&buf[0..6]);
        let mut reserved = [0u8; 14];
        reserved.copy_from_slice(&buf[0x0A..OFF_WII_MAGIC]);
        let mut title = [0u8; TITLE_LEN];
        title.copy_from_slice(&buf[OFF_TITLE..OFF_TITLE + TITLE_LEN]);
        let be32 = |off: usize| {
            u32::from_be_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]])
        };
        Self {
            id6,
            disc_number: buf[6],
            revision: buf[7],
            audio_streaming: buf[8],
            stream_buffer_size: buf[9],
            reserved,
            wii_magic: be32(OFF_WII_MAGIC),
            gcn_magic: be32(OFF_GCN_MAGIC),
            title,
        }
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..6].copy_from_slice(&self.id6);
        out[6] = self.disc_number;
        out[7] = self.revision;
        out[8] = self.audio_streaming;
        out[9] = self.stream_buffer_size;
        out[0x0A..OFF_WII_MAGIC].copy_from_slice(&self.reserved);
        out[OFF_WII_MAGIC..OFF_WII_MAGIC + 4].copy_from_slice(&self.wii_magic.to_be_bytes());
        out[OFF_GCN_MAGIC..OFF_GCN_MAGIC + 4].copy_from_slice(&self.gcn_magic.to_be_bytes());
        out[OFF_TITLE..OFF_TITLE + TITLE_LEN].copy_from_slice(&self.title);
        out
    }

    pub fn is_gamecube(&self) -> bool {
        self.gcn_magic == GCN_MAGIC
    }

    pub fn is_wii(&self) -> bool {
        self.wii_magic == WII_MAGIC
    }

    pub fn game_id(&self) -> String {
        read_ascii_fixed(&self.id6)
    }

    pub fn maker_code(&self) -> String {
        read_ascii_fixed(&self.id6[4..6])
    }

    pub fn title(&self) -> String {
        let end = self.title.iter().position(|&b| b == 0).unwrap_or(TITLE_LEN);
        read_ascii_fixed(&self.title[..end])
    }

    /// Region from the fourth character of the game ID.
    pub fn region(&self) -> Region {
        Region::from_code_char(self.id6[3] as char).unwrap_or(Region::Unknown)
    }
}

/// A disc header together with how it was reached.
#[derive(Debug, Clone)]
pub struct DiscProbe {
    pub header: DiscHeader,
    /// Container name, or `None` for a plain image.
    pub container: Option<&'static str>,
    /// Logical size of the disc image.
    pub disc_size: Option<u64>,
}

/// Read the boot block, going through a container map if one is present.
///
/// Returns `Ok(None)` if the image is too short to hold a header.
pub fn probe_disc(stream: &mut dyn ByteStream) -> Result<Option<DiscProbe>, AnalysisError> {
    let mut buf = [0u8; DiscHeader::SIZE];
    let (n, container, disc_size) = match DiscContainer::open(stream)? {
        Some(map) => {
            let name = map.name();
            let mut reader = SparseBlockReader::new(stream.dup()?, map)?;
            let n = reader.seek_and_read(0, &mut buf)?;
            (n, Some(name), reader.size())
        }
        None => (stream.seek_and_read(0, &mut buf)?, None, stream.size()),
    };
    if n < DiscHeader::SIZE {
        return Ok(None);
    }
    Ok(Some(DiscProbe {
        header: DiscHeader::decode(&buf),
        container,
        disc_size,
    }))
}

/// Build the identification shared by the GameCube and Wii analyzers.
pub(crate) fn describe_disc(
    probe: &DiscProbe,
    platform: Platform,
    file_size: Option<u64>,
) -> RomIdentification {
    let h = &probe.header;
    let mut fields = RomFields::new();
    fields.set_tab_name(
        0,
        match platform {
            Platform::Wii => "Wii",
            _ => "GameCube",
        },
    );

    let title = h.title();
    fields.add_string("Title", title.clone());
    let game_id = h.game_id();
    fields.add_string("Game ID", game_id.clone());

    let maker = h.maker_code();
    let publisher = match maker_code_name(&maker) {
        Some(name) => format!("{} ({})", maker, name),
        None => maker,
    };
    fields.add_string("Publisher", publisher.clone());

    let region = h.region();
    fields.add_string("Region", region.name());
    fields.add_string("Disc", format!("{}", u16::from(h.disc_number) + 1));
    let version = format!("1.{:02}", h.revision);
    fields.add_string("Revision", version.clone());
    if platform == Platform::GameCube {
        fields.add_string(
            "Audio Streaming",
            if h.audio_streaming != 0 { "Yes" } else { "No" },
        );
    }
    fields.add_string("Container", probe.container.unwrap_or("Plain ISO"));
    if let Some(size) = probe.disc_size {
        fields.add_string("Disc Size", format_bytes(size));
    }

    let mut id = RomIdentification::new()
        .with_platform(platform)
        .with_system_name(platform.display_name())
        .with_internal_name(title)
        .with_serial(game_id)
        .with_region(region)
        .with_fields(fields);
    id.version = Some(version);
    id.maker_code = Some(publisher);
    id.file_size = file_size;
    id
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Analyzer for Nintendo GameCube disc images.
#[derive(Debug, Default)]
pub struct GameCubeAnalyzer;

impl GameCubeAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl RomAnalyzer for GameCubeAnalyzer {
    fn analyze(
        &self,
        stream: &mut dyn ByteStream,
        _options: &AnalysisOptions,
    ) -> Result<RomIdentification, AnalysisError> {
        let file_size = stream.size();
        let probe = probe_disc(stream)?
            .filter(|p| p.header.is_gamecube())
            .ok_or_else(|| AnalysisError::invalid_format("No GameCube disc magic"))?;
        log::debug!(
            "GameCube disc {} via {}",
            probe.header.game_id(),
            probe.container.unwrap_or("plain image")
        );
        Ok(describe_disc(&probe, Platform::GameCube, file_size))
    }

    fn platform(&self) -> Platform {
        Platform::GameCube
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["iso", "gcm", "ciso", "gcz"]
    }

    fn mime_types(&self) -> &'static [&'static str] {
        &["application/x-gamecube-iso-image", "application/x-gcz-image"]
    }

    fn can_handle(&self, stream: &mut dyn ByteStream) -> bool {
        matches!(probe_disc(stream), Ok(Some(p)) if p.header.is_gamecube())
    }
}

#[cfg(test)]
#[path = "tests/gamecube_tests.rs"]
mod tests;
