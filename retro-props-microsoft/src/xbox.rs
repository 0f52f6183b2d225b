//! Xbox and Xbox 360 game disc analyzer.
//!
//! Supports:
//! - Full XGD1/XGD2/XGD3 disc images (.iso)
//! - Extracted XDVDFS images (.xiso)
//!
//! Full images start with an ISO-9660 video partition whose creation time
//! identifies the disc generation; the XDVDFS game partition follows at a
//! generation-specific offset and is read through an [`XdvdfsPartition`]
//! window.

use retro_props_core::iso9660::{PVD_OFFSET, PrimaryVolumeDescriptor};
use retro_props_core::sparse::XdvdfsPartition;
use retro_props_core::util::format_bytes;
use retro_props_core::{
    AnalysisError, AnalysisOptions, ByteStream, Platform, RomAnalyzer, RomFields,
    RomIdentification, SparseBlockReader,
};

use crate::xdvdfs::{XDVDFS_HEADER_OFFSET, XdvdfsHeader};
use crate::xgd::{XboxDiscType, classify_pvd};

/// Result of a successful Xbox disc detection.
#[derive(Debug, Clone)]
pub struct XboxDetection {
    pub disc_type: XboxDiscType,
    pub header: XdvdfsHeader,
    /// Sector 16 of the image, decoded whether or not it is a valid PVD.
    pub pvd: PrimaryVolumeDescriptor,
}

/// Read the XDVDFS header from the partition implied by `disc_type`.
///
/// Returns `Ok(None)` on a short read.
fn read_xdvdfs_header(
    stream: &mut dyn ByteStream,
    disc_type: Option<XboxDiscType>,
) -> Result<Option<XdvdfsHeader>, AnalysisError> {
    let mut buf = [0u8; XdvdfsHeader::SIZE];
    let base = disc_type.map_or(0, XboxDiscType::xdvdfs_base);
    let part_size = stream
        .size()
        .map_or(u64::MAX - base, |s| s.saturating_sub(base));

    let n = match XdvdfsPartition::new(base, part_size) {
        Some(part) => {
            let mut reader = SparseBlockReader::new(stream.dup()?, part)?;
            reader.seek_and_read(XDVDFS_HEADER_OFFSET, &mut buf)?
        }
        None => stream.seek_and_read(XDVDFS_HEADER_OFFSET, &mut buf)?,
    };
    if n < buf.len() {
        log::debug!(
            "XDVDFS: short header read at 0x{:X} ({} bytes)",
            base + XDVDFS_HEADER_OFFSET,
            n
        );
        return Ok(None);
    }
    Ok(Some(XdvdfsHeader::decode(&buf)))
}

/// Detect an Xbox Game Disc or extracted XDVDFS image.
///
/// The PVD creation time picks the generation; the XDVDFS header must then
/// carry both magic copies at that generation's offset. A volume with no
/// generation match but a valid header at offset 0 is an extracted image.
pub fn detect(stream: &mut dyn ByteStream) -> Result<Option<XboxDetection>, AnalysisError> {
    if !stream.is_open() {
        return Err(AnalysisError::NotOpen);
    }

    let mut raw = [0u8; PrimaryVolumeDescriptor::SIZE];
    if stream.seek_and_read(PVD_OFFSET, &mut raw)? < raw.len() {
        return Ok(None);
    }
    let pvd = PrimaryVolumeDescriptor::decode(&raw);
    let hint = classify_pvd(&pvd);

    let Some(header) = read_xdvdfs_header(stream, hint)? else {
        return Ok(None);
    };
    if !header.has_valid_magic() {
        log::debug!("XDVDFS: magic mismatch for {:?}", hint);
        return Ok(None);
    }

    Ok(Some(XboxDetection {
        disc_type: hint.unwrap_or(XboxDiscType::Extracted),
        header,
        pvd,
    }))
}

/// Analyzer for Xbox and Xbox 360 game discs.
#[derive(Debug, Default)]
pub struct XboxAnalyzer;

impl XboxAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl RomAnalyzer for XboxAnalyzer {
    fn analyze(
        &self,
        stream: &mut dyn ByteStream,
        options: &AnalysisOptions,
    ) -> Result<RomIdentification, AnalysisError> {
        let file_size = stream.size();
        let det = detect(stream)?
            .ok_or_else(|| AnalysisError::invalid_format("Not a valid Xbox disc image"))?;
        let disc_type = det.disc_type;

        let (platform, tab) = if disc_type.is_xbox360() {
            (Platform::Xbox360, "Xbox 360")
        } else {
            (Platform::Xbox, "Xbox")
        };

        let mut fields = RomFields::new();
        fields.set_tab_name(0, tab);
        fields.add_string("Disc Type", disc_type.description());
        fields.add_datetime("Timestamp", det.header.unix_timestamp(), true, true);
        fields.add_string(
            "Root Directory",
            format!(
                "sector {}, {}",
                det.header.root_dir_sector,
                format_bytes(u64::from(det.header.root_dir_size))
            ),
        );

        if options.recurse_iso && disc_type != XboxDiscType::Extracted && det.pvd.is_valid() {
            fields.add_group("ISO-9660", det.pvd.fields());
        }

        let mut id = RomIdentification::new()
            .with_platform(platform)
            .with_system_name(platform.display_name())
            .with_fields(fields);
        id.file_size = file_size;
        Ok(id)
    }

    fn platform(&self) -> Platform {
        Platform::Xbox
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["iso", "xiso"]
    }

    fn mime_types(&self) -> &'static [&'static str] {
        &["application/x-iso9660-image"]
    }

    fn can_handle(&self, stream: &mut dyn ByteStream) -> bool {
        matches!(detect(stream), Ok(Some(_)))
    }
}

#[cfg(test)]
#[path = "tests/xbox_tests.rs"]
mod tests;
