//! Plain ISO-9660 analyzer, used when no console format claims a disc.

use retro_props_core::iso9660::{PrimaryVolumeDescriptor, read_pvd};
use retro_props_core::{
    AnalysisError, AnalysisOptions, ByteStream, Platform, RomAnalyzer, RomIdentification,
};

#[derive(Debug, Default)]
pub struct IsoAnalyzer;

impl IsoAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl RomAnalyzer for IsoAnalyzer {
    fn analyze(
        &self,
        stream: &mut dyn ByteStream,
        _options: &AnalysisOptions,
    ) -> Result<RomIdentification, AnalysisError> {
        if !stream.is_open() {
            return Err(AnalysisError::NotOpen);
        }
        let file_size = stream.size();
        let pvd = read_pvd(stream)?
            .ok_or_else(|| AnalysisError::invalid_format("No ISO-9660 primary volume descriptor"))?;

        let volume_id = PrimaryVolumeDescriptor::text(&pvd.volume_id);
        let mut id = RomIdentification::new()
            .with_platform(Platform::Iso9660)
            .with_system_name("ISO-9660")
            .with_fields(pvd.fields());
        if !volume_id.is_empty() {
            id.internal_name = Some(volume_id);
        }
        id.file_size = file_size;
        id.expected_size = Some(pvd.volume_size());
        Ok(id)
    }

    fn platform(&self) -> Platform {
        Platform::Iso9660
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["iso"]
    }

    fn mime_types(&self) -> &'static [&'static str] {
        &["application/x-iso9660-image"]
    }

    fn can_handle(&self, stream: &mut dyn ByteStream) -> bool {
        matches!(read_pvd(stream), Ok(Some(_)))
    }
}
