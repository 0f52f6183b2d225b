//! Nintendo Wii disc image analyzer.
//!
//! Supports:
//! - ISO images (.iso)
//! - WBFS images (.wbfs)
//! - CISO compact images (.ciso)
//! - GCZ compressed images (.gcz)
//!
//! The boot block is the GameCube one with the Wii magic at 0x18; see
//! [`crate::gamecube`] for the shared decoder.

use retro_props_core::{
    AnalysisError, AnalysisOptions, ByteStream, Platform, RomAnalyzer, RomIdentification,
};

use crate::gamecube::{describe_disc, probe_disc};

/// Analyzer for Nintendo Wii disc images.
#[derive(Debug, Default)]
pub struct WiiAnalyzer;

impl WiiAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl RomAnalyzer for WiiAnalyzer {
    fn analyze(
        &self,
        stream: &mut dyn ByteStream,
        _options: &AnalysisOptions,
    ) -> Result<RomIdentification, AnalysisError> {
        let file_size = stream.size();
        let probe = probe_disc(stream)?
            .filter(|p| p.header.is_wii())
            .ok_or_else(|| AnalysisError::invalid_format("No Wii disc magic"))?;
        log::debug!(
            "Wii disc {} via {}",
            probe.header.game_id(),
            probe.container.unwrap_or("plain image")
        );
        Ok(describe_disc(&probe, Platform::Wii, file_size))
    }

    fn platform(&self) -> Platform {
        Platform::Wii
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["iso", "wbfs", "ciso", "gcz"]
    }

    fn mime_types(&self) -> &'static [&'static str] {
        &["application/x-wii-iso-image", "application/x-wbfs"]
    }

    fn can_handle(&self, stream: &mut dyn ByteStream) -> bool {
        matches!(probe_disc(stream), Ok(Some(p)) if p.header.is_wii())
    }
}
