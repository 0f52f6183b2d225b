//! High-level entry point: analyzer registry, plain ISO-9660 fallback,
//! settings, and field reports.

pub mod context;
pub mod iso;
pub mod settings;

pub use context::{AnalysisContext, Console, FieldReport, RegisteredConsole};
pub use iso::IsoAnalyzer;
pub use settings::{AnalysisSettings, DownloadSettings, Settings, SettingsError};

pub use retro_props_core::{
    AnalysisError, AnalysisOptions, ByteStream, Field, FieldValue, FileStream, MemStream,
    Platform, Region, RomAnalyzer, RomFields, RomIdentification, util,
};

/// Create a context with every built-in analyzer, in detection order.
///
/// Disc formats with hard signatures come first, the SNES header heuristic
/// after them, and the plain ISO-9660 fallback last so Xbox discs (which
/// also carry a valid PVD) are never reported as plain ISO.
pub fn create_context() -> AnalysisContext {
    let mut ctx = AnalysisContext::new();

    // Nintendo discs
    ctx.register(retro_props_nintendo::GameCubeAnalyzer::new());
    ctx.register(retro_props_nintendo::WiiAnalyzer::new());

    // Microsoft
    ctx.register(retro_props_microsoft::XboxAnalyzer::new());

    // Cartridges
    ctx.register(retro_props_nintendo::SnesAnalyzer::new());

    // Fallback
    ctx.register(IsoAnalyzer::new());

    ctx
}
