use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod error;
pub mod fields;
pub mod iso9660;
pub mod platform;
pub mod region;
pub mod sparse;
pub mod stream;
pub mod util;

pub use error::AnalysisError;
pub use fields::{Field, FieldValue, RomFields};
pub use platform::{Platform, PlatformParseError};
pub use region::Region;
pub use sparse::{BlockAddr, BlockMap, DiscContainer, SparseBlockReader};
pub use stream::{ByteStream, FileStream, MemStream, StreamCursor};

/// Options that control how analysis is performed.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Quick mode: read as little data as possible.
    /// Useful for network shares or slow storage.
    pub quick: bool,

    /// Path to the file being analyzed, if it came from disk.
    pub file_path: Option<PathBuf>,

    /// Decode an embedded ISO-9660 volume as a nested field group.
    pub recurse_iso: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            quick: false,
            file_path: None,
            recurse_iso: true,
        }
    }
}

impl AnalysisOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quick(mut self, quick: bool) -> Self {
        self.quick = quick;
        self
    }

    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn recurse_iso(mut self, recurse: bool) -> Self {
        self.recurse_iso = recurse;
        self
    }
}

/// Information extracted from analyzing a ROM or disc image.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RomIdentification {
    /// Serial number / game ID (e.g., "GALE01" for GameCube)
    pub serial_number: Option<String>,

    /// Internal name stored in the header
    pub internal_name: Option<String>,

    /// Region(s) the image is intended for
    pub regions: Vec<Region>,

    /// Version or revision number
    pub version: Option<String>,

    /// Actual file size on disk in bytes
    pub file_size: Option<u64>,

    /// Expected size in bytes, derived from header metadata.
    /// Compare with `file_size` to detect truncated or padded dumps.
    pub expected_size: Option<u64>,

    /// Platform/console identifier
    pub platform: Option<Platform>,

    /// Human-readable system name, which may be more specific than the
    /// platform (e.g. "Satellaview BS-X").
    pub system_name: Option<String>,

    /// Maker/publisher code
    pub maker_code: Option<String>,

    /// Full decoded field tree.
    pub fields: RomFields,
}

impl RomIdentification {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    pub fn with_internal_name(mut self, name: impl Into<String>) -> Self {
        self.internal_name = Some(name.into());
        self
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.regions.push(region);
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn with_system_name(mut self, name: impl Into<String>) -> Self {
        self.system_name = Some(name.into());
        self
    }

    pub fn with_fields(mut self, fields: RomFields) -> Self {
        self.fields = fields;
        self
    }
}

/// Trait for analyzing ROM files and disc images.
///
/// Implementors decode the format's fixed-layout header(s) and report what
/// they find. Analyzers are stateless; all state lives in the stream.
pub trait RomAnalyzer: Send + Sync {
    /// Analyze an image and extract identification information.
    ///
    /// # Returns
    /// * `Ok(RomIdentification)` - Successfully extracted identification info
    /// * `Err(AnalysisError)` - Not this format, or a read failed
    fn analyze(
        &self,
        stream: &mut dyn ByteStream,
        options: &AnalysisOptions,
    ) -> Result<RomIdentification, AnalysisError>;

    /// Returns the platform this analyzer handles.
    fn platform(&self) -> Platform;

    /// Returns the full name of the platform this analyzer handles.
    fn platform_name(&self) -> &'static str {
        self.platform().display_name()
    }

    /// Returns the short name used for CLI matching.
    fn short_name(&self) -> &'static str {
        self.platform().short_name()
    }

    fn manufacturer(&self) -> &'static str {
        self.platform().manufacturer()
    }

    /// Returns file extensions commonly associated with this format.
    fn file_extensions(&self) -> &'static [&'static str];

    /// MIME types for this format.
    fn mime_types(&self) -> &'static [&'static str] {
        &[]
    }

    /// Check if the stream contains data this analyzer can handle.
    ///
    /// A cheap signature check; never an error. Read failures count as
    /// "not handled".
    fn can_handle(&self, stream: &mut dyn ByteStream) -> bool;
}
