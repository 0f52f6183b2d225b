//! Analyzer registry with ordered auto-detection.

use retro_props_core::{
    AnalysisError, AnalysisOptions, ByteStream, Platform, RomAnalyzer, RomFields,
    RomIdentification,
};

/// Metadata about a registered analyzer.
#[derive(Debug, Clone)]
pub struct Console {
    /// Platform identifier
    pub platform: Platform,
    /// Short name (e.g., "snes", "xbox")
    pub short_name: &'static str,
    /// Full platform name
    pub platform_name: &'static str,
    /// Manufacturer name
    pub manufacturer: &'static str,
    /// File extensions
    pub extensions: &'static [&'static str],
    pub mime_types: &'static [&'static str],
}

impl Console {
    /// Create console metadata from an analyzer.
    pub fn from_analyzer<A: RomAnalyzer>(analyzer: &A) -> Self {
        Self {
            platform: analyzer.platform(),
            short_name: analyzer.short_name(),
            platform_name: analyzer.platform_name(),
            manufacturer: analyzer.manufacturer(),
            extensions: analyzer.file_extensions(),
            mime_types: analyzer.mime_types(),
        }
    }
}

/// A registered analyzer with its metadata.
pub struct RegisteredConsole {
    pub metadata: Console,
    pub analyzer: Box<dyn RomAnalyzer>,
}

impl RegisteredConsole {
    pub fn new<A: RomAnalyzer + 'static>(analyzer: A) -> Self {
        let metadata = Console::from_analyzer(&analyzer);
        Self {
            metadata,
            analyzer: Box::new(analyzer),
        }
    }
}

/// Context holding all registered analyzers.
///
/// Registration order is detection order: [`AnalysisContext::identify`]
/// hands the stream to the first analyzer whose `can_handle` accepts it.
pub struct AnalysisContext {
    consoles: Vec<RegisteredConsole>,
}

impl Default for AnalysisContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisContext {
    /// Create a new empty context.
    pub fn new() -> Self {
        Self {
            consoles: Vec::new(),
        }
    }

    /// Register an analyzer at the lowest priority so far.
    pub fn register<A: RomAnalyzer + 'static>(&mut self, analyzer: A) -> &mut Self {
        self.consoles.push(RegisteredConsole::new(analyzer));
        self
    }

    /// All registered analyzers, in detection order.
    pub fn consoles(&self) -> impl Iterator<Item = &RegisteredConsole> {
        self.consoles.iter()
    }

    /// Get an analyzer by its `Platform` enum variant.
    pub fn get_by_platform(&self, platform: Platform) -> Option<&RegisteredConsole> {
        self.consoles
            .iter()
            .find(|c| c.metadata.platform == platform)
    }

    /// Get an analyzer by short name or alias.
    pub fn get_by_short_name(&self, short_name: &str) -> Option<&RegisteredConsole> {
        short_name
            .parse::<Platform>()
            .ok()
            .and_then(|p| self.get_by_platform(p))
    }

    /// Analyzers that list `ext` (without the dot, any case) as a known extension.
    pub fn find_by_extension(&self, ext: &str) -> Vec<&RegisteredConsole> {
        let ext = ext.trim_start_matches('.').to_lowercase();
        self.consoles
            .iter()
            .filter(|c| c.metadata.extensions.iter().any(|e| *e == ext))
            .collect()
    }

    /// List all short names.
    pub fn short_names(&self) -> Vec<&'static str> {
        self.consoles
            .iter()
            .map(|c| c.metadata.short_name)
            .collect()
    }

    /// First analyzer that accepts the stream.
    pub fn detect(&self, stream: &mut dyn ByteStream) -> Option<&RegisteredConsole> {
        let found = self.consoles.iter().find(|c| c.analyzer.can_handle(&mut *stream));
        match found {
            Some(c) => log::debug!("Detected {}", c.metadata.platform_name),
            None => log::debug!("No analyzer accepted the stream"),
        }
        found
    }

    /// Detect the format and run its analyzer.
    pub fn identify(
        &self,
        stream: &mut dyn ByteStream,
        options: &AnalysisOptions,
    ) -> Result<RomIdentification, AnalysisError> {
        if !stream.is_open() {
            return Err(AnalysisError::NotOpen);
        }
        let console = self
            .detect(stream)
            .ok_or_else(|| AnalysisError::invalid_format("Unrecognized image format"))?;
        console.analyzer.analyze(stream, options)
    }

    /// Like [`identify`](Self::identify), folded into a validity flag and a
    /// negative POSIX error code.
    pub fn report(&self, stream: &mut dyn ByteStream, options: &AnalysisOptions) -> FieldReport {
        FieldReport::from_result(self.identify(stream, options))
    }
}

/// Outcome of analyzing one stream.
#[derive(Debug, Clone)]
pub struct FieldReport {
    pub valid: bool,
    /// 0 when valid; `-EBADF` if the stream was not open, `-EIO` otherwise.
    pub error_code: i32,
    pub identification: Option<RomIdentification>,
}

impl FieldReport {
    pub fn from_result(result: Result<RomIdentification, AnalysisError>) -> Self {
        match result {
            Ok(id) => Self {
                valid: true,
                error_code: 0,
                identification: Some(id),
            },
            Err(e) => {
                log::debug!("Analysis failed: {}", e);
                Self {
                    valid: false,
                    error_code: e.errno(),
                    identification: None,
                }
            }
        }
    }

    pub fn fields(&self) -> Option<&RomFields> {
        self.identification.as_ref().map(|id| &id.fields)
    }
}

#[cfg(test)]
#[path = "tests/context_tests.rs"]
mod tests;
