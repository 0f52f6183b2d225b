use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// Unknown or unsupported system name
    #[error("Unknown system: {0}")]
    UnknownSystem(String),

    /// Settings file could not be read or written
    #[error("Config error: {0}")]
    Config(#[from] retro_props_lib::SettingsError),

    /// JSON output failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// One or more files could not be analyzed
    #[error("Analysis error: {0}")]
    Analysis(String),
}

impl CliError {
    pub(crate) fn unknown_system(msg: impl Into<String>) -> Self {
        Self::UnknownSystem(msg.into())
    }

    pub(crate) fn analysis(msg: impl Into<String>) -> Self {
        Self::Analysis(msg.into())
    }
}
