//! Application settings.
//!
//! Stored as TOML at `<config dir>/retro-props/settings.toml`. A missing file
//! means defaults; a missing key means that key's default. Settings are an
//! explicit value: callers load them once and turn them into
//! [`AnalysisOptions`] for each analysis.

use std::io;
use std::path::{Path, PathBuf};

use retro_props_core::AnalysisOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// `[analysis]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Skip whole-file checksum passes.
    pub quick: bool,
    /// Add the nested ISO-9660 group for Xbox discs.
    pub recurse_iso: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            quick: false,
            recurse_iso: true,
        }
    }
}

/// `[downloads]` table. Only read by frontends that fetch artwork.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    pub ext_img_download: bool,
    pub use_int_icon_for_small_sizes: bool,
    pub download_high_res_scans: bool,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            ext_img_download: true,
            use_int_icon_for_small_sizes: true,
            download_high_res_scans: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub analysis: AnalysisSettings,
    pub downloads: DownloadSettings,
}

/// Canonical path to the settings file.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("retro-props").join("settings.toml")
}

impl Settings {
    /// Load from [`settings_path`].
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&settings_path())
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn to_toml_string(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = self.to_toml_string()?;
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, &serialized)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Analysis options for one call.
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions::new()
            .quick(self.analysis.quick)
            .recurse_iso(self.analysis.recurse_iso)
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
