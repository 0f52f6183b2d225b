use serde::{Deserialize, Serialize};

/// Platform/format identifiers for all supported image types.
///
/// Centralizes short names, display names, manufacturer, and aliases so
/// analyzers and the CLI never string-match on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    // Nintendo
    Snes,
    GameCube,
    Wii,

    // Microsoft
    Xbox,
    Xbox360,

    // Plain data discs
    Iso9660,
}

/// All platform variants in registration order.
const ALL_PLATFORMS: &[Platform] = &[
    Platform::Snes,
    Platform::GameCube,
    Platform::Wii,
    Platform::Xbox,
    Platform::Xbox360,
    Platform::Iso9660,
];

impl Platform {
    /// Canonical short name used for CLI arguments and identifiers.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Snes => "snes",
            Self::GameCube => "gamecube",
            Self::Wii => "wii",
            Self::Xbox => "xbox",
            Self::Xbox360 => "xbox360",
            Self::Iso9660 => "iso",
        }
    }

    /// Full display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Snes => "Super Nintendo Entertainment System",
            Self::GameCube => "Nintendo GameCube",
            Self::Wii => "Nintendo Wii",
            Self::Xbox => "Microsoft Xbox",
            Self::Xbox360 => "Microsoft Xbox 360",
            Self::Iso9660 => "ISO-9660 Disc Image",
        }
    }

    pub fn manufacturer(&self) -> &'static str {
        match self {
            Self::Snes | Self::GameCube | Self::Wii => "Nintendo",
            Self::Xbox | Self::Xbox360 => "Microsoft",
            Self::Iso9660 => "Generic",
        }
    }

    /// All accepted names for this platform (case-insensitive matching).
    ///
    /// The canonical short name always comes first.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Snes => &["snes", "sfc", "super famicom", "super nintendo", "satellaview"],
            Self::GameCube => &["gamecube", "gcn", "gc", "ngc"],
            Self::Wii => &["wii", "rvl"],
            Self::Xbox => &["xbox", "xbox1", "ogxbox"],
            Self::Xbox360 => &["xbox360", "xbox 360", "x360"],
            Self::Iso9660 => &["iso", "iso9660", "cd", "dvd"],
        }
    }

    pub fn all() -> &'static [Platform] {
        ALL_PLATFORMS
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Error returned when a string cannot be parsed into a `Platform`.
#[derive(Debug, Clone)]
pub struct PlatformParseError(pub String);

impl std::fmt::Display for PlatformParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown platform: '{}'", self.0)
    }
}

impl std::error::Error for PlatformParseError {}

impl std::str::FromStr for Platform {
    type Err = PlatformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        ALL_PLATFORMS
            .iter()
            .copied()
            .find(|p| p.aliases().contains(&lower.as_str()))
            .ok_or_else(|| PlatformParseError(s.to_string()))
    }
}

#[cfg(test)]
#[path = "tests/platform_tests.rs"]
mod tests;
