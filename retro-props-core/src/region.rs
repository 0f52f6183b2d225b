use serde::{Deserialize, Serialize};

/// Geographic regions for ROM and disc releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    /// Japan
    Japan,
    /// USA / North America
    Usa,
    /// Europe (PAL regions)
    Europe,
    Scandinavia,
    France,
    Netherlands,
    Spain,
    Germany,
    Italy,
    China,
    Korea,
    Canada,
    Brazil,
    Australia,
    /// World / Region-free
    World,
    /// Unknown region
    Unknown,
}

impl Region {
    /// Returns the standard abbreviation for this region.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Japan => "JPN",
            Self::Usa => "USA",
            Self::Europe => "EUR",
            Self::Scandinavia => "SCN",
            Self::France => "FRA",
            Self::Netherlands => "HOL",
            Self::Spain => "SPA",
            Self::Germany => "GER",
            Self::Italy => "ITA",
            Self::China => "CHN",
            Self::Korea => "KOR",
            Self::Canada => "CAN",
            Self::Brazil => "BRA",
            Self::Australia => "AUS",
            Self::World => "WLD",
            Self::Unknown => "UNK",
        }
    }

    /// Returns the full name of this region.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Japan => "Japan",
            Self::Usa => "North America",
            Self::Europe => "Europe",
            Self::Scandinavia => "Scandinavia",
            Self::France => "France",
            Self::Netherlands => "Netherlands",
            Self::Spain => "Spain",
            Self::Germany => "Germany",
            Self::Italy => "Italy",
            Self::China => "China",
            Self::Korea => "South Korea",
            Self::Canada => "Canada",
            Self::Brazil => "Brazil",
            Self::Australia => "Australia",
            Self::World => "World",
            Self::Unknown => "Unknown",
        }
    }

    /// Attempt to parse a region from a code character (common in game IDs).
    pub fn from_code_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'J' => Some(Self::Japan),
            'E' => Some(Self::Usa),
            'P' => Some(Self::Europe), // PAL
            'F' => Some(Self::France),
            'D' => Some(Self::Germany),
            'S' => Some(Self::Spain),
            'I' => Some(Self::Italy),
            'H' => Some(Self::Netherlands),
            'U' => Some(Self::Australia),
            'K' => Some(Self::Korea),
            'C' => Some(Self::China),
            'W' => Some(Self::World),
            _ => None,
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
