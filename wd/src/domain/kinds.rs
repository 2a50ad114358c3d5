//! Fixed vocabularies: waste types, priorities and service zones

use serde::{Deserialize, Serialize};

/// Kind of waste a request or schedule slot is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WasteType {
    Biodegradable,
    Recyclable,
    Hazardous,
}

impl WasteType {
    /// Rotation order used by the default schedule
    pub const ALL: [WasteType; 3] = [Self::Biodegradable, Self::Recyclable, Self::Hazardous];
}

impl std::fmt::Display for WasteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Biodegradable => write!(f, "Biodegradable"),
            Self::Recyclable => write!(f, "Recyclable"),
            Self::Hazardous => write!(f, "Hazardous"),
        }
    }
}

impl std::str::FromStr for WasteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "biodegradable" => Ok(Self::Biodegradable),
            "recyclable" => Ok(Self::Recyclable),
            "hazardous" => Ok(Self::Hazardous),
            _ => Err(format!("Unknown waste type: {}", s)),
        }
    }
}

/// Request urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

/// Service zone a collector covers or a schedule slot is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Zone {
    #[serde(rename = "North Zone")]
    North,
    #[serde(rename = "South Zone")]
    South,
    #[serde(rename = "East Zone")]
    East,
    #[serde(rename = "West Zone")]
    West,
}

impl Zone {
    /// Zones in rotation order
    pub const ALL: [Zone; 4] = [Self::North, Self::South, Self::East, Self::West];

    pub fn name(&self) -> &'static str {
        match self {
            Self::North => "North Zone",
            Self::South => "South Zone",
            Self::East => "East Zone",
            Self::West => "West Zone",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Zone {
    type Err = String;

    /// Accepts "North Zone" as well as the short "north"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let short = lowered.strip_suffix(" zone").unwrap_or(&lowered);
        match short {
            "north" => Ok(Self::North),
            "south" => Ok(Self::South),
            "east" => Ok(Self::East),
            "west" => Ok(Self::West),
            _ => Err(format!("Unknown zone: {}", s)),
        }
    }
}
