//! Request and collector status values

use serde::{Deserialize, Serialize};

/// Request status in the pickup workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RequestStatus {
    /// Submitted, not yet started
    #[default]
    Pending,
    /// A collector is on it
    #[serde(rename = "In Progress")]
    InProgress,
    /// Picked up
    Completed,
}

impl RequestStatus {
    /// Transition table applied when strict transitions are enabled
    ///
    /// Completed is terminal apart from re-completing, which refreshes the
    /// collection date.
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (Pending, Pending)
                | (Pending, InProgress)
                | (Pending, Completed)
                | (InProgress, Pending)
                | (InProgress, InProgress)
                | (InProgress, Completed)
                | (Completed, Completed)
        )
    }

    /// Still waiting on a collector (Pending or In Progress)
    pub fn is_open(self) -> bool {
        !matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::InProgress => write!(f, "In Progress"),
            Self::Completed => write!(f, "Completed"),
        }
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', '-'], " ").as_str() {
            "pending" => Ok(Self::Pending),
            "in progress" | "started" => Ok(Self::InProgress),
            "completed" | "complete" | "done" => Ok(Self::Completed),
            _ => Err(format!("Unknown request status: {}", s)),
        }
    }
}

/// Whether a collector can take work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CollectorStatus {
    #[default]
    Active,
    Inactive,
}

impl std::fmt::Display for CollectorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Inactive => write!(f, "Inactive"),
        }
    }
}

impl std::str::FromStr for CollectorStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(format!("Unknown collector status: {}", s)),
        }
    }
}
