//! Collector record

use serde::{Deserialize, Serialize};

use super::kinds::Zone;
use super::status::CollectorStatus;
use crate::error::{DeskResult, require_fields};

/// A waste-collection worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collector {
    /// `C` plus a zero-padded sequence number
    pub id: String,
    pub name: String,
    pub phone: String,
    pub area: Zone,
    #[serde(default)]
    pub status: CollectorStatus,
}

impl Collector {
    pub fn new(id: impl Into<String>, fields: NewCollector) -> Self {
        Self {
            id: id.into(),
            name: fields.name.trim().to_string(),
            phone: fields.phone.trim().to_string(),
            area: fields.area,
            status: fields.status,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == CollectorStatus::Active
    }

    /// Display form used wherever a collector is referenced: `"<name> (<id>)"`
    pub fn display_ref(&self) -> String {
        format!("{} ({})", self.name, self.id)
    }

    /// Case-insensitive substring match on name or id
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        !query.is_empty() && (self.name.to_lowercase().contains(&query) || self.id.to_lowercase().contains(&query))
    }
}

/// Fields for a new collector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCollector {
    pub name: String,
    pub phone: String,
    pub area: Zone,
    pub status: CollectorStatus,
}

impl NewCollector {
    pub fn validate(&self) -> DeskResult<()> {
        require_fields(&[("name", self.name.as_str()), ("phone", self.phone.as_str())])
    }
}

/// Crew seeded into an empty store
pub fn default_collectors() -> Vec<Collector> {
    [
        ("C001", "John Smith", "+1-555-0101", Zone::North),
        ("C002", "Sarah Johnson", "+1-555-0102", Zone::South),
        ("C003", "Mike Wilson", "+1-555-0103", Zone::East),
        ("C004", "Lisa Brown", "+1-555-0104", Zone::West),
        ("C005", "David Davis", "+1-555-0105", Zone::North),
    ]
    .into_iter()
    .map(|(id, name, phone, area)| Collector {
        id: id.to_string(),
        name: name.to_string(),
        phone: phone.to_string(),
        area,
        status: CollectorStatus::Active,
    })
    .collect()
}
