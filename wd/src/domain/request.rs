//! Pickup request record
//!
//! A Request is one resident's pickup submission. It moves through
//! Pending -> In Progress -> Completed and may carry a collector id.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::kinds::{Priority, WasteType};
use super::status::RequestStatus;
use crate::error::{DeskResult, require_fields};

/// A resident's pickup request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Unique identifier (e.g., "REQLWVCJK00")
    pub id: String,

    /// Resident identifier, not unique across requests
    pub resident_id: String,

    pub resident_name: String,

    pub waste_type: WasteType,

    pub priority: Priority,

    pub address: String,

    pub phone: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_date: Option<NaiveDate>,

    /// Current status in the workflow
    #[serde(default)]
    pub status: RequestStatus,

    /// Creation instant, never changes
    pub timestamp: DateTime<Utc>,

    /// Id of the assigned collector
    #[serde(default)]
    pub assigned_collector: Option<String>,

    /// Date the request was last marked Completed
    #[serde(default)]
    pub collection_date: Option<NaiveDate>,

    #[serde(default)]
    pub notes: String,
}

impl Request {
    /// Build a fresh Pending request from submitted fields
    pub fn new(id: impl Into<String>, fields: NewRequest, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            resident_id: fields.resident_id.trim().to_string(),
            resident_name: fields.resident_name.trim().to_string(),
            waste_type: fields.waste_type,
            priority: fields.priority,
            address: fields.address.trim().to_string(),
            phone: fields.phone.trim().to_string(),
            description: fields.description.filter(|d| !d.trim().is_empty()),
            preferred_date: fields.preferred_date,
            status: RequestStatus::Pending,
            timestamp,
            assigned_collector: None,
            collection_date: None,
            notes: String::new(),
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned_collector.is_some()
    }

    /// Check whether this request is assigned to the given collector
    pub fn is_assigned_to(&self, collector_id: &str) -> bool {
        self.assigned_collector.as_deref() == Some(collector_id)
    }

    /// Set the status; completing stamps the collection date
    pub fn apply_status(&mut self, status: RequestStatus, today: NaiveDate) {
        self.status = status;
        if status == RequestStatus::Completed {
            self.collection_date = Some(today);
        }
    }
}

/// Fields a resident submits
#[derive(Debug, Clone, PartialEq)]
pub struct NewRequest {
    pub resident_id: String,
    pub resident_name: String,
    pub waste_type: WasteType,
    pub priority: Priority,
    pub address: String,
    pub phone: String,
    pub description: Option<String>,
    pub preferred_date: Option<NaiveDate>,
}

impl NewRequest {
    /// Check required fields before anything is stored
    pub fn validate(&self) -> DeskResult<()> {
        require_fields(&[
            ("resident id", self.resident_id.as_str()),
            ("resident name", self.resident_name.as_str()),
            ("address", self.address.as_str()),
            ("phone", self.phone.as_str()),
        ])
    }
}
