//! Full data export as one JSON document

use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::domain::{Collector, Request, ScheduleEntry};
use crate::store::RecordStore;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write export to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Snapshot of every collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub requests: Vec<Request>,
    pub collectors: Vec<Collector>,
    pub schedules: Vec<ScheduleEntry>,
    pub export_date: DateTime<Utc>,
}

impl ExportBundle {
    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Copy the store's collections into a bundle stamped with the clock's time
pub fn export_bundle(store: &RecordStore, clock: &impl Clock) -> ExportBundle {
    debug!("export_bundle: called");
    ExportBundle {
        requests: store.requests().to_vec(),
        collectors: store.collectors().to_vec(),
        schedules: store.schedules().to_vec(),
        export_date: clock.now(),
    }
}

/// `waste-collection-data-YYYY-MM-DD.json`
pub fn default_file_name(date: NaiveDate) -> String {
    format!("waste-collection-data-{}.json", date.format("%Y-%m-%d"))
}

pub fn write_bundle(bundle: &ExportBundle, path: &Path) -> Result<(), ExportError> {
    let json = bundle.to_json()?;
    fs::write(path, json).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), requests = bundle.requests.len(), "Export written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use kvstore::KvStore;
    use tempfile::TempDir;

    #[test]
    fn test_default_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(default_file_name(date), "waste-collection-data-2024-06-01.json");
    }

    #[test]
    fn test_write_bundle() {
        let temp = TempDir::new().unwrap();
        let store = RecordStore::open(KvStore::in_memory());
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());

        let bundle = export_bundle(&store, &clock);
        let path = temp.path().join(default_file_name(clock.today()));
        write_bundle(&bundle, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"requests\": []"));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["collectors"].as_array().unwrap().len(), 5);
        assert_eq!(value["exportDate"], "2024-06-01T12:00:00Z");
    }

    #[test]
    fn test_write_bundle_missing_dir_errors() {
        let temp = TempDir::new().unwrap();
        let store = RecordStore::open(KvStore::in_memory());
        let bundle = export_bundle(&store, &FixedClock(Utc::now()));

        let err = write_bundle(&bundle, &temp.path().join("nope").join("out.json")).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
