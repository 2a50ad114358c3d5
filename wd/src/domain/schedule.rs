//! Pickup schedule entry

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::kinds::{WasteType, Zone};
use crate::error::{DeskError, DeskResult};

/// A planned pickup slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    /// Stable identifier assigned at creation
    pub id: String,

    pub date: NaiveDate,

    /// Weekday name of `date`, cached for display
    pub day_name: String,

    pub area: Zone,

    #[serde(rename = "type")]
    pub r#type: WasteType,

    /// Start time as `HH:MM`
    pub time: String,

    /// Id of the collector running the slot
    #[serde(default)]
    pub collector: Option<String>,
}

impl ScheduleEntry {
    pub fn new(id: impl Into<String>, fields: NewScheduleEntry) -> Self {
        Self {
            id: id.into(),
            date: fields.date,
            day_name: day_name(fields.date).to_string(),
            area: fields.area,
            r#type: fields.r#type,
            time: fields.time,
            collector: fields.collector,
        }
    }
}

/// Fields for a new schedule entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScheduleEntry {
    pub date: NaiveDate,
    pub area: Zone,
    pub r#type: WasteType,
    pub time: String,
    pub collector: Option<String>,
}

/// English weekday name for a date
pub fn day_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Normalize a `H:MM` or `HH:MM` time to `HH:MM`
pub fn parse_time(value: &str) -> DeskResult<String> {
    let parsed = NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| DeskError::validation(format!("Invalid time '{}', expected HH:MM", value.trim())))?;
    Ok(parsed.format("%H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_name() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(day_name(date), "Saturday");
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("7:05").unwrap(), "07:05");
        assert_eq!(parse_time(" 13:45 ").unwrap(), "13:45");
        assert!(parse_time("24:00").is_err());
        assert!(parse_time("noon").is_err());
    }

    #[test]
    fn test_entry_serializes_type_field() {
        let entry = ScheduleEntry::new(
            "SCH1",
            NewScheduleEntry {
                date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
                area: Zone::West,
                r#type: WasteType::Biodegradable,
                time: "06:15".to_string(),
                collector: None,
            },
        );
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "Biodegradable");
        assert_eq!(value["dayName"], "Monday");
        assert_eq!(value["area"], "West Zone");
        assert_eq!(value["date"], "2024-06-03");
    }
}
