//! Integration tests for WasteDesk
//!
//! These drive the record store and managers together against on-disk stores.

use chrono::{Duration, NaiveDate};
use kvstore::KvStore;
use tempfile::TempDir;

use wastedesk::domain::{CollectorStatus, NewRequest, NewScheduleEntry, Priority, RequestStatus, WasteType, Zone};
use wastedesk::store::{COLLECTORS_KEY, SCHEDULES_KEY};
use wastedesk::{FixedClock, RecordStore, RequestLifecycle, ScheduleManager};

fn june(day: u32) -> FixedClock {
    FixedClock::on(NaiveDate::from_ymd_opt(2024, 6, day).unwrap())
}

fn resident_request(resident_id: &str) -> NewRequest {
    NewRequest {
        resident_id: resident_id.to_string(),
        resident_name: "Alex Kim".to_string(),
        waste_type: WasteType::Recyclable,
        priority: Priority::High,
        address: "12 Elm St".to_string(),
        phone: "+1-555-0199".to_string(),
        description: None,
        preferred_date: None,
    }
}

// =============================================================================
// First run
// =============================================================================

#[test]
fn test_first_run_seeds_collectors_and_schedule() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let kv = KvStore::open(temp_dir.path()).unwrap();
    let clock = june(3);

    let mut store = RecordStore::open(kv.clone());
    let ids: Vec<&str> = store.collectors().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["C001", "C002", "C003", "C004", "C005"]);
    assert!(temp_dir.path().join("collectors.json").exists());

    let generated = ScheduleManager::new(&mut store, &clock).ensure_default();
    assert_eq!(generated, 20);
    assert!(store.close());

    // A second run loads what the first one wrote and generates nothing
    let mut store = RecordStore::open(KvStore::open(temp_dir.path()).unwrap());
    assert_eq!(store.schedules().len(), 20);
    assert_eq!(ScheduleManager::new(&mut store, &clock).ensure_default(), 0);
    assert!(kv.contains(SCHEDULES_KEY));
    assert!(kv.contains(COLLECTORS_KEY));
}

// =============================================================================
// Request lifecycle
// =============================================================================

#[test]
fn test_bulk_assign_with_single_active_collector() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut store = RecordStore::open(KvStore::open(temp_dir.path()).unwrap());
    for id in ["C002", "C003", "C004", "C005"] {
        store.set_collector_status(id, CollectorStatus::Inactive).unwrap();
    }
    let clock = june(1);

    let mut lifecycle = RequestLifecycle::new(&mut store, &clock);
    let request = lifecycle.submit(resident_request("R1")).unwrap();
    let summary = lifecycle.auto_assign();
    assert_eq!(summary.assigned, 1);

    let assigned = lifecycle.get(&request.id).unwrap().assigned_collector.clone().unwrap();
    assert_eq!(store.collector_display(&assigned), "John Smith (C001)");

    // Survives a reopen
    drop(store);
    let store = RecordStore::open(KvStore::open(temp_dir.path()).unwrap());
    assert!(store.request(&request.id).unwrap().is_assigned_to("C001"));
}

#[test]
fn test_completion_date_and_completed_today() {
    let mut store = RecordStore::open(KvStore::in_memory());
    let completion_day = june(1);

    let id = {
        let mut lifecycle = RequestLifecycle::new(&mut store, &completion_day);
        let request = lifecycle.submit(resident_request("R1")).unwrap();
        lifecycle.set_status(&request.id, RequestStatus::Completed).unwrap();
        assert_eq!(lifecycle.stats().completed_today, 1);
        request.id
    };
    assert_eq!(
        store.request(&id).unwrap().collection_date,
        NaiveDate::from_ymd_opt(2024, 6, 1)
    );

    let next_day = FixedClock(completion_day.0 + Duration::days(1));
    let lifecycle = RequestLifecycle::new(&mut store, &next_day);
    let stats = lifecycle.stats();
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.completed_today, 0);
}

#[test]
fn test_reopening_keeps_collection_date() {
    let mut store = RecordStore::open(KvStore::in_memory());
    let clock = june(1);
    let mut lifecycle = RequestLifecycle::new(&mut store, &clock);

    let request = lifecycle.submit(resident_request("R7")).unwrap();
    lifecycle.set_status(&request.id, RequestStatus::Completed).unwrap();
    lifecycle.set_status(&request.id, RequestStatus::InProgress).unwrap();

    let stored = lifecycle.get(&request.id).unwrap();
    assert_eq!(stored.status, RequestStatus::InProgress);
    assert_eq!(stored.collection_date, NaiveDate::from_ymd_opt(2024, 6, 1));
    assert_eq!(lifecycle.stats().completed_today, 0);
}

#[test]
fn test_residents_counted_once() {
    let mut store = RecordStore::open(KvStore::in_memory());
    let clock = june(1);
    let mut lifecycle = RequestLifecycle::new(&mut store, &clock);
    for resident in ["R1", "R2", "R1", "R3", "R2"] {
        lifecycle.submit(resident_request(resident)).unwrap();
    }

    let stats = lifecycle.stats();
    assert_eq!(stats.total, 5);
    assert_eq!(stats.residents, 3);
    assert_eq!(stats.pending, 5);
}

// =============================================================================
// Schedule
// =============================================================================

#[test]
fn test_delete_third_of_five_entries() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut store = RecordStore::open(KvStore::open(temp_dir.path()).unwrap());
    let clock = june(1);
    let mut schedule = ScheduleManager::new(&mut store, &clock);

    let mut ids = Vec::new();
    for (i, area) in [Zone::North, Zone::South, Zone::East, Zone::West, Zone::North]
        .into_iter()
        .enumerate()
    {
        let entry = schedule
            .add(NewScheduleEntry {
                date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
                area,
                r#type: WasteType::Hazardous,
                time: format!("{:02}:30", 8 + i),
                collector: None,
            })
            .unwrap();
        ids.push(entry.id);
    }

    schedule.remove(&ids[2]).unwrap();
    assert_eq!(schedule.entries().len(), 4);
    assert_eq!(schedule.entries()[2].id, ids[3]);

    drop(schedule);
    let reopened = RecordStore::open(KvStore::open(temp_dir.path()).unwrap());
    let order: Vec<&str> = reopened.schedules().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(order, vec![ids[0].as_str(), ids[1].as_str(), ids[3].as_str(), ids[4].as_str()]);
}

#[test]
fn test_schedule_filter_by_area_and_type() {
    let mut store = RecordStore::open(KvStore::in_memory());
    let clock = june(3);
    let mut schedule = ScheduleManager::new(&mut store, &clock);
    schedule.ensure_default();

    assert_eq!(schedule.filter(None, None).len(), 20);

    let north = schedule.filter(Some("north"), None);
    assert_eq!(north.len(), 5);
    assert!(north.iter().all(|e| e.area == Zone::North));

    // Zone index 3 (West) repeats the first type
    let west_bio = schedule.filter(Some("West Zone"), Some(WasteType::Biodegradable));
    assert_eq!(west_bio.len(), 5);
    assert!(schedule.filter(Some("West"), Some(WasteType::Hazardous)).is_empty());

    // "zone" matches every area
    assert_eq!(schedule.filter(Some("zone"), Some(WasteType::Hazardous)).len(), 5);
}
