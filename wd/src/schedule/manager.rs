//! ScheduleManager - default rotation and manual edits of pickup slots

use chrono::{Days, NaiveDate};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::domain::{NewScheduleEntry, ScheduleEntry, WasteType, Zone, parse_time};
use crate::error::{DeskError, DeskResult};
use crate::store::RecordStore;

/// Shape of the generated default rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleSettings {
    /// Number of days covered, starting today
    pub days: u32,
    /// First hour a slot may start (inclusive)
    pub start_hour: u32,
    /// Hour slots must start before (exclusive)
    pub end_hour: u32,
    /// Granularity of slot start minutes
    pub slot_minutes: u32,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            days: 5,
            start_hour: 6,
            end_hour: 14,
            slot_minutes: 15,
        }
    }
}

impl ScheduleSettings {
    fn random_time<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let hour = rng.random_range(self.start_hour..self.end_hour.max(self.start_hour + 1));
        let slots = (60 / self.slot_minutes.clamp(1, 60)).max(1);
        let minute = rng.random_range(0..slots) * self.slot_minutes.clamp(1, 60);
        format!("{:02}:{:02}", hour, minute)
    }
}

/// Schedule operations over a borrowed record store
pub struct ScheduleManager<'a, C: Clock> {
    store: &'a mut RecordStore,
    clock: &'a C,
    settings: ScheduleSettings,
}

impl<'a, C: Clock> ScheduleManager<'a, C> {
    pub fn new(store: &'a mut RecordStore, clock: &'a C) -> Self {
        Self {
            store,
            clock,
            settings: ScheduleSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ScheduleSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn records(&self) -> &RecordStore {
        &*self.store
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        self.store.schedules()
    }

    /// Generate the default rotation when no entries exist
    ///
    /// Returns the number of entries generated; 0 when the schedule already
    /// has entries.
    pub fn ensure_default(&mut self) -> usize {
        self.ensure_default_with(&mut rand::rng())
    }

    pub fn ensure_default_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        debug!("ensure_default: called");
        if !self.store.schedules().is_empty() {
            debug!(entries = self.store.schedules().len(), "ensure_default: schedule present, skipping");
            return 0;
        }
        let generated = self.generate_with(rng);
        info!(generated, "Default schedule generated");
        generated
    }

    /// Append a fresh rotation regardless of existing entries
    pub fn generate(&mut self) -> usize {
        self.generate_with(&mut rand::rng())
    }

    fn generate_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let today = self.clock.today();
        let now_ms = self.clock.now_ms();
        let crew: Vec<String> = self.store.collectors().iter().map(|c| c.id.clone()).collect();

        let mut count = 0;
        for offset in 0..self.settings.days {
            let Some(date) = today.checked_add_days(Days::new(u64::from(offset))) else {
                warn!(offset, "Schedule date out of range, stopping rotation early");
                break;
            };
            for (index, area) in Zone::ALL.into_iter().enumerate() {
                let fields = NewScheduleEntry {
                    date,
                    area,
                    r#type: WasteType::ALL[index % WasteType::ALL.len()],
                    time: self.settings.random_time(rng),
                    collector: crew.choose(rng).cloned(),
                };
                let id = self.store.next_schedule_id(now_ms);
                self.store.schedules_mut().push(ScheduleEntry::new(id, fields));
                count += 1;
            }
        }
        self.store.save_schedules();
        count
    }

    /// Entries matching an optional zone substring and an optional waste type
    pub fn filter(&self, area: Option<&str>, waste_type: Option<WasteType>) -> Vec<&ScheduleEntry> {
        let area = area.map(|a| a.trim().to_lowercase()).filter(|a| !a.is_empty());
        self.store
            .schedules()
            .iter()
            .filter(|e| {
                area.as_ref()
                    .is_none_or(|a| e.area.name().to_lowercase().contains(a.as_str()))
            })
            .filter(|e| waste_type.is_none_or(|t| e.r#type == t))
            .collect()
    }

    /// Entries run by one collector on one date
    pub fn for_collector_on(&self, collector_id: &str, date: NaiveDate) -> Vec<&ScheduleEntry> {
        self.store
            .schedules()
            .iter()
            .filter(|e| e.date == date && e.collector.as_deref() == Some(collector_id))
            .collect()
    }

    pub fn get(&self, id: &str) -> DeskResult<&ScheduleEntry> {
        self.store
            .schedules()
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| DeskError::not_found("Schedule entry", id))
    }

    /// Resolve a collector reference: exact id first, then name or id substring
    pub fn resolve_collector(&self, query: &str) -> DeskResult<String> {
        let query = query.trim();
        let collectors = self.store.collectors();
        collectors
            .iter()
            .find(|c| c.id.eq_ignore_ascii_case(query))
            .or_else(|| collectors.iter().find(|c| c.matches_query(query)))
            .map(|c| c.id.clone())
            .ok_or_else(|| DeskError::not_found("Collector", query))
    }

    /// Validate and append a manual entry
    pub fn add(&mut self, mut fields: NewScheduleEntry) -> DeskResult<ScheduleEntry> {
        debug!(date = %fields.date, area = %fields.area, "add: called");
        fields.time = parse_time(&fields.time)?;
        fields.collector = match fields.collector.as_deref() {
            Some(query) => Some(self.resolve_collector(query)?),
            None => None,
        };

        let id = self.store.next_schedule_id(self.clock.now_ms());
        let entry = ScheduleEntry::new(id, fields);
        self.store.schedules_mut().push(entry.clone());
        self.store.save_schedules();

        info!(schedule_id = %entry.id, "Schedule entry added");
        Ok(entry)
    }

    /// Replace the time and/or collector of an entry; `None` keeps the current value
    pub fn edit(&mut self, id: &str, time: Option<&str>, collector: Option<&str>) -> DeskResult<ScheduleEntry> {
        debug!(%id, ?time, ?collector, "edit: called");
        self.get(id)?;
        let time = time.map(parse_time).transpose()?;
        let collector = collector.map(|q| self.resolve_collector(q)).transpose()?;

        let entry = self
            .store
            .schedules_mut()
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| DeskError::not_found("Schedule entry", id))?;
        if let Some(time) = time {
            entry.time = time;
        }
        if let Some(collector) = collector {
            entry.collector = Some(collector);
        }
        let updated = entry.clone();
        self.store.save_schedules();

        info!(schedule_id = %id, "Schedule entry updated");
        Ok(updated)
    }

    /// Remove an entry, keeping the order of the rest
    pub fn remove(&mut self, id: &str) -> DeskResult<ScheduleEntry> {
        debug!(%id, "remove: called");
        let index = self
            .store
            .schedules()
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| DeskError::not_found("Schedule entry", id))?;
        let removed = self.store.schedules_mut().remove(index);
        self.store.save_schedules();

        info!(schedule_id = %id, "Schedule entry removed");
        Ok(removed)
    }
}
