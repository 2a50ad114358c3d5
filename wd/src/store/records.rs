//! RecordStore - in-memory collections over a KvStore

use kvstore::KvStore;
use tracing::{debug, info, warn};

use crate::domain::{
    Collector, CollectorStatus, IdGenerator, NewCollector, REQUEST_PREFIX, Request, SCHEDULE_PREFIX, ScheduleEntry,
    default_collectors, next_collector_id,
};
use crate::error::{DeskError, DeskResult};

/// Document key for requests
pub const REQUESTS_KEY: &str = "requests";

/// Document key for collectors
pub const COLLECTORS_KEY: &str = "collectors";

/// Document key for the pickup schedule
pub const SCHEDULES_KEY: &str = "schedules";

/// All records for one desk, owned explicitly by the caller
pub struct RecordStore {
    kv: KvStore,
    requests: Vec<Request>,
    collectors: Vec<Collector>,
    schedules: Vec<ScheduleEntry>,
    ids: IdGenerator,
    unsaved: Unsaved,
}

/// Collections whose last write failed
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Unsaved {
    requests: bool,
    collectors: bool,
    schedules: bool,
}

impl RecordStore {
    /// Hydrate every collection from the document store
    ///
    /// Missing or unreadable requests and schedules start empty. Missing or
    /// unreadable collectors are replaced by the default crew, which is
    /// persisted right away.
    pub fn open(kv: KvStore) -> Self {
        debug!("RecordStore::open: called");
        let requests: Vec<Request> = kv.load_or(REQUESTS_KEY, Vec::new());
        let schedules: Vec<ScheduleEntry> = kv.load_or(SCHEDULES_KEY, Vec::new());
        let mut unsaved = Unsaved::default();
        let collectors = match kv.load::<Vec<Collector>>(COLLECTORS_KEY) {
            Some(collectors) => collectors,
            None => {
                info!("No stored collectors, seeding default crew");
                let crew = default_collectors();
                unsaved.collectors = !kv.save(COLLECTORS_KEY, &crew);
                crew
            }
        };

        info!(
            requests = requests.len(),
            collectors = collectors.len(),
            schedules = schedules.len(),
            "Record store opened"
        );

        Self {
            kv,
            requests,
            collectors,
            schedules,
            ids: IdGenerator::new(),
            unsaved,
        }
    }

    /// Retry the collections whose last write failed; returns false if any still fails
    ///
    /// Collections that were only read are never written back, so a document
    /// that failed to load stays on disk as it was.
    pub fn close(mut self) -> bool {
        debug!(unsaved = ?self.unsaved, "RecordStore::close: called");
        let mut ok = true;
        if self.unsaved.requests {
            ok &= self.save_requests();
        }
        if self.unsaved.collectors {
            ok &= self.save_collectors();
        }
        if self.unsaved.schedules {
            ok &= self.save_schedules();
        }
        ok
    }

    pub fn kv(&self) -> &KvStore {
        &self.kv
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn requests_mut(&mut self) -> &mut Vec<Request> {
        &mut self.requests
    }

    pub fn collectors(&self) -> &[Collector] {
        &self.collectors
    }

    pub fn collectors_mut(&mut self) -> &mut Vec<Collector> {
        &mut self.collectors
    }

    pub fn schedules(&self) -> &[ScheduleEntry] {
        &self.schedules
    }

    pub fn schedules_mut(&mut self) -> &mut Vec<ScheduleEntry> {
        &mut self.schedules
    }

    // Callers of the `*_mut` accessors persist through these after mutating

    pub fn save_requests(&mut self) -> bool {
        let saved = self.kv.save(REQUESTS_KEY, &self.requests);
        self.unsaved.requests = !saved;
        saved
    }

    pub fn save_collectors(&mut self) -> bool {
        let saved = self.kv.save(COLLECTORS_KEY, &self.collectors);
        self.unsaved.collectors = !saved;
        saved
    }

    pub fn save_schedules(&mut self) -> bool {
        let saved = self.kv.save(SCHEDULES_KEY, &self.schedules);
        self.unsaved.schedules = !saved;
        saved
    }

    /// Fresh request id, unique within the collection
    pub fn next_request_id(&mut self, now_ms: i64) -> String {
        let requests = &self.requests;
        self.ids
            .next(REQUEST_PREFIX, now_ms, |candidate| requests.iter().any(|r| r.id == candidate))
    }

    /// Fresh schedule entry id, unique within the collection
    pub fn next_schedule_id(&mut self, now_ms: i64) -> String {
        let schedules = &self.schedules;
        self.ids
            .next(SCHEDULE_PREFIX, now_ms, |candidate| schedules.iter().any(|s| s.id == candidate))
    }

    pub fn request(&self, id: &str) -> Option<&Request> {
        self.requests.iter().find(|r| r.id == id)
    }

    pub fn collector(&self, id: &str) -> Option<&Collector> {
        self.collectors.iter().find(|c| c.id == id)
    }

    /// Collectors eligible for assignment, in collection order
    pub fn active_collectors(&self) -> Vec<&Collector> {
        self.collectors.iter().filter(|c| c.is_active()).collect()
    }

    /// Render a collector reference as `"<name> (<id>)"`
    ///
    /// A collector that no longer exists renders as its bare id.
    pub fn collector_display(&self, id: &str) -> String {
        match self.collector(id) {
            Some(collector) => collector.display_ref(),
            None => id.to_string(),
        }
    }

    /// Add a collector with the next sequential id
    pub fn add_collector(&mut self, fields: NewCollector) -> DeskResult<Collector> {
        debug!(name = %fields.name, "add_collector: called");
        fields.validate()?;
        let id = next_collector_id(self.collectors.iter().map(|c| c.id.as_str()));
        let collector = Collector::new(id, fields);
        self.collectors.push(collector.clone());
        self.save_collectors();
        info!(collector_id = %collector.id, "Collector added");
        Ok(collector)
    }

    pub fn rename_collector(&mut self, id: &str, name: &str) -> DeskResult<()> {
        debug!(%id, %name, "rename_collector: called");
        let name = name.trim();
        if name.is_empty() {
            return Err(DeskError::validation("Collector name cannot be empty"));
        }
        let collector = self.collector_mut(id)?;
        collector.name = name.to_string();
        self.save_collectors();
        Ok(())
    }

    pub fn set_collector_status(&mut self, id: &str, status: CollectorStatus) -> DeskResult<()> {
        debug!(%id, %status, "set_collector_status: called");
        let collector = self.collector_mut(id)?;
        collector.status = status;
        self.save_collectors();
        Ok(())
    }

    /// Remove a collector; requests and schedule slots keep the dangling id
    pub fn remove_collector(&mut self, id: &str) -> DeskResult<Collector> {
        debug!(%id, "remove_collector: called");
        let index = self
            .collectors
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| DeskError::not_found("Collector", id))?;
        let removed = self.collectors.remove(index);
        self.save_collectors();

        let still_referenced = self.requests.iter().filter(|r| r.is_assigned_to(id)).count();
        if still_referenced > 0 {
            warn!(%id, still_referenced, "Removed collector is still assigned to requests");
        }
        Ok(removed)
    }

    fn collector_mut(&mut self, id: &str) -> DeskResult<&mut Collector> {
        self.collectors
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| DeskError::not_found("Collector", id))
    }
}
