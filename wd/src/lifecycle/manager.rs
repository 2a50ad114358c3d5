//! RequestLifecycle - create, assign and move requests through their workflow

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, info};

use super::stats::{CollectorStats, Report, RequestStats};
use crate::clock::Clock;
use crate::domain::{NewRequest, Request, RequestStatus};
use crate::error::{DeskError, DeskResult};
use crate::store::RecordStore;

/// Default number of rows in the recent-requests view
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Outcome of a bulk assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AssignSummary {
    /// Requests without a collector before the run
    pub unassigned_before: usize,
    /// Requests that received a collector
    pub assigned: usize,
}

/// Lifecycle operations over a borrowed record store
pub struct RequestLifecycle<'a, C: Clock> {
    store: &'a mut RecordStore,
    clock: &'a C,
    strict_transitions: bool,
}

impl<'a, C: Clock> RequestLifecycle<'a, C> {
    pub fn new(store: &'a mut RecordStore, clock: &'a C) -> Self {
        Self {
            store,
            clock,
            strict_transitions: false,
        }
    }

    /// Reject status moves outside the transition table
    pub fn with_strict_transitions(mut self, strict: bool) -> Self {
        self.strict_transitions = strict;
        self
    }

    /// The underlying records, for rendering collector references
    pub fn records(&self) -> &RecordStore {
        &*self.store
    }

    /// Validate and store a new Pending request
    pub fn submit(&mut self, fields: NewRequest) -> DeskResult<Request> {
        debug!(resident_id = %fields.resident_id, "submit: called");
        fields.validate()?;

        let id = self.store.next_request_id(self.clock.now_ms());
        let request = Request::new(id, fields, self.clock.now());
        self.store.requests_mut().push(request.clone());
        self.store.save_requests();

        info!(request_id = %request.id, "Request submitted");
        Ok(request)
    }

    pub fn get(&self, request_id: &str) -> DeskResult<&Request> {
        self.store
            .request(request_id)
            .ok_or_else(|| DeskError::not_found("Request", request_id))
    }

    /// Assign one request to the first active collector matching `query`
    ///
    /// Matching is a case-insensitive substring test on name or id.
    pub fn assign(&mut self, request_id: &str, query: &str) -> DeskResult<String> {
        debug!(%request_id, %query, "assign: called");
        self.get(request_id)?;

        let active = self.store.active_collectors();
        if active.is_empty() {
            return Err(DeskError::not_found("Active collector", "any"));
        }
        let collector_id = active
            .iter()
            .find(|c| c.matches_query(query))
            .map(|c| c.id.clone())
            .ok_or_else(|| DeskError::not_found("Collector", query.trim()))?;

        let request = self.request_mut(request_id)?;
        request.assigned_collector = Some(collector_id.clone());
        self.store.save_requests();

        info!(%request_id, %collector_id, "Request assigned");
        Ok(collector_id)
    }

    /// Give every unassigned request a random active collector
    pub fn auto_assign(&mut self) -> AssignSummary {
        self.auto_assign_with(&mut rand::rng())
    }

    pub fn auto_assign_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> AssignSummary {
        debug!("auto_assign: called");
        let active: Vec<String> = self.store.active_collectors().iter().map(|c| c.id.clone()).collect();

        let mut summary = AssignSummary::default();
        for request in self.store.requests_mut().iter_mut().filter(|r| !r.is_assigned()) {
            summary.unassigned_before += 1;
            if let Some(collector_id) = active.choose(rng) {
                request.assigned_collector = Some(collector_id.clone());
                summary.assigned += 1;
            }
        }

        if summary.assigned > 0 {
            self.store.save_requests();
        }
        info!(
            unassigned = summary.unassigned_before,
            assigned = summary.assigned,
            "Bulk assignment finished"
        );
        summary
    }

    /// Move a request to `status`; completing stamps today's collection date
    pub fn set_status(&mut self, request_id: &str, status: RequestStatus) -> DeskResult<()> {
        debug!(%request_id, %status, "set_status: called");
        let strict = self.strict_transitions;
        let today = self.clock.today();

        let request = self.request_mut(request_id)?;
        if strict && !request.status.can_transition_to(status) {
            return Err(DeskError::InvalidTransition {
                from: request.status,
                to: status,
            });
        }
        request.apply_status(status, today);
        self.store.save_requests();

        info!(%request_id, %status, "Request status updated");
        Ok(())
    }

    pub fn set_notes(&mut self, request_id: &str, notes: &str) -> DeskResult<()> {
        debug!(%request_id, "set_notes: called");
        let request = self.request_mut(request_id)?;
        request.notes = notes.trim().to_string();
        self.store.save_requests();
        Ok(())
    }

    /// Requests whose id or resident id equals the query exactly
    pub fn track(&self, query: &str) -> DeskResult<Vec<&Request>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DeskError::validation("Please enter a Request ID or Resident ID"));
        }
        Ok(self
            .store
            .requests()
            .iter()
            .filter(|r| r.id == query || r.resident_id == query)
            .collect())
    }

    /// Newest requests first, without reordering the stored collection
    pub fn recent(&self, limit: usize) -> Vec<&Request> {
        let mut requests: Vec<&Request> = self.store.requests().iter().collect();
        requests.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        requests.truncate(limit);
        requests
    }

    pub fn assigned_to(&self, collector_id: &str) -> Vec<&Request> {
        self.store
            .requests()
            .iter()
            .filter(|r| r.is_assigned_to(collector_id))
            .collect()
    }

    pub fn stats(&self) -> RequestStats {
        RequestStats::compute(self.store.requests(), self.store.collectors(), self.clock.today())
    }

    pub fn collector_stats(&self, collector_id: &str) -> CollectorStats {
        CollectorStats::compute(self.store.requests(), collector_id, self.clock.today())
    }

    pub fn report(&self) -> Report {
        Report::compute(self.store.requests(), self.store.collectors(), self.clock.now())
    }

    fn request_mut(&mut self, request_id: &str) -> DeskResult<&mut Request> {
        self.store
            .requests_mut()
            .iter_mut()
            .find(|r| r.id == request_id)
            .ok_or_else(|| DeskError::not_found("Request", request_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::domain::{CollectorStatus, Priority, WasteType};
    use crate::store::REQUESTS_KEY;
    use chrono::{Duration, NaiveDate};
    use kvstore::KvStore;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn june(day: u32) -> FixedClock {
        FixedClock::on(NaiveDate::from_ymd_opt(2024, 6, day).unwrap())
    }

    fn fields(resident: &str) -> NewRequest {
        NewRequest {
            resident_id: resident.to_string(),
            resident_name: "Dana Reyes".to_string(),
            waste_type: WasteType::Biodegradable,
            priority: Priority::Medium,
            address: "4 Oak Ave".to_string(),
            phone: "+1-555-0110".to_string(),
            description: Some("Two bags".to_string()),
            preferred_date: None,
        }
    }

    #[test]
    fn test_submit_persists_pending_request() {
        let kv = KvStore::in_memory();
        let mut store = RecordStore::open(kv.clone());
        let clock = june(1);
        let mut lifecycle = RequestLifecycle::new(&mut store, &clock);

        let request = lifecycle.submit(fields("R1")).unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.timestamp, clock.now());

        let persisted: Vec<Request> = kv.load(REQUESTS_KEY).unwrap();
        assert_eq!(persisted, vec![request]);
    }

    #[test]
    fn test_submit_same_instant_distinct_ids() {
        let mut store = RecordStore::open(KvStore::in_memory());
        let clock = june(1);
        let mut lifecycle = RequestLifecycle::new(&mut store, &clock);

        let a = lifecycle.submit(fields("R1")).unwrap();
        let b = lifecycle.submit(fields("R1")).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_submit_validation_is_noop() {
        let mut store = RecordStore::open(KvStore::in_memory());
        let clock = june(1);
        let mut lifecycle = RequestLifecycle::new(&mut store, &clock);

        let mut bad = fields("R1");
        bad.address = String::new();
        assert!(matches!(lifecycle.submit(bad), Err(DeskError::Validation(_))));
        assert!(store.requests().is_empty());
    }

    #[test]
    fn test_assign_by_name_substring() {
        let mut store = RecordStore::open(KvStore::in_memory());
        let clock = june(1);
        let mut lifecycle = RequestLifecycle::new(&mut store, &clock);
        let request = lifecycle.submit(fields("R1")).unwrap();

        let collector_id = lifecycle.assign(&request.id, "lisa").unwrap();
        assert_eq!(collector_id, "C004");
        assert_eq!(
            store.collector_display(store.requests()[0].assigned_collector.as_deref().unwrap()),
            "Lisa Brown (C004)"
        );
    }

    #[test]
    fn test_assign_skips_inactive_and_reports_not_found() {
        let mut store = RecordStore::open(KvStore::in_memory());
        store.set_collector_status("C003", CollectorStatus::Inactive).unwrap();
        let clock = june(1);
        let mut lifecycle = RequestLifecycle::new(&mut store, &clock);
        let request = lifecycle.submit(fields("R1")).unwrap();

        let err = lifecycle.assign(&request.id, "mike").unwrap_err();
        assert_eq!(err, DeskError::not_found("Collector", "mike"));
        assert!(lifecycle.get(&request.id).unwrap().assigned_collector.is_none());

        let err = lifecycle.assign("REQNOPE", "john").unwrap_err();
        assert_eq!(err, DeskError::not_found("Request", "REQNOPE"));
    }

    #[test]
    fn test_assign_with_no_active_collectors() {
        let mut store = RecordStore::open(KvStore::in_memory());
        for id in ["C001", "C002", "C003", "C004", "C005"] {
            store.set_collector_status(id, CollectorStatus::Inactive).unwrap();
        }
        let clock = june(1);
        let mut lifecycle = RequestLifecycle::new(&mut store, &clock);
        let request = lifecycle.submit(fields("R1")).unwrap();

        assert!(matches!(
            lifecycle.assign(&request.id, "john"),
            Err(DeskError::NotFound { .. })
        ));

        let summary = lifecycle.auto_assign();
        assert_eq!(
            summary,
            AssignSummary {
                unassigned_before: 1,
                assigned: 0
            }
        );
    }

    #[test]
    fn test_auto_assign_only_touches_unassigned() {
        let mut store = RecordStore::open(KvStore::in_memory());
        let clock = june(1);
        let mut lifecycle = RequestLifecycle::new(&mut store, &clock);
        let first = lifecycle.submit(fields("R1")).unwrap();
        lifecycle.submit(fields("R2")).unwrap();
        lifecycle.submit(fields("R3")).unwrap();
        lifecycle.assign(&first.id, "C002").unwrap();

        let mut rng = StdRng::seed_from_u64(7);
        let summary = lifecycle.auto_assign_with(&mut rng);
        assert_eq!(summary.unassigned_before, 2);
        assert_eq!(summary.assigned, 2);

        assert!(store.requests()[0].is_assigned_to("C002"));
        for request in store.requests() {
            let id = request.assigned_collector.as_deref().unwrap();
            assert!(store.collector(id).unwrap().is_active());
        }
    }

    #[test]
    fn test_set_status_permissive_by_default() {
        let mut store = RecordStore::open(KvStore::in_memory());
        let clock = june(1);
        let mut lifecycle = RequestLifecycle::new(&mut store, &clock);
        let request = lifecycle.submit(fields("R1")).unwrap();

        lifecycle.set_status(&request.id, RequestStatus::Completed).unwrap();
        lifecycle.set_status(&request.id, RequestStatus::Pending).unwrap();

        let stored = lifecycle.get(&request.id).unwrap();
        assert_eq!(stored.status, RequestStatus::Pending);
        assert_eq!(stored.collection_date, Some(clock.today()));
    }

    #[test]
    fn test_set_status_strict_rejects_reopen() {
        let mut store = RecordStore::open(KvStore::in_memory());
        let clock = june(1);
        let mut lifecycle = RequestLifecycle::new(&mut store, &clock).with_strict_transitions(true);
        let request = lifecycle.submit(fields("R1")).unwrap();

        lifecycle.set_status(&request.id, RequestStatus::Completed).unwrap();
        let err = lifecycle.set_status(&request.id, RequestStatus::InProgress).unwrap_err();
        assert!(matches!(err, DeskError::InvalidTransition { .. }));
        assert_eq!(lifecycle.get(&request.id).unwrap().status, RequestStatus::Completed);
    }

    #[test]
    fn test_set_status_unknown_request() {
        let mut store = RecordStore::open(KvStore::in_memory());
        let clock = june(1);
        let mut lifecycle = RequestLifecycle::new(&mut store, &clock);
        assert_eq!(
            lifecycle.set_status("REQX", RequestStatus::Completed),
            Err(DeskError::not_found("Request", "REQX"))
        );
    }

    #[test]
    fn test_track_by_request_or_resident() {
        let mut store = RecordStore::open(KvStore::in_memory());
        let clock = june(1);
        let mut lifecycle = RequestLifecycle::new(&mut store, &clock);
        let first = lifecycle.submit(fields("R1")).unwrap();
        lifecycle.submit(fields("R1")).unwrap();
        lifecycle.submit(fields("R2")).unwrap();

        assert_eq!(lifecycle.track("R1").unwrap().len(), 2);
        assert_eq!(lifecycle.track(&format!(" {} ", first.id)).unwrap().len(), 1);
        assert!(lifecycle.track("R9").unwrap().is_empty());
        assert!(lifecycle.track("").is_err());
    }

    #[test]
    fn test_recent_sorts_newest_first() {
        let mut store = RecordStore::open(KvStore::in_memory());
        let base = june(1);
        for (offset, resident) in [(0, "old"), (2, "newest"), (1, "middle")] {
            let clock = FixedClock(base.now() + Duration::hours(offset));
            RequestLifecycle::new(&mut store, &clock).submit(fields(resident)).unwrap();
        }

        let lifecycle = RequestLifecycle::new(&mut store, &base);
        let recent: Vec<&str> = lifecycle.recent(2).iter().map(|r| r.resident_id.as_str()).collect();
        assert_eq!(recent, vec!["newest", "middle"]);
        assert_eq!(store.requests()[0].resident_id, "old");
    }

    #[test]
    fn test_notes_and_assigned_to() {
        let mut store = RecordStore::open(KvStore::in_memory());
        let clock = june(1);
        let mut lifecycle = RequestLifecycle::new(&mut store, &clock);
        let request = lifecycle.submit(fields("R1")).unwrap();
        lifecycle.assign(&request.id, "sarah").unwrap();
        lifecycle.set_notes(&request.id, " gate code 1234 ").unwrap();

        let mine = lifecycle.assigned_to("C002");
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].notes, "gate code 1234");
        assert!(lifecycle.assigned_to("C001").is_empty());
    }
}
