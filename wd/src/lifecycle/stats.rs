//! Derived request statistics
//!
//! Everything here is recomputed from the collections on demand; nothing is
//! maintained incrementally.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::{Collector, Priority, Request, RequestStatus, WasteType};

/// Desk-wide counters
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RequestStats {
    /// Total number of requests
    pub total: usize,
    /// Requests waiting to start
    pub pending: usize,
    /// Requests being worked on
    pub in_progress: usize,
    /// Requests picked up
    pub completed: usize,
    /// Distinct resident ids across all requests
    pub residents: usize,
    /// Completed requests whose collection date is today
    pub completed_today: usize,
    /// Collectors with Active status
    pub active_collectors: usize,
    /// All collectors regardless of status
    pub total_collectors: usize,
}

impl RequestStats {
    pub fn compute(requests: &[Request], collectors: &[Collector], today: NaiveDate) -> Self {
        let count = |status: RequestStatus| requests.iter().filter(|r| r.status == status).count();
        let residents: HashSet<&str> = requests.iter().map(|r| r.resident_id.as_str()).collect();

        Self {
            total: requests.len(),
            pending: count(RequestStatus::Pending),
            in_progress: count(RequestStatus::InProgress),
            completed: count(RequestStatus::Completed),
            residents: residents.len(),
            completed_today: completed_on(requests.iter(), today),
            active_collectors: collectors.iter().filter(|c| c.is_active()).count(),
            total_collectors: collectors.len(),
        }
    }
}

/// Counters for one collector's dashboard
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CollectorStats {
    /// Requests assigned to the collector
    pub assigned: usize,
    /// Assigned requests still Pending or In Progress
    pub open: usize,
    /// Assigned requests completed today
    pub completed_today: usize,
}

impl CollectorStats {
    pub fn compute(requests: &[Request], collector_id: &str, today: NaiveDate) -> Self {
        let assigned: Vec<&Request> = requests.iter().filter(|r| r.is_assigned_to(collector_id)).collect();
        Self {
            assigned: assigned.len(),
            open: assigned.iter().filter(|r| r.status.is_open()).count(),
            completed_today: completed_on(assigned.iter().copied(), today),
        }
    }
}

/// Summary report with distributions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub stats: RequestStats,
    pub by_waste_type: BTreeMap<WasteType, usize>,
    pub by_priority: BTreeMap<Priority, usize>,
}

impl Report {
    pub fn compute(requests: &[Request], collectors: &[Collector], now: DateTime<Utc>) -> Self {
        let mut by_waste_type = BTreeMap::new();
        let mut by_priority = BTreeMap::new();
        for request in requests {
            *by_waste_type.entry(request.waste_type).or_insert(0) += 1;
            *by_priority.entry(request.priority).or_insert(0) += 1;
        }

        Self {
            generated_at: now,
            stats: RequestStats::compute(requests, collectors, now.date_naive()),
            by_waste_type,
            by_priority,
        }
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== WASTE COLLECTION REPORT ===")?;
        writeln!(f, "Generated: {}", self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(f)?;
        writeln!(f, "Total Requests: {}", self.stats.total)?;
        writeln!(f, "Pending: {}", self.stats.pending)?;
        writeln!(f, "In Progress: {}", self.stats.in_progress)?;
        writeln!(f, "Completed: {}", self.stats.completed)?;
        writeln!(f)?;
        writeln!(f, "Active Collectors: {}", self.stats.active_collectors)?;
        writeln!(f, "Total Collectors: {}", self.stats.total_collectors)?;
        writeln!(f)?;
        writeln!(f, "Waste Type Distribution:")?;
        for (waste_type, count) in &self.by_waste_type {
            writeln!(f, "  {}: {}", waste_type, count)?;
        }
        writeln!(f)?;
        writeln!(f, "Priority Distribution:")?;
        for (priority, count) in &self.by_priority {
            writeln!(f, "  {}: {}", priority, count)?;
        }
        Ok(())
    }
}

fn completed_on<'a>(requests: impl Iterator<Item = &'a Request>, date: NaiveDate) -> usize {
    requests
        .filter(|r| r.status == RequestStatus::Completed && r.collection_date == Some(date))
        .count()
}
