//! Request lifecycle
//!
//! Submission, collector assignment, status changes and the counters derived
//! from the request collection.

mod manager;
mod stats;

pub use manager::{AssignSummary, DEFAULT_RECENT_LIMIT, RequestLifecycle};
pub use stats::{CollectorStats, Report, RequestStats};
