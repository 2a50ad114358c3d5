//! WasteDesk - waste-collection request desk
//!
//! Residents submit pickup requests, administrators assign them to
//! collectors and manage the crew and pickup schedule, and collectors move
//! their requests through Pending, In Progress and Completed.
//!
//! # Modules
//!
//! - [`domain`] - Requests, collectors, schedule entries and their value types
//! - [`store`] - Record store over a [`kvstore::KvStore`]
//! - [`lifecycle`] - Request submission, assignment, status and statistics
//! - [`schedule`] - Default rotation and manual schedule edits
//! - [`auth`] - Credential checks and persisted sessions
//! - [`export`] - JSON export of every collection
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod auth;
pub mod cli;
pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod lifecycle;
pub mod schedule;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{DeskError, DeskResult};
pub use lifecycle::{AssignSummary, RequestLifecycle, RequestStats};
pub use schedule::{ScheduleManager, ScheduleSettings};
pub use store::RecordStore;
