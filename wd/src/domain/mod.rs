//! Domain types for WasteDesk
//!
//! Core records: Request, Collector, ScheduleEntry.
//! Each is persisted as one JSON array per collection by the record store.
//!
//! Cross references between records are collector ids. Display strings such
//! as `"John Smith (C001)"` are derived when rendering, never stored.

mod collector;
mod ids;
mod kinds;
mod request;
mod schedule;
mod status;

pub use collector::{Collector, NewCollector, default_collectors};
pub use ids::{
    COLLECTOR_PREFIX, IdGenerator, IdResolver, REQUEST_PREFIX, SCHEDULE_PREFIX, next_collector_id, to_base36,
};
pub use kinds::{Priority, WasteType, Zone};
pub use request::{NewRequest, Request};
pub use schedule::{NewScheduleEntry, ScheduleEntry, day_name, parse_time};
pub use status::{CollectorStatus, RequestStatus};
