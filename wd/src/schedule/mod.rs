//! Pickup schedule
//!
//! A default rotation is generated once, when no entries exist. After that
//! the schedule only changes through manual add, edit and remove.

mod manager;

pub use manager::{ScheduleManager, ScheduleSettings};
