//! Record store
//!
//! Holds the three collections in memory, hydrated from a [`KvStore`] when
//! opened and written back wholesale after each mutation. There is no
//! transaction across collections: saving requests and saving collectors are
//! independent writes.

mod records;

pub use records::{COLLECTORS_KEY, REQUESTS_KEY, RecordStore, SCHEDULES_KEY};
