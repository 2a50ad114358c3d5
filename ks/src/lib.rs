//! KvStore - key/value JSON document store
//!
//! Persists whole serde documents under short string keys. Loads fail soft:
//! a missing or unreadable document comes back as `None` and the caller
//! substitutes its own default. Saves fail soft too: errors are logged and
//! the caller keeps running on its in-memory state.
//!
//! # Architecture
//!
//! ```text
//! store/
//! ├── requests.json
//! ├── collectors.json
//! ├── schedules.json
//! └── currentAdmin.json
//! ```
//!
//! # Example
//!
//! ```ignore
//! use kvstore::KvStore;
//!
//! let store = KvStore::open(".wastedesk")?;
//! let names: Vec<String> = store.load_or("names", Vec::new());
//! store.save("names", &names);
//! ```

mod backend;
mod error;
mod store;

pub use backend::{Backend, FileBackend, MemoryBackend};
pub use error::{KvError, KvResult};
pub use store::KvStore;

/// File extension used for documents on disk
pub const DOCUMENT_EXTENSION: &str = "json";
