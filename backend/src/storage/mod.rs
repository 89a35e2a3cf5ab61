//! # Storage Module
//!
//! Handles all data persistence for the money box.
//!
//! Stores never touch the device directly. They hand a serialized state to the
//! [`PersistenceAdapter`], which writes it through a [`KeyValueStorage`]
//! backend keyed by store name (`"income-storage"`, `"investment-storage"`).
//!
//! ## Backends
//!
//! - **JSON files** ([`JsonConnection`]): one `<key>.json` file per store in the
//!   data directory, written atomically through a temp file
//! - **Memory** ([`MemoryStorage`]): process-local map, used for tests and
//!   ephemeral sessions
//!
//! ## Layout on disk
//!
//! ```text
//! Little Money Box/
//! ├── config.yaml
//! ├── income-storage.json
//! └── investment-storage.json
//! ```

pub mod json;
pub mod memory;
pub mod persistence;
pub mod traits;
pub mod write_through;

#[cfg(test)]
pub mod test_utils;

pub use json::JsonConnection;
pub use memory::MemoryStorage;
pub use persistence::{PersistedEnvelope, PersistenceAdapter, STATE_VERSION};
pub use traits::KeyValueStorage;
pub use write_through::WriteThrough;
