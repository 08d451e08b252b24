//! Bazaar DB - Persistence adapter
//!
//! Provides durable storage for named JSON blobs:
//! - Catalog files (`StoreItems.json`, `Traits.json`, `Weather.json`)
//! - Cooldown settings and the usage ledger
//! - Timestamped backups of files that failed to parse
//!
//! Writes are whole-file atomic replaces. [`SaveWorker`] moves them off the
//! caller's thread when the caller cannot block on disk I/O.

mod error;
mod memory;
mod queue;
pub mod recover;
mod store;

pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use queue::{SaveQueue, SaveWorker};
pub use store::{save_logged, FileStore, Persistence};
