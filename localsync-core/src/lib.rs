//! localsync - local-first SQLite persistence kept in step with a remote
//! record-synchronization service.
//!
//! Every mutation made through [`LocalSync`] (or [`AsyncLocalSync`]) is
//! committed to the local database first and only then enqueued as a
//! [`PendingRecordZoneChange`] on the injected [`RemoteEngine`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use localsync_core::config::StoreConfig;
//! use localsync_core::remote::memory::MemoryRemoteEngine;
//! use localsync_core::{Database, LocalSync};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let database = Database::open(&StoreConfig::default())?;
//! let engine = Arc::new(MemoryRemoteEngine::new());
//! let store = LocalSync::new(database, engine);
//! # let _ = store;
//! # Ok(())
//! # }
//! ```

pub mod asset;
pub mod config;
pub mod local_sync;
pub mod logging;
pub mod metrics;
pub mod outbox;
pub mod record;
pub mod remote;
pub mod store;

#[cfg(test)]
pub(crate) mod test_utils;

pub use local_sync::{AsyncLocalSync, LocalSync};
pub use logging::{init_logging, LogLevel};
pub use crate::metrics::describe_metrics;
pub use outbox::{Outbox, PendingRecordZoneChange};
pub use record::{RecordId, SyncableRecord, ZoneId, DEFAULT_ZONE};
pub use remote::{RemoteEngine, RemoteError, RemoteResult};
pub use store::{Database, StoreError, StoreResult};
