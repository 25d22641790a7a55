//! Storage access facade
//!
//! Wraps SQLite behind two connection pools: a read-only pool shared by
//! concurrent readers and a single-connection writer pool that serializes
//! every write transaction.

mod database;
mod errors;
pub mod migrations;
pub mod request;

pub use database::Database;
pub(crate) use database::is_in_memory_path;
pub use errors::{StoreError, StoreResult};
pub use migrations::Migration;
pub use request::SqlRequest;
