//! Remote synchronization engine contract
//!
//! The engine owns the pending-change set, the push/pull cycles and record
//! fetches. This crate only appends to the pending set and triggers cycles;
//! conflict resolution, transport and retries are the engine's business.

use crate::outbox::PendingRecordZoneChange;
use crate::record::RecordId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

pub mod memory;

/// Result type for remote operations
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors reported by the remote engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RemoteError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Zone error: {0}")]
    Zone(String),

    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),

    /// The fetched record has no downloadable asset under `key`
    #[error("Record {record} has no asset for key '{key}'")]
    MissingAsset { record: RecordId, key: String },

    #[error("Engine error: {0}")]
    Engine(String),
}

/// Blob field of a remote record
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    /// Local copy of the blob, when the engine downloaded one
    pub file_path: Option<PathBuf>,
}

/// Value of a single remote record field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Asset(Asset),
    Value(serde_json::Value),
}

/// A record as returned by a single-record fetch
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedRecord {
    pub id: RecordId,
    pub fields: HashMap<String, FieldValue>,
}

impl FetchedRecord {
    pub fn new(id: RecordId) -> Self {
        Self { id, fields: HashMap::new() }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }
}

/// Remote synchronization engine.
///
/// Implementations must accept concurrent calls to
/// [`RemoteEngine::add_pending_changes`].
#[async_trait]
pub trait RemoteEngine: Send + Sync + 'static {
    /// Append descriptors to the pending-change set in one batch
    fn add_pending_changes(&self, changes: Vec<PendingRecordZoneChange>);

    /// Run a push cycle over the pending-change set
    async fn send_changes(&self) -> RemoteResult<()>;

    /// Run a pull cycle, applying remote changes to the local store
    async fn fetch_changes(&self) -> RemoteResult<()>;

    /// Fetch one record, restricted to `desired_keys`
    async fn fetch_record(
        &self,
        id: &RecordId,
        desired_keys: &[String],
    ) -> RemoteResult<FetchedRecord>;
}
