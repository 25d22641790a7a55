//! Pending-change outbox
//!
//! Turns completed local mutations into [`PendingRecordZoneChange`]s and
//! hands them to the remote engine, one batch per mutation call. The outbox
//! never touches local storage and never deduplicates; the engine coalesces
//! repeated descriptors for the same record.

use crate::logging::DATABASE_TARGET;
use crate::metrics::{OUTBOX_DELETIONS_QUEUED, OUTBOX_SAVES_QUEUED};
use crate::record::{RecordId, SyncableRecord};
use crate::remote::RemoteEngine;
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Intent that a record must eventually be reflected remotely
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PendingRecordZoneChange {
    /// Push the current local state of the record
    SaveRecord(RecordId),
    /// Remove the record from its zone
    DeleteRecord(RecordId),
}

impl PendingRecordZoneChange {
    pub fn record_id(&self) -> &RecordId {
        match self {
            PendingRecordZoneChange::SaveRecord(id) | PendingRecordZoneChange::DeleteRecord(id) => id,
        }
    }

    pub fn is_save(&self) -> bool {
        matches!(self, PendingRecordZoneChange::SaveRecord(_))
    }
}

/// Appends descriptors to the engine's pending-change set
pub struct Outbox<E> {
    engine: Arc<E>,
}

impl<E> Clone for Outbox<E> {
    fn clone(&self) -> Self {
        Self { engine: Arc::clone(&self.engine) }
    }
}

impl<E: RemoteEngine> Outbox<E> {
    pub fn new(engine: Arc<E>) -> Self {
        Self { engine }
    }

    /// Queue a `SaveRecord` for every record
    pub fn queue_saves<T: SyncableRecord>(&self, records: &[T]) {
        if records.is_empty() {
            return;
        }

        info!(target: DATABASE_TARGET, count = records.len(), "Queuing saves");
        let pending_saves: Vec<_> = records
            .iter()
            .map(|record| PendingRecordZoneChange::SaveRecord(record.record_id()))
            .collect();

        counter!(OUTBOX_SAVES_QUEUED).increment(pending_saves.len() as u64);
        self.engine.add_pending_changes(pending_saves);
    }

    /// Queue a `DeleteRecord` for every record
    pub fn queue_deletions<T: SyncableRecord>(&self, records: &[T]) {
        if records.is_empty() {
            return;
        }

        info!(target: DATABASE_TARGET, count = records.len(), "Queuing deletions");
        let pending_deletions: Vec<_> = records
            .iter()
            .map(|record| PendingRecordZoneChange::DeleteRecord(record.record_id()))
            .collect();

        counter!(OUTBOX_DELETIONS_QUEUED).increment(pending_deletions.len() as u64);
        self.engine.add_pending_changes(pending_deletions);
    }
}
