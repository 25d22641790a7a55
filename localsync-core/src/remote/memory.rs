//! In-memory remote engine
//!
//! Keeps the pending-change set, a log of pushed changes and a small
//! remote record table in memory. Meant for tests and offline development.

use super::{FetchedRecord, RemoteEngine, RemoteError, RemoteResult};
use crate::outbox::PendingRecordZoneChange;
use crate::record::RecordId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// In-memory remote engine (for testing)
#[derive(Debug, Default)]
pub struct MemoryRemoteEngine {
    pending: Mutex<Vec<PendingRecordZoneChange>>,
    sent: Mutex<Vec<PendingRecordZoneChange>>,
    records: Mutex<HashMap<RecordId, FetchedRecord>>,
    send_failure: Mutex<Option<RemoteError>>,
    fetch_failure: Mutex<Option<RemoteError>>,
    batches: AtomicUsize,
    fetch_cycles: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryRemoteEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptors waiting for the next push, oldest first
    pub fn pending_changes(&self) -> Vec<PendingRecordZoneChange> {
        lock(&self.pending).clone()
    }

    /// Descriptors pushed so far, in push order
    pub fn sent_changes(&self) -> Vec<PendingRecordZoneChange> {
        lock(&self.sent).clone()
    }

    /// Number of `add_pending_changes` calls received
    pub fn batch_count(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }

    /// Number of completed pull cycles
    pub fn fetch_count(&self) -> usize {
        self.fetch_cycles.load(Ordering::SeqCst)
    }

    /// Make a record available to `fetch_record`
    pub fn insert_record(&self, record: FetchedRecord) {
        lock(&self.records).insert(record.id.clone(), record);
    }

    /// Fail the next push with `error`
    pub fn fail_next_send(&self, error: RemoteError) {
        *lock(&self.send_failure) = Some(error);
    }

    /// Fail the next pull with `error`
    pub fn fail_next_fetch(&self, error: RemoteError) {
        *lock(&self.fetch_failure) = Some(error);
    }
}

#[async_trait]
impl RemoteEngine for MemoryRemoteEngine {
    fn add_pending_changes(&self, changes: Vec<PendingRecordZoneChange>) {
        self.batches.fetch_add(1, Ordering::SeqCst);
        lock(&self.pending).extend(changes);
    }

    async fn send_changes(&self) -> RemoteResult<()> {
        if let Some(error) = lock(&self.send_failure).take() {
            return Err(error);
        }

        let drained: Vec<_> = lock(&self.pending).drain(..).collect();
        {
            let mut records = lock(&self.records);
            for change in &drained {
                match change {
                    PendingRecordZoneChange::SaveRecord(id) => {
                        records
                            .entry(id.clone())
                            .or_insert_with(|| FetchedRecord::new(id.clone()));
                    }
                    PendingRecordZoneChange::DeleteRecord(id) => {
                        records.remove(id);
                    }
                }
            }
        }

        debug!(count = drained.len(), "Pushed pending changes");
        lock(&self.sent).extend(drained);
        Ok(())
    }

    async fn fetch_changes(&self) -> RemoteResult<()> {
        if let Some(error) = lock(&self.fetch_failure).take() {
            return Err(error);
        }
        self.fetch_cycles.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn fetch_record(
        &self,
        id: &RecordId,
        desired_keys: &[String],
    ) -> RemoteResult<FetchedRecord> {
        let records = lock(&self.records);
        let record = records.get(id).ok_or_else(|| RemoteError::RecordNotFound(id.clone()))?;

        let mut fetched = FetchedRecord::new(record.id.clone());
        for (key, value) in &record.fields {
            if desired_keys.is_empty() || desired_keys.contains(key) {
                fetched.fields.insert(key.clone(), value.clone());
            }
        }
        Ok(fetched)
    }
}
