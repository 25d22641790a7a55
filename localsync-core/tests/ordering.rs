//! Commit happens strictly before enqueue

mod common;

use async_trait::async_trait;
use common::{open_database, Note};
use localsync_core::remote::FetchedRecord;
use localsync_core::{
    AsyncLocalSync, Database, LocalSync, PendingRecordZoneChange, RecordId, RemoteEngine,
    RemoteError, RemoteResult, StoreResult,
};
use rusqlite::{params, OptionalExtension};
use std::sync::{Arc, Mutex};

/// Engine that checks, at enqueue time, whether each descriptor's local
/// effect is already visible to a fresh reader
struct ProbeEngine {
    database: Database,
    observations: Mutex<Vec<(PendingRecordZoneChange, bool)>>,
}

impl ProbeEngine {
    fn new(database: Database) -> Self {
        Self { database, observations: Mutex::new(Vec::new()) }
    }

    fn observations(&self) -> Vec<(PendingRecordZoneChange, bool)> {
        self.observations.lock().unwrap().clone()
    }

    fn row_exists(&self, id: &RecordId) -> bool {
        let name = id.record_name().to_string();
        self.database
            .read(|conn| -> StoreResult<bool> {
                let found: Option<i64> = conn
                    .query_row("SELECT 1 FROM notes WHERE id = ?1", params![name], |row| row.get(0))
                    .optional()?;
                Ok(found.is_some())
            })
            .unwrap()
    }
}

#[async_trait]
impl RemoteEngine for ProbeEngine {
    fn add_pending_changes(&self, changes: Vec<PendingRecordZoneChange>) {
        for change in changes {
            let exists = self.row_exists(change.record_id());
            let committed = if change.is_save() { exists } else { !exists };
            self.observations.lock().unwrap().push((change, committed));
        }
    }

    async fn send_changes(&self) -> RemoteResult<()> {
        Ok(())
    }

    async fn fetch_changes(&self) -> RemoteResult<()> {
        Ok(())
    }

    async fn fetch_record(&self, id: &RecordId, _desired_keys: &[String]) -> RemoteResult<FetchedRecord> {
        Err(RemoteError::RecordNotFound(id.clone()))
    }
}

#[test]
fn test_effects_are_committed_before_enqueue() {
    let (db, _dir) = open_database();
    let engine = Arc::new(ProbeEngine::new(db.clone()));
    let store = LocalSync::new(db, engine.clone());

    store.create(&Note::new("A", "a")).unwrap();
    store.save_all(&[Note::new("B", "b"), Note::new("C", "c")]).unwrap();
    store.delete(&Note::new("A", "a")).unwrap();

    let observations = engine.observations();
    assert_eq!(observations.len(), 4);
    for (change, committed) in observations {
        assert!(committed, "{change:?} was enqueued before its commit");
    }
}

#[tokio::test]
async fn test_async_effects_are_committed_before_enqueue() {
    let (db, _dir) = open_database();
    let engine = Arc::new(ProbeEngine::new(db.clone()));
    let store = AsyncLocalSync::new(db, engine.clone());

    store.create_all(vec![Note::new("A", "a"), Note::new("B", "b")]).await.unwrap();
    store.delete_all(vec![Note::new("A", "a")]).await.unwrap();

    let observations = engine.observations();
    assert_eq!(observations.len(), 3);
    assert!(observations.iter().all(|(_, committed)| *committed));
}

#[test]
fn test_failed_write_never_reaches_engine() {
    let (db, _dir) = open_database();
    let engine = Arc::new(ProbeEngine::new(db.clone()));
    let store = LocalSync::new(db, engine.clone());

    store.create(&Note::new("A", "a")).unwrap();
    assert!(store.create_all(&[Note::new("Z", "z"), Note::new("A", "again")]).is_err());

    assert_eq!(engine.observations().len(), 1);
}
