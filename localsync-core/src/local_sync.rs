//! CRUD orchestration over the local store and the outbox
//!
//! Every mutation commits its write transaction first and only then hands
//! the matching descriptors to the outbox. A mutation that fails to commit
//! enqueues nothing.

use crate::asset;
use crate::config::Config;
use crate::logging::DATABASE_TARGET;
use crate::outbox::Outbox;
use crate::record::{RecordId, SyncableRecord};
use crate::remote::{RemoteEngine, RemoteResult};
use crate::store::{Database, StoreError, StoreResult};
use rusqlite::Connection;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Blocking entry point: local persistence plus remote sync triggers.
///
/// Cloning is cheap; clones share the database pools and the engine.
pub struct LocalSync<E> {
    database: Database,
    outbox: Outbox<E>,
    engine: Arc<E>,
}

impl<E> Clone for LocalSync<E> {
    fn clone(&self) -> Self {
        Self {
            database: self.database.clone(),
            outbox: self.outbox.clone(),
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<E> fmt::Debug for LocalSync<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSync").field("database", &self.database).finish_non_exhaustive()
    }
}

impl<E: RemoteEngine> LocalSync<E> {
    pub fn new(database: Database, engine: Arc<E>) -> Self {
        Self { database, outbox: Outbox::new(Arc::clone(&engine)), engine }
    }

    /// Open the database described by `config.store` and bind it to `engine`
    pub fn open(config: &Config, engine: Arc<E>) -> StoreResult<Self> {
        let database = Database::open(&config.store)?;
        Ok(Self::new(database, engine))
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// See [`Database::read`]
    pub fn read<T, Error, F>(&self, block: F) -> Result<T, Error>
    where
        F: FnOnce(&Connection) -> Result<T, Error>,
        Error: From<StoreError>,
    {
        self.database.read(block)
    }

    /// See [`Database::write`]. Nothing is enqueued for raw writes.
    pub fn write<T, Error, F>(&self, block: F) -> Result<T, Error>
    where
        F: FnOnce(&Connection) -> Result<T, Error>,
        Error: From<StoreError>,
    {
        self.database.write(block)
    }

    /// Insert `record`, then queue a save
    pub fn create<T: SyncableRecord>(&self, record: &T) -> StoreResult<()> {
        self.create_all(std::slice::from_ref(record))
    }

    /// Insert all `records` in one transaction, then queue their saves.
    ///
    /// Fails (and enqueues nothing) if any record already exists.
    pub fn create_all<T: SyncableRecord>(&self, records: &[T]) -> StoreResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        self.database.write(|conn| -> StoreResult<()> {
            for record in records {
                record.insert(conn)?;
            }
            Ok(())
        })?;
        debug!(target: DATABASE_TARGET, count = records.len(), "Created records");

        self.outbox.queue_saves(records);
        Ok(())
    }

    /// Upsert `record`, then queue a save
    pub fn save<T: SyncableRecord>(&self, record: &T) -> StoreResult<()> {
        self.save_all(std::slice::from_ref(record))
    }

    /// Upsert all `records` in one transaction, then queue their saves
    pub fn save_all<T: SyncableRecord>(&self, records: &[T]) -> StoreResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        self.database.write(|conn| -> StoreResult<()> {
            for record in records {
                record.save(conn)?;
            }
            Ok(())
        })?;
        debug!(target: DATABASE_TARGET, count = records.len(), "Saved records");

        self.outbox.queue_saves(records);
        Ok(())
    }

    /// Delete `record`, then queue a deletion
    pub fn delete<T: SyncableRecord>(&self, record: &T) -> StoreResult<()> {
        self.delete_all(std::slice::from_ref(record))
    }

    /// Delete all `records` in one transaction, then queue their deletions.
    ///
    /// Records without a local row are still queued.
    pub fn delete_all<T: SyncableRecord>(&self, records: &[T]) -> StoreResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let removed = self.database.write(|conn| -> StoreResult<usize> {
            let mut removed = 0;
            for record in records {
                if record.delete(conn)? {
                    removed += 1;
                }
            }
            Ok(removed)
        })?;
        debug!(target: DATABASE_TARGET, count = records.len(), removed, "Deleted records");

        self.outbox.queue_deletions(records);
        Ok(())
    }

    /// Trigger a push cycle
    pub async fn send_changes(&self) -> RemoteResult<()> {
        self.engine.send_changes().await
    }

    /// Trigger a pull cycle
    pub async fn fetch_changes(&self) -> RemoteResult<()> {
        self.engine.fetch_changes().await
    }

    /// Download the asset stored under `key` on record `id`
    pub async fn fetch_asset(&self, id: &RecordId, key: &str) -> RemoteResult<PathBuf> {
        asset::fetch_asset(self.engine.as_ref(), id, key).await
    }
}

/// Async entry point.
///
/// Wraps [`LocalSync`] and runs each operation on tokio's blocking pool.
/// A CRUD call commits and enqueues inside the same blocking task, so
/// dropping the returned future never leaves a committed change unqueued.
pub struct AsyncLocalSync<E> {
    inner: LocalSync<E>,
}

impl<E> Clone for AsyncLocalSync<E> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<E> fmt::Debug for AsyncLocalSync<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncLocalSync").field("inner", &self.inner).finish()
    }
}

impl<E> From<LocalSync<E>> for AsyncLocalSync<E> {
    fn from(inner: LocalSync<E>) -> Self {
        Self { inner }
    }
}

impl<E: RemoteEngine> AsyncLocalSync<E> {
    pub fn new(database: Database, engine: Arc<E>) -> Self {
        Self { inner: LocalSync::new(database, engine) }
    }

    /// The blocking API sharing this instance's database and engine
    pub fn blocking(&self) -> &LocalSync<E> {
        &self.inner
    }

    pub fn database(&self) -> &Database {
        self.inner.database()
    }

    /// See [`Database::read_async`]
    pub async fn read<T, Error, F>(&self, block: F) -> Result<T, Error>
    where
        F: FnOnce(&Connection) -> Result<T, Error> + Send + 'static,
        T: Send + 'static,
        Error: From<StoreError> + Send + 'static,
    {
        self.inner.database.read_async(block).await
    }

    /// See [`Database::write_async`]. Nothing is enqueued for raw writes.
    pub async fn write<T, Error, F>(&self, block: F) -> Result<T, Error>
    where
        F: FnOnce(&Connection) -> Result<T, Error> + Send + 'static,
        T: Send + 'static,
        Error: From<StoreError> + Send + 'static,
    {
        self.inner.database.write_async(block).await
    }

    pub async fn create<T>(&self, record: T) -> StoreResult<()>
    where
        T: SyncableRecord + Send + 'static,
    {
        self.run_blocking(move |store| store.create(&record)).await
    }

    pub async fn create_all<T>(&self, records: Vec<T>) -> StoreResult<()>
    where
        T: SyncableRecord + Send + 'static,
    {
        self.run_blocking(move |store| store.create_all(&records)).await
    }

    pub async fn save<T>(&self, record: T) -> StoreResult<()>
    where
        T: SyncableRecord + Send + 'static,
    {
        self.run_blocking(move |store| store.save(&record)).await
    }

    pub async fn save_all<T>(&self, records: Vec<T>) -> StoreResult<()>
    where
        T: SyncableRecord + Send + 'static,
    {
        self.run_blocking(move |store| store.save_all(&records)).await
    }

    pub async fn delete<T>(&self, record: T) -> StoreResult<()>
    where
        T: SyncableRecord + Send + 'static,
    {
        self.run_blocking(move |store| store.delete(&record)).await
    }

    pub async fn delete_all<T>(&self, records: Vec<T>) -> StoreResult<()>
    where
        T: SyncableRecord + Send + 'static,
    {
        self.run_blocking(move |store| store.delete_all(&records)).await
    }

    pub async fn send_changes(&self) -> RemoteResult<()> {
        self.inner.send_changes().await
    }

    pub async fn fetch_changes(&self) -> RemoteResult<()> {
        self.inner.fetch_changes().await
    }

    pub async fn fetch_asset(&self, id: &RecordId, key: &str) -> RemoteResult<PathBuf> {
        self.inner.fetch_asset(id, key).await
    }

    async fn run_blocking<R, F>(&self, op: F) -> StoreResult<R>
    where
        F: FnOnce(&LocalSync<E>) -> StoreResult<R> + Send + 'static,
        R: Send + 'static,
    {
        let store = self.inner.clone();
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }
}
