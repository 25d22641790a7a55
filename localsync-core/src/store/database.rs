//! SQLite-backed storage facade
//!
//! Provides transactional access to the local store:
//! - `read` / `read_async`: snapshot reads on a pool of read-only connections
//! - `write` / `write_async`: `BEGIN IMMEDIATE` transactions on the single writer
//!
//! The async variants run the blocking variant on tokio's blocking pool, so
//! both paths share the exact same transaction handling.

use super::errors::{StoreError, StoreResult};
use crate::config::StoreConfig;
use crate::logging::DATABASE_TARGET;
use crate::metrics::{WRITES_COMMITTED, WRITES_ROLLED_BACK, WRITE_DURATION_MS};
use crate::record::{RecordId, SyncableRecord};
use metrics::{counter, histogram};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags, TransactionBehavior};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Handle on the local database.
///
/// Cloning is cheap; clones share both pools.
#[derive(Clone)]
pub struct Database {
    reader: Pool<SqliteConnectionManager>,
    writer: Pool<SqliteConnectionManager>,
    path: Arc<PathBuf>,
}

impl Database {
    /// Open (creating if needed) the database described by `config`.
    ///
    /// The file is switched to WAL journaling; a location that cannot run in
    /// WAL mode, or that each pool would see as a separate database (such as
    /// `:memory:`), is rejected.
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        let path = config.path.clone();
        if is_in_memory_path(&path) {
            return Err(StoreError::UnsupportedPath(path));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let busy_timeout = config.busy_timeout;

        // The writer is opened first so the file exists (and is in WAL mode)
        // before any read-only connection is attempted.
        let writer_manager = SqliteConnectionManager::file(&path).with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            let mode: String =
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
            debug!(target: DATABASE_TARGET, journal_mode = %mode, "Configured writer connection");
            Ok(())
        });
        let writer = Pool::builder()
            .max_size(1)
            .connection_timeout(config.checkout_timeout)
            .build(writer_manager)?;

        let mode: String =
            writer.get()?.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
        if !mode.eq_ignore_ascii_case("wal") {
            return Err(StoreError::JournalMode(mode));
        }

        let reader_manager = SqliteConnectionManager::file(&path)
            .with_flags(
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .with_init(move |conn| conn.busy_timeout(busy_timeout));
        let reader = Pool::builder()
            .max_size(config.max_readers)
            .connection_timeout(config.checkout_timeout)
            .build(reader_manager)?;

        info!(
            target: DATABASE_TARGET,
            path = %path.display(),
            max_readers = config.max_readers,
            "Opened database"
        );

        Ok(Self { reader, writer, path: Arc::new(path) })
    }

    /// Location of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `block` against a read-only snapshot of the store.
    ///
    /// Every statement issued by `block` observes the same snapshot; writes
    /// committed while the block runs are not visible to it.
    pub fn read<T, E, F>(&self, block: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut conn = self.reader.get().map_err(StoreError::from)?;
        let tx = conn.transaction().map_err(StoreError::from)?;
        let outcome = block(&*tx);
        // Read-only: dropping the transaction just releases the snapshot.
        drop(tx);
        outcome
    }

    /// Run `block` inside one write transaction.
    ///
    /// Commits when `block` returns `Ok`; rolls back and returns the block's
    /// error unchanged otherwise.
    pub fn write<T, E, F>(&self, block: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
        E: From<StoreError>,
    {
        let started = Instant::now();
        let mut conn = self.writer.get().map_err(StoreError::from)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::from)?;

        let outcome = block(&*tx);
        match outcome {
            Ok(value) => {
                tx.commit().map_err(StoreError::from)?;
                counter!(WRITES_COMMITTED).increment(1);
                histogram!(WRITE_DURATION_MS).record(started.elapsed().as_secs_f64() * 1000.0);
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(target: DATABASE_TARGET, error = %rollback_err, "Rollback failed");
                }
                counter!(WRITES_ROLLED_BACK).increment(1);
                debug!(target: DATABASE_TARGET, "Write transaction rolled back");
                Err(err)
            }
        }
    }

    /// [`Database::read`] on the blocking pool
    pub async fn read_async<T, E, F>(&self, block: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StoreError> + Send + 'static,
    {
        let database = self.clone();
        tokio::task::spawn_blocking(move || database.read(block))
            .await
            .map_err(|e| E::from(StoreError::Task(e.to_string())))?
    }

    /// [`Database::write`] on the blocking pool.
    ///
    /// The transaction runs to completion (commit or rollback) even if the
    /// returned future is dropped.
    pub async fn write_async<T, E, F>(&self, block: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StoreError> + Send + 'static,
    {
        let database = self.clone();
        tokio::task::spawn_blocking(move || database.write(block))
            .await
            .map_err(|e| E::from(StoreError::Task(e.to_string())))?
    }

    /// Write records received from the remote service into the local store.
    ///
    /// Modified records are upserted and deleted identities removed, all in
    /// one transaction. Nothing is enqueued: these changes already exist
    /// remotely.
    pub fn apply_fetched_changes<T: SyncableRecord>(
        &self,
        modified: &[T],
        deleted: &[RecordId],
    ) -> StoreResult<()> {
        self.write(|conn| -> StoreResult<()> {
            for record in modified {
                record.save(conn)?;
            }
            for id in deleted {
                T::delete_fetched(conn, id)?;
            }
            Ok(())
        })?;

        info!(
            target: DATABASE_TARGET,
            modified = modified.len(),
            deleted = deleted.len(),
            "Applied fetched changes"
        );
        Ok(())
    }
}

/// Whether `path` names a database that is not a shared file on disk.
///
/// Covers `:memory:`, the empty path (a private temporary file) and URI
/// filenames such as `file::memory:` or `file:name?mode=memory`.
pub(crate) fn is_in_memory_path(path: &Path) -> bool {
    let Some(location) = path.to_str() else {
        return false;
    };
    if location.is_empty() || location == ":memory:" {
        return true;
    }
    match location.strip_prefix("file:") {
        Some(uri) => {
            let (name, query) = uri.split_once('?').unwrap_or((uri, ""));
            name.is_empty() || name == ":memory:" || query.split('&').any(|p| p == "mode=memory")
        }
        None => false,
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.path)
            .field("readers", &self.reader.max_size())
            .finish()
    }
}
