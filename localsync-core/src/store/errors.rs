//! Error types for the storage facade

use thiserror::Error;

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the local store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failure reported by SQLite, passed through untouched
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Could not check a connection out of a pool
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Filesystem error while preparing the database location
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking storage task panicked or was aborted
    #[error("Storage task failed: {0}")]
    Task(String),

    /// The location cannot be shared by the reader and writer pools
    #[error("Unsupported database location {0}: must be a file on disk")]
    UnsupportedPath(std::path::PathBuf),

    /// SQLite refused to switch the database to WAL journaling
    #[error("Database is in '{0}' journal mode, WAL is required")]
    JournalMode(String),

    /// Schema migration failed
    #[error("Migration {version} failed: {reason}")]
    Migration { version: i64, reason: String },
}

impl StoreError {
    /// Whether SQLite rejected the statement on a constraint (e.g. duplicate key)
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            StoreError::Sqlite(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}
