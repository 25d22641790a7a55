//! Metric names and descriptions
//!
//! Recording goes through the `metrics` facade; the embedding application
//! decides whether and where to export.

use ::metrics::{describe_counter, describe_histogram, Unit};

pub const OUTBOX_SAVES_QUEUED: &str = "localsync.outbox.saves_queued";
pub const OUTBOX_DELETIONS_QUEUED: &str = "localsync.outbox.deletions_queued";
pub const WRITES_COMMITTED: &str = "localsync.store.writes_committed";
pub const WRITES_ROLLED_BACK: &str = "localsync.store.writes_rolled_back";
pub const WRITE_DURATION_MS: &str = "localsync.store.write_duration_ms";

/// Register descriptions with the installed recorder
pub fn describe_metrics() {
    describe_counter!(OUTBOX_SAVES_QUEUED, "Save descriptors handed to the remote engine");
    describe_counter!(OUTBOX_DELETIONS_QUEUED, "Delete descriptors handed to the remote engine");
    describe_counter!(WRITES_COMMITTED, "Committed write transactions");
    describe_counter!(WRITES_ROLLED_BACK, "Write transactions rolled back");
    describe_histogram!(WRITE_DURATION_MS, Unit::Milliseconds, "Write transaction duration");
}
