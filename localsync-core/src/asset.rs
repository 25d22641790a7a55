//! Single-key asset download

use crate::record::RecordId;
use crate::remote::{FieldValue, RemoteEngine, RemoteError, RemoteResult};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Fetch the asset stored under `key` on the record `id`.
///
/// Asks the engine for that single key only. Resolves to the local path of
/// the downloaded file, or to [`RemoteError::MissingAsset`] when the field
/// is absent, is not an asset, or carries no file. Engine errors are
/// returned as-is.
pub async fn fetch_asset<E>(engine: &E, id: &RecordId, key: &str) -> RemoteResult<PathBuf>
where
    E: RemoteEngine + ?Sized,
{
    let record = engine.fetch_record(id, &[key.to_string()]).await?;

    match record.field(key) {
        Some(FieldValue::Asset(asset)) => match &asset.file_path {
            Some(path) => {
                debug!(record = %id, key, path = %path.display(), "Fetched asset");
                Ok(path.clone())
            }
            None => {
                warn!(record = %id, key, "Asset has no downloaded file");
                Err(missing(id, key))
            }
        },
        Some(FieldValue::Value(_)) => {
            warn!(record = %id, key, "Field is not an asset");
            Err(missing(id, key))
        }
        None => {
            warn!(record = %id, key, "Field not present on fetched record");
            Err(missing(id, key))
        }
    }
}

fn missing(id: &RecordId, key: &str) -> RemoteError {
    RemoteError::MissingAsset { record: id.clone(), key: key.to_string() }
}
