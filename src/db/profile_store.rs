use std::path::PathBuf;

use crate::error::{AppError, AppResult};
use crate::models::ReaderCatalog;

/// Durable read-through store mapping reader identifier to catalog
///
/// One JSON document per reader under the store directory. Entries are
/// overwritten unconditionally on `put` and live until replaced or
/// externally removed; there is no expiration.
#[derive(Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn entry_path(&self, reader_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", reader_id))
    }

    /// Retrieves the cached catalog for a reader.
    ///
    /// A missing or unparseable entry is a cache miss, never an error;
    /// corruption simply forces re-ingestion.
    pub async fn get(&self, reader_id: &str) -> Option<ReaderCatalog> {
        let path = self.entry_path(reader_id);
        let data = tokio::fs::read(&path).await.ok()?;

        match serde_json::from_slice(&data) {
            Ok(catalog) => Some(catalog),
            Err(e) => {
                tracing::warn!(
                    reader_id = %reader_id,
                    path = %path.display(),
                    error = %e,
                    "Discarding corrupt profile cache entry"
                );
                None
            }
        }
    }

    /// Stores a catalog, replacing any previous entry for the reader
    pub async fn put(&self, reader_id: &str, catalog: &ReaderCatalog) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create cache dir: {}", e)))?;

        let json = serde_json::to_vec_pretty(catalog)
            .map_err(|e| AppError::Internal(format!("Profile serialization error: {}", e)))?;

        let path = self.entry_path(reader_id);
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write profile cache: {}", e)))?;

        tracing::debug!(reader_id = %reader_id, path = %path.display(), "Profile cached");

        Ok(())
    }

    #[cfg(test)]
    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}
