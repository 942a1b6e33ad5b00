//! ImageStore — the day-bucket policy layer above any backend.
//!
//! Storage keys are `{name}:{version}:{YYYY-MM-DD}`. Because the day is
//! part of the key, the same-day overwrite decision never needs to read
//! existing content: a second store of the same key on the same day lands
//! on the same storage key and replaces it atomically, while stores on
//! different days land on distinct keys and accumulate.

use chrono::{Local, NaiveDate};
use gantry_core::ImageKey;
use tracing::debug;

use crate::backend::StoreBackend;
use crate::error::{StoreError, StoreResult};
use crate::record::{ImageRecord, ImageRecordList};

/// Image metadata store over a pluggable backend.
pub struct ImageStore {
    backend: Box<dyn StoreBackend>,
}

impl std::fmt::Debug for ImageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageStore").finish_non_exhaustive()
    }
}

impl ImageStore {
    pub fn new(backend: Box<dyn StoreBackend>) -> Self {
        Self { backend }
    }

    /// Store a metadata document under `NAME:VERSION`, bucketed by today's
    /// date. A record stored earlier the same day for the same key is
    /// silently superseded.
    pub async fn store(&self, raw_key: &str, meta: serde_json::Value) -> StoreResult<()> {
        let key = ImageKey::parse(raw_key)?;
        self.store_at(&key, Local::now().date_naive(), meta).await
    }

    /// Store under an explicit day bucket. `store` delegates here with the
    /// process-local clock; tests use it to simulate days.
    pub async fn store_at(
        &self,
        key: &ImageKey,
        day: NaiveDate,
        meta: serde_json::Value,
    ) -> StoreResult<()> {
        let record = ImageRecord {
            name: key.name.clone(),
            version: key.version.clone(),
            day,
            meta,
        };
        let value =
            serde_json::to_vec(&record).map_err(|e| StoreError::Serialize(e.to_string()))?;
        let storage_key = storage_key(&key.name, &key.version, day);
        self.backend.put(&storage_key, &value).await?;
        debug!(%storage_key, "image record stored");
        Ok(())
    }

    /// Return every record stored under `name`, across all versions and
    /// days, ordered by `(version, day)`. Empty when nothing matches.
    pub async fn list(&self, name: &str) -> StoreResult<ImageRecordList> {
        let prefix = format!("{name}:");
        let mut images = Vec::new();
        for (key, value) in self.backend.scan_prefix(&prefix).await? {
            let record: ImageRecord = serde_json::from_slice(&value)
                .map_err(|e| StoreError::Deserialize(format!("record under {key}: {e}")))?;
            images.push(record);
        }
        images.sort_by(|a, b| (&a.version, a.day).cmp(&(&b.version, b.day)));
        Ok(ImageRecordList { images })
    }

    /// Delete every day bucket for `NAME:VERSION`. Errors with `NotFound`
    /// when no record matched.
    pub async fn delete(&self, raw_key: &str) -> StoreResult<()> {
        let key = ImageKey::parse(raw_key)?;
        let prefix = format!("{}:{}:", key.name, key.version);
        let removed = self.backend.delete_prefix(&prefix).await?;
        if removed == 0 {
            return Err(StoreError::NotFound(format!("no records for {key}")));
        }
        debug!(%key, removed, "image records deleted");
        Ok(())
    }

    /// Release backend resources. Idempotent; never fails loudly.
    pub async fn cleanup(&self) {
        self.backend.close().await;
        debug!("image store cleaned up");
    }
}

fn storage_key(name: &str, version: &str, day: NaiveDate) -> String {
    format!("{name}:{version}:{}", day.format("%Y-%m-%d"))
}
