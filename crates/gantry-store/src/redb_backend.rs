//! Embedded backend — a single redb file on local disk.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use tracing::debug;

use crate::backend::StoreBackend;
use crate::error::{StoreError, StoreResult};

/// Image records keyed by `{name}:{version}:{day}`.
const IMAGES: TableDefinition<&str, &[u8]> = TableDefinition::new("images");

/// Convert any `Display` error into a `StoreError::Backend`.
macro_rules! backend_err {
    () => {
        |e| StoreError::Backend(e.to_string())
    };
}

/// Embedded single-node backend backed by redb.
#[derive(Clone)]
pub struct RedbBackend {
    db: Arc<Database>,
}

impl RedbBackend {
    /// Open (or create) a durable backend at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let db = Database::create(path).map_err(backend_err!())?;
        let backend = Self { db: Arc::new(db) };
        backend.ensure_table()?;
        debug!(?path, "redb backend opened");
        Ok(backend)
    }

    /// Create an ephemeral in-memory backend (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder()
            .create_with_backend(redb::backends::InMemoryBackend::new())
            .map_err(backend_err!())?;
        let backend = Self { db: Arc::new(db) };
        backend.ensure_table()?;
        debug!("in-memory redb backend opened");
        Ok(backend)
    }

    /// Opening the table in a write transaction creates it if absent.
    fn ensure_table(&self) -> StoreResult<()> {
        let txn = self.db.begin_write().map_err(backend_err!())?;
        txn.open_table(IMAGES).map_err(backend_err!())?;
        txn.commit().map_err(backend_err!())?;
        Ok(())
    }
}

#[async_trait]
impl StoreBackend for RedbBackend {
    async fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let txn = self.db.begin_write().map_err(backend_err!())?;
        {
            let mut table = txn.open_table(IMAGES).map_err(backend_err!())?;
            table.insert(key, value).map_err(backend_err!())?;
        }
        txn.commit().map_err(backend_err!())?;
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, Vec<u8>)>> {
        let txn = self.db.begin_read().map_err(backend_err!())?;
        let table = txn.open_table(IMAGES).map_err(backend_err!())?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(backend_err!())? {
            let (key, value) = entry.map_err(backend_err!())?;
            if key.value().starts_with(prefix) {
                results.push((key.value().to_string(), value.value().to_vec()));
            }
        }
        Ok(results)
    }

    async fn delete_prefix(&self, prefix: &str) -> StoreResult<u64> {
        // Collect matching keys in a read transaction first.
        let keys: Vec<String> = {
            let txn = self.db.begin_read().map_err(backend_err!())?;
            let table = txn.open_table(IMAGES).map_err(backend_err!())?;
            table
                .iter()
                .map_err(backend_err!())?
                .filter_map(|entry| {
                    let (key, _) = entry.ok()?;
                    let k = key.value().to_string();
                    k.starts_with(prefix).then_some(k)
                })
                .collect()
        };
        let txn = self.db.begin_write().map_err(backend_err!())?;
        {
            let mut table = txn.open_table(IMAGES).map_err(backend_err!())?;
            for key in &keys {
                table.remove(key.as_str()).map_err(backend_err!())?;
            }
        }
        txn.commit().map_err(backend_err!())?;
        Ok(keys.len() as u64)
    }

    async fn close(&self) {
        // redb flushes on commit and releases the file handle on drop; there
        // is nothing to tear down eagerly.
        debug!("redb backend released");
    }
}
