//! Distributed backend — etcd, for multi-writer setups.
//!
//! etcd gives linearizable single-key writes, which is all the policy
//! layer needs: the day-bucket overwrite decision is carried entirely in
//! the key, so concurrent writers cannot tear a record.

use async_trait::async_trait;
use etcd_client::{Client, DeleteOptions, GetOptions};
use tokio::sync::Mutex;
use tracing::debug;

use crate::backend::StoreBackend;
use crate::error::{StoreError, StoreResult};

/// Distributed backend backed by an etcd cluster.
pub struct EtcdBackend {
    // etcd-client operations take `&mut Client`.
    client: Mutex<Client>,
}

impl EtcdBackend {
    /// Connect to the given etcd endpoints.
    pub async fn connect(endpoints: &[String]) -> StoreResult<Self> {
        let client = Client::connect(endpoints, None)
            .await
            .map_err(|e| StoreError::Backend(format!("etcd connect: {e}")))?;
        debug!(?endpoints, "etcd backend connected");
        Ok(Self {
            client: Mutex::new(client),
        })
    }
}

#[async_trait]
impl StoreBackend for EtcdBackend {
    async fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let mut client = self.client.lock().await;
        client
            .put(key, value, None)
            .await
            .map_err(|e| StoreError::Backend(format!("etcd put: {e}")))?;
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, Vec<u8>)>> {
        let mut client = self.client.lock().await;
        let resp = client
            .get(prefix, Some(GetOptions::new().with_prefix()))
            .await
            .map_err(|e| StoreError::Backend(format!("etcd get: {e}")))?;
        let mut results = Vec::new();
        for kv in resp.kvs() {
            let key = kv
                .key_str()
                .map_err(|e| StoreError::Deserialize(format!("etcd key: {e}")))?;
            results.push((key.to_string(), kv.value().to_vec()));
        }
        // etcd returns range reads in key order already; keep the contract
        // explicit rather than relying on it.
        results.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(results)
    }

    async fn delete_prefix(&self, prefix: &str) -> StoreResult<u64> {
        let mut client = self.client.lock().await;
        let resp = client
            .delete(prefix, Some(DeleteOptions::new().with_prefix()))
            .await
            .map_err(|e| StoreError::Backend(format!("etcd delete: {e}")))?;
        Ok(resp.deleted() as u64)
    }

    async fn close(&self) {
        // Connections are torn down when the client drops.
        debug!("etcd backend released");
    }
}
