//! Raw storage backend contract.
//!
//! Backends store opaque bytes under string keys and know nothing about
//! image keys or day buckets; that policy lives in [`crate::store::ImageStore`].
//! Backends must provide single-key atomicity: a `put` either lands whole
//! or not at all.

use async_trait::async_trait;

use crate::error::StoreResult;

/// Prefix-addressed byte storage behind the image store.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Write `value` under `key`, replacing any existing value.
    async fn put(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Return all `(key, value)` pairs whose key starts with `prefix`,
    /// sorted by key.
    async fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, Vec<u8>)>>;

    /// Delete every key starting with `prefix`; returns how many existed.
    async fn delete_prefix(&self, prefix: &str) -> StoreResult<u64>;

    /// Release backend resources. Idempotent; failures are logged, not
    /// returned.
    async fn close(&self);
}
