//! Backend registry — maps a configured datastore identifier to a
//! constructor and memoizes the first successful resolution.
//!
//! The resolved handle is write-once: later `resolve` calls return the
//! cached store without re-invoking the constructor.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use gantry_core::GantryConfig;
use tokio::sync::OnceCell;
use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::etcd_backend::EtcdBackend;
use crate::redb_backend::RedbBackend;
use crate::store::ImageStore;

type ConstructorFuture = Pin<Box<dyn Future<Output = StoreResult<ImageStore>> + Send>>;
type Constructor = Box<dyn Fn(&GantryConfig) -> ConstructorFuture + Send + Sync>;

/// Process-wide mapping from datastore identifiers to store constructors.
pub struct StoreRegistry {
    constructors: HashMap<String, Constructor>,
    active: OnceCell<Arc<ImageStore>>,
}

impl StoreRegistry {
    /// An empty registry with no backends.
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
            active: OnceCell::new(),
        }
    }

    /// A registry with the built-in backends: `redb` (embedded) and
    /// `etcd` (distributed).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("redb", |config: &GantryConfig| {
            let path = config.datastore_path();
            Box::pin(async move {
                let backend = RedbBackend::open(&path)?;
                Ok(ImageStore::new(Box::new(backend)))
            })
        });
        registry.register("etcd", |config: &GantryConfig| {
            let endpoints = config.datastore_endpoints();
            Box::pin(async move {
                let backend = EtcdBackend::connect(&endpoints).await?;
                Ok(ImageStore::new(Box::new(backend)))
            })
        });
        registry
    }

    /// Register a constructor under an identifier.
    pub fn register<F>(&mut self, id: &str, constructor: F)
    where
        F: Fn(&GantryConfig) -> ConstructorFuture + Send + Sync + 'static,
    {
        self.constructors.insert(id.to_string(), Box::new(constructor));
    }

    /// Registered backend identifiers, sorted.
    pub fn known_backends(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.constructors.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Resolve the active store. The first successful resolution is cached
    /// for the rest of the process; an unknown identifier is a
    /// configuration error for the caller to treat as fatal.
    pub async fn resolve(&self, config: &GantryConfig) -> StoreResult<Arc<ImageStore>> {
        if let Some(store) = self.active.get() {
            return Ok(store.clone());
        }
        let kind = config.datastore.kind.as_str();
        let constructor = self.constructors.get(kind).ok_or_else(|| {
            StoreError::Validation(format!(
                "{kind} is not a valid datastore type (known: {})",
                self.known_backends().join(", ")
            ))
        })?;
        let store = self
            .active
            .get_or_try_init(|| async {
                let store = constructor(config).await?;
                info!(datastore = kind, "image store resolved");
                Ok::<_, StoreError>(Arc::new(store))
            })
            .await?;
        Ok(store.clone())
    }
}

impl Default for StoreRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
