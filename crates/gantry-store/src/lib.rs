//! gantry-store — versioned image metadata storage.
//!
//! Records are keyed by `name:version` and bucketed by the calendar day
//! they were stored: repeated stores of the same key on the same day
//! overwrite, different days accumulate.
//!
//! # Architecture
//!
//! ```text
//! ImageStore (day-bucket policy, key validation)
//!   └── dyn StoreBackend (raw prefix-addressed byte storage)
//!         ├── RedbBackend  — embedded, single-node durable file
//!         └── EtcdBackend  — distributed, multi-writer
//! ```
//!
//! The policy layer is implemented once, above the backends, so behavior
//! is identical regardless of backend choice. `StoreRegistry` maps the
//! configured backend identifier to a constructor and memoizes the first
//! successful resolution for the life of the process.

pub mod backend;
pub mod error;
pub mod etcd_backend;
pub mod record;
pub mod redb_backend;
pub mod registry;
pub mod store;

pub use backend::StoreBackend;
pub use etcd_backend::EtcdBackend;
pub use error::{StoreError, StoreResult};
pub use record::{ImageRecord, ImageRecordList};
pub use redb_backend::RedbBackend;
pub use registry::StoreRegistry;
pub use store::ImageStore;
