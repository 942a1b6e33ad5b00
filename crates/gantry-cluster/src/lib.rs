//! gantry-cluster — connector to a live Kubernetes control plane.
//!
//! Exposes deployment listing, retrieval, and targeted container-image
//! mutation. The mutation is a read-modify-write: fetch the Deployment,
//! rewrite one container's image locally, submit the whole object back.
//! The object's `resourceVersion` rides along, so a concurrent writer
//! surfaces as a `Conflict` and the update is retried a bounded number of
//! times instead of silently clobbering.
//!
//! [`ClusterApi`] is the capability; [`KubeConnection`] implements it over
//! the apiserver REST API, and [`fake::FakeCluster`] is an in-memory
//! double for tests.

pub mod connection;
pub mod error;
pub mod fake;
pub mod kubeconfig;
pub mod types;

pub use connection::{ClusterApi, KubeConnection, MAX_UPDATE_ATTEMPTS};
pub use error::{ClusterError, ClusterResult};
pub use kubeconfig::ClusterCredentials;
pub use types::{Container, Deployment, DeploymentList};
