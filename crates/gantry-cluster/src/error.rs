//! Error types for the cluster connector.

use thiserror::Error;

/// Result type alias for cluster operations.
pub type ClusterResult<T> = Result<T, ClusterError>;

/// Errors that can occur talking to the control plane.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Transport, auth, or unexpected apiserver failure.
    #[error("connection error: {0}")]
    Connection(String),

    /// The requested deployment does not exist.
    #[error("deployment not found: {0}")]
    NotFound(String),

    /// No container in the deployment matched the requested name.
    #[error("requested container {0:?} couldn't be found")]
    ContainerNotFound(String),

    /// The object changed between our read and our write.
    #[error("conflicting update: {0}")]
    Conflict(String),

    /// Kubeconfig is missing or unusable. Fatal at the CLI boundary.
    #[error("cluster configuration error: {0}")]
    Config(String),
}
