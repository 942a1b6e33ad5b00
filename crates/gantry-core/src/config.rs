//! gantry.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level gantry configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GantryConfig {
    #[serde(default)]
    pub datastore: DatastoreConfig,
    #[serde(default)]
    pub cluster: ClusterConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// `[datastore]` — which storage backend holds image metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatastoreConfig {
    /// Registered backend identifier ("redb" or "etcd").
    #[serde(rename = "type")]
    pub kind: String,
    /// Database file for the embedded backend.
    pub path: Option<PathBuf>,
    /// Endpoints for the distributed backend.
    pub endpoints: Option<Vec<String>>,
}

impl Default for DatastoreConfig {
    fn default() -> Self {
        Self {
            kind: "redb".to_string(),
            path: None,
            endpoints: None,
        }
    }
}

/// `[cluster]` — how to reach the Kubernetes control plane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Namespace used when none is given on the command line.
    pub namespace: String,
    /// Kubeconfig location; defaults to `$HOME/.kube/config`.
    pub kubeconfig: Option<PathBuf>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            kubeconfig: None,
        }
    }
}

/// `[server]` — HTTP API settings for `gantry serve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

impl GantryConfig {
    /// Parse a configuration file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GantryConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from an explicit path, or search the default
    /// locations (`./gantry.toml`, then `$HOME/.gantry.toml`). Falls back
    /// to defaults when no file exists.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        for candidate in Self::search_paths() {
            if candidate.exists() {
                return Self::from_file(&candidate);
            }
        }
        Ok(Self::default())
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("gantry.toml")];
        if let Some(home) = std::env::var_os("HOME") {
            paths.push(PathBuf::from(home).join(".gantry.toml"));
        }
        paths
    }

    /// Database file for the embedded backend, with a sensible default.
    pub fn datastore_path(&self) -> PathBuf {
        self.datastore
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from("gantry.redb"))
    }

    /// Endpoints for the distributed backend, with a local default.
    pub fn datastore_endpoints(&self) -> Vec<String> {
        self.datastore
            .endpoints
            .clone()
            .unwrap_or_else(|| vec!["http://127.0.0.1:2379".to_string()])
    }
}
