//! Kubeconfig loading.
//!
//! Resolves the current context of a kubeconfig file (default
//! `$HOME/.kube/config`) into the credentials the connector needs: the
//! apiserver URL, an optional bearer token, and TLS settings. An absent or
//! unusable file is a configuration error — fatal at the CLI boundary.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ClusterError, ClusterResult};

/// Credentials resolved from a kubeconfig's current context.
#[derive(Debug, Clone)]
pub struct ClusterCredentials {
    pub server: String,
    pub token: Option<String>,
    pub ca_file: Option<PathBuf>,
    pub insecure_skip_tls_verify: bool,
    /// Namespace pinned by the context, if any.
    pub namespace: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Kubeconfig {
    #[serde(default)]
    clusters: Vec<NamedCluster>,
    #[serde(default)]
    contexts: Vec<NamedContext>,
    #[serde(default)]
    users: Vec<NamedUser>,
    #[serde(rename = "current-context")]
    current_context: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedCluster {
    name: String,
    cluster: ClusterEntry,
}

#[derive(Debug, Deserialize)]
struct ClusterEntry {
    server: String,
    #[serde(rename = "certificate-authority")]
    certificate_authority: Option<PathBuf>,
    #[serde(rename = "insecure-skip-tls-verify", default)]
    insecure_skip_tls_verify: bool,
}

#[derive(Debug, Deserialize)]
struct NamedContext {
    name: String,
    context: ContextEntry,
}

#[derive(Debug, Deserialize)]
struct ContextEntry {
    cluster: String,
    user: String,
    namespace: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedUser {
    name: String,
    #[serde(default)]
    user: UserEntry,
}

#[derive(Debug, Default, Deserialize)]
struct UserEntry {
    token: Option<String>,
}

/// Default kubeconfig location: `$HOME/.kube/config`.
pub fn default_path() -> ClusterResult<PathBuf> {
    let home = std::env::var_os("HOME")
        .ok_or_else(|| ClusterError::Config("HOME is not set".to_string()))?;
    Ok(PathBuf::from(home).join(".kube").join("config"))
}

/// Load a kubeconfig and resolve its current context.
pub fn load(path: &Path) -> ClusterResult<ClusterCredentials> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ClusterError::Config(format!("could not read kubeconfig {}: {e}", path.display()))
    })?;
    let config: Kubeconfig = serde_yaml::from_str(&content)
        .map_err(|e| ClusterError::Config(format!("could not parse kubeconfig: {e}")))?;
    resolve(&config)
}

fn resolve(config: &Kubeconfig) -> ClusterResult<ClusterCredentials> {
    let context_name = config
        .current_context
        .as_deref()
        .ok_or_else(|| ClusterError::Config("kubeconfig has no current-context".to_string()))?;
    let context = config
        .contexts
        .iter()
        .find(|c| c.name == context_name)
        .map(|c| &c.context)
        .ok_or_else(|| {
            ClusterError::Config(format!("context {context_name:?} not found in kubeconfig"))
        })?;
    let cluster = config
        .clusters
        .iter()
        .find(|c| c.name == context.cluster)
        .map(|c| &c.cluster)
        .ok_or_else(|| {
            ClusterError::Config(format!(
                "cluster {:?} not found in kubeconfig",
                context.cluster
            ))
        })?;
    let token = config
        .users
        .iter()
        .find(|u| u.name == context.user)
        .and_then(|u| u.user.token.clone());

    Ok(ClusterCredentials {
        server: cluster.server.trim_end_matches('/').to_string(),
        token,
        ca_file: cluster.certificate_authority.clone(),
        insecure_skip_tls_verify: cluster.insecure_skip_tls_verify,
        namespace: context.namespace.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
apiVersion: v1
kind: Config
current-context: staging
clusters:
- name: staging-cluster
  cluster:
    server: https://10.0.0.1:6443/
    insecure-skip-tls-verify: true
- name: prod-cluster
  cluster:
    server: https://10.0.0.2:6443
contexts:
- name: staging
  context:
    cluster: staging-cluster
    user: staging-admin
    namespace: staging-ns
users:
- name: staging-admin
  user:
    token: sekrit
"#;

    #[test]
    fn resolves_current_context() {
        let config: Kubeconfig = serde_yaml::from_str(SAMPLE).unwrap();
        let creds = resolve(&config).unwrap();
        assert_eq!(creds.server, "https://10.0.0.1:6443");
        assert_eq!(creds.token.as_deref(), Some("sekrit"));
        assert_eq!(creds.namespace.as_deref(), Some("staging-ns"));
        assert!(creds.insecure_skip_tls_verify);
    }

    #[test]
    fn missing_current_context_is_config_error() {
        let config: Kubeconfig = serde_yaml::from_str("clusters: []\ncontexts: []\n").unwrap();
        assert!(matches!(
            resolve(&config).unwrap_err(),
            ClusterError::Config(_)
        ));
    }

    #[test]
    fn dangling_context_reference_is_config_error() {
        let yaml = r#"
current-context: gone
contexts:
- name: other
  context:
    cluster: c
    user: u
"#;
        let config: Kubeconfig = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            resolve(&config).unwrap_err(),
            ClusterError::Config(_)
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, SAMPLE).unwrap();
        let creds = load(&path).unwrap();
        assert_eq!(creds.server, "https://10.0.0.1:6443");
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let err = load(Path::new("/nonexistent/kubeconfig")).unwrap_err();
        assert!(matches!(err, ClusterError::Config(_)));
    }
}
