//! ClusterApi capability and the real apiserver connection.
//!
//! The container-image update is defined once, on the trait, as a provided
//! method: get, rewrite locally, replace. Any transport (real or fake)
//! gets identical read-modify-write and conflict-retry behavior.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::error::{ClusterError, ClusterResult};
use crate::kubeconfig::ClusterCredentials;
use crate::types::{Deployment, DeploymentList};

/// How many times the read-modify-write sequence is attempted before a
/// conflict propagates to the caller.
pub const MAX_UPDATE_ATTEMPTS: u32 = 3;

/// Capability over a live control-plane connection.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// All deployments in the namespace, freshly read.
    async fn list_deployments(&self, namespace: &str) -> ClusterResult<DeploymentList>;

    /// One deployment by name, or `NotFound`.
    async fn get_deployment(&self, namespace: &str, name: &str) -> ClusterResult<Deployment>;

    /// Submit a whole modified deployment back to the control plane. The
    /// carried `resourceVersion` must match the server's current one or
    /// the replace fails with `Conflict`.
    async fn replace_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> ClusterResult<Deployment>;

    /// Read-modify-write: fetch the deployment, rewrite the image of the
    /// named container (first name match wins), and replace the object.
    /// A `Conflict` from a concurrent writer restarts the whole sequence,
    /// up to [`MAX_UPDATE_ATTEMPTS`] times.
    async fn update_deployment_container(
        &self,
        namespace: &str,
        deployment_name: &str,
        container_name: &str,
        new_image: &str,
    ) -> ClusterResult<Deployment> {
        let mut attempt = 1;
        loop {
            let mut deployment = self.get_deployment(namespace, deployment_name).await?;
            deployment.set_container_image(container_name, new_image)?;
            match self.replace_deployment(namespace, &deployment).await {
                Ok(updated) => {
                    debug!(
                        namespace,
                        deployment = deployment_name,
                        container = container_name,
                        image = new_image,
                        attempt,
                        "container image updated"
                    );
                    return Ok(updated);
                }
                Err(ClusterError::Conflict(reason)) if attempt < MAX_UPDATE_ATTEMPTS => {
                    warn!(
                        namespace,
                        deployment = deployment_name,
                        attempt,
                        reason,
                        "deployment changed underneath us, retrying"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Live connection to a Kubernetes apiserver.
#[derive(Debug)]
pub struct KubeConnection {
    http: reqwest::Client,
    base: String,
    token: Option<String>,
}

impl KubeConnection {
    /// Build a connection from resolved kubeconfig credentials. Fails if
    /// the TLS material can't be loaded — a broken local setup, fatal for
    /// the caller.
    pub fn connect(credentials: &ClusterCredentials) -> ClusterResult<Self> {
        let mut builder = reqwest::Client::builder();
        if credentials.insecure_skip_tls_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }
        if let Some(ca_file) = &credentials.ca_file {
            let pem = std::fs::read(ca_file).map_err(|e| {
                ClusterError::Config(format!("could not read CA file {}: {e}", ca_file.display()))
            })?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| ClusterError::Config(format!("invalid CA certificate: {e}")))?;
            builder = builder.add_root_certificate(cert);
        }
        let http = builder
            .build()
            .map_err(|e| ClusterError::Config(format!("could not build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base: credentials.server.clone(),
            token: credentials.token.clone(),
        })
    }

    fn deployments_url(&self, namespace: &str) -> String {
        format!("{}/apis/apps/v1/namespaces/{namespace}/deployments", self.base)
    }

    fn request(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
        subject: &str,
    ) -> ClusterResult<T> {
        let status = resp.status();
        if status.is_success() {
            return resp
                .json::<T>()
                .await
                .map_err(|e| ClusterError::Connection(format!("decoding {subject}: {e}")));
        }
        let body = resp.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => ClusterError::NotFound(subject.to_string()),
            StatusCode::CONFLICT => ClusterError::Conflict(subject.to_string()),
            _ => ClusterError::Connection(format!("{subject}: HTTP {status}: {body}")),
        })
    }
}

/// Wire shape of the apiserver's list response.
#[derive(serde::Deserialize)]
struct ApiList {
    #[serde(default)]
    items: Vec<Deployment>,
}

#[async_trait]
impl ClusterApi for KubeConnection {
    async fn list_deployments(&self, namespace: &str) -> ClusterResult<DeploymentList> {
        let resp = self
            .request(self.http.get(self.deployments_url(namespace)))
            .send()
            .await
            .map_err(|e| ClusterError::Connection(e.to_string()))?;
        let list: ApiList = Self::parse(resp, &format!("deployments in {namespace}")).await?;
        Ok(DeploymentList {
            deployments: list.items,
        })
    }

    async fn get_deployment(&self, namespace: &str, name: &str) -> ClusterResult<Deployment> {
        let url = format!("{}/{name}", self.deployments_url(namespace));
        let resp = self
            .request(self.http.get(url))
            .send()
            .await
            .map_err(|e| ClusterError::Connection(e.to_string()))?;
        Self::parse(resp, &format!("{namespace}/{name}")).await
    }

    async fn replace_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> ClusterResult<Deployment> {
        let name = &deployment.metadata.name;
        let url = format!("{}/{name}", self.deployments_url(namespace));
        let resp = self
            .request(self.http.put(url).json(deployment))
            .send()
            .await
            .map_err(|e| ClusterError::Connection(e.to_string()))?;
        Self::parse(resp, &format!("{namespace}/{name}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(server: &str) -> ClusterCredentials {
        ClusterCredentials {
            server: server.to_string(),
            token: Some("tok".to_string()),
            ca_file: None,
            insecure_skip_tls_verify: false,
            namespace: None,
        }
    }

    #[test]
    fn builds_namespaced_urls() {
        let conn = KubeConnection::connect(&credentials("https://api.example:6443")).unwrap();
        assert_eq!(
            conn.deployments_url("prod"),
            "https://api.example:6443/apis/apps/v1/namespaces/prod/deployments"
        );
    }

    #[test]
    fn missing_ca_file_is_config_error() {
        let mut creds = credentials("https://api.example:6443");
        creds.ca_file = Some("/nonexistent/ca.crt".into());
        assert!(matches!(
            KubeConnection::connect(&creds).unwrap_err(),
            ClusterError::Config(_)
        ));
    }
}
