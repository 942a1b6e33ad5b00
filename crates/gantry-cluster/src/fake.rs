//! In-memory ClusterApi double.
//!
//! Behaves like the apiserver for the operations gantry uses: namespaced
//! storage, `resourceVersion` bump on every replace, and rejection of
//! stale replaces with a conflict. Tests can also inject conflicts to
//! simulate a third-party writer racing the read-modify-write.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use crate::connection::ClusterApi;
use crate::error::{ClusterError, ClusterResult};
use crate::types::{Deployment, DeploymentList};

/// In-memory control plane for tests.
#[derive(Default)]
pub struct FakeCluster {
    deployments: Mutex<HashMap<(String, String), Deployment>>,
    inject_conflicts: AtomicU32,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a deployment. Assigns `resourceVersion: "1"` if unset.
    pub fn insert(&self, namespace: &str, mut deployment: Deployment) {
        if deployment.metadata.resource_version.is_none() {
            deployment.metadata.resource_version = Some("1".to_string());
        }
        deployment.metadata.namespace = Some(namespace.to_string());
        let key = (namespace.to_string(), deployment.metadata.name.clone());
        self.deployments.lock().unwrap().insert(key, deployment);
    }

    /// Make the next `n` replaces behave as if another writer got in
    /// between the read and the write: the stored version is bumped and
    /// the replace is rejected with a conflict.
    pub fn inject_conflicts(&self, n: u32) {
        self.inject_conflicts.store(n, Ordering::SeqCst);
    }

    fn bump_version(deployment: &mut Deployment) {
        let next = deployment
            .metadata
            .resource_version
            .as_deref()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0)
            + 1;
        deployment.metadata.resource_version = Some(next.to_string());
    }
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn list_deployments(&self, namespace: &str) -> ClusterResult<DeploymentList> {
        let deployments = self.deployments.lock().unwrap();
        let mut items: Vec<Deployment> = deployments
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, d)| d.clone())
            .collect();
        items.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
        Ok(DeploymentList { deployments: items })
    }

    async fn get_deployment(&self, namespace: &str, name: &str) -> ClusterResult<Deployment> {
        self.deployments
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| ClusterError::NotFound(format!("{namespace}/{name}")))
    }

    async fn replace_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> ClusterResult<Deployment> {
        let key = (namespace.to_string(), deployment.metadata.name.clone());
        let mut deployments = self.deployments.lock().unwrap();
        let stored = deployments
            .get_mut(&key)
            .ok_or_else(|| ClusterError::NotFound(format!("{namespace}/{}", key.1)))?;

        if self.inject_conflicts.load(Ordering::SeqCst) > 0 {
            self.inject_conflicts.fetch_sub(1, Ordering::SeqCst);
            // The racing writer landed first; its replace bumped the version.
            Self::bump_version(stored);
            return Err(ClusterError::Conflict(format!("{namespace}/{}", key.1)));
        }

        if stored.metadata.resource_version != deployment.metadata.resource_version {
            return Err(ClusterError::Conflict(format!("{namespace}/{}", key.1)));
        }

        let mut updated = deployment.clone();
        Self::bump_version(&mut updated);
        *stored = updated.clone();
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::MAX_UPDATE_ATTEMPTS;
    use crate::types::{Container, DeploymentSpec, ObjectMeta, PodSpec, PodTemplateSpec};

    fn deployment(name: &str, containers: &[(&str, &str)]) -> Deployment {
        Deployment {
            metadata: ObjectMeta {
                name: name.to_string(),
                ..Default::default()
            },
            spec: DeploymentSpec {
                replicas: Some(1),
                template: PodTemplateSpec {
                    spec: PodSpec {
                        containers: containers
                            .iter()
                            .map(|(name, image)| Container {
                                name: name.to_string(),
                                image: image.to_string(),
                                ..Default::default()
                            })
                            .collect(),
                        ..Default::default()
                    },
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn list_is_scoped_to_namespace() {
        let cluster = FakeCluster::new();
        cluster.insert("prod", deployment("api", &[("a", "x:1")]));
        cluster.insert("prod", deployment("worker", &[("w", "y:1")]));
        cluster.insert("staging", deployment("api", &[("a", "x:1")]));

        let list = cluster.list_deployments("prod").await.unwrap();
        assert_eq!(list.deployments.len(), 2);
        assert_eq!(list.deployments[0].metadata.name, "api");
        assert_eq!(list.deployments[1].metadata.name, "worker");
    }

    #[tokio::test]
    async fn get_missing_deployment_is_not_found() {
        let cluster = FakeCluster::new();
        let err = cluster.get_deployment("prod", "ghost").await.unwrap_err();
        assert!(matches!(err, ClusterError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_swaps_exactly_one_image() {
        let cluster = FakeCluster::new();
        cluster.insert("prod", deployment("api", &[("a", "x:1"), ("b", "y:1")]));

        let updated = cluster
            .update_deployment_container("prod", "api", "a", "x:2")
            .await
            .unwrap();

        let containers = &updated.spec.template.spec.containers;
        assert_eq!(containers[0].image, "x:2");
        assert_eq!(containers[1].image, "y:1");

        // And the change is visible on a fresh read.
        let fresh = cluster.get_deployment("prod", "api").await.unwrap();
        assert_eq!(fresh.spec.template.spec.containers[0].image, "x:2");
    }

    #[tokio::test]
    async fn update_missing_container_leaves_deployment_unmodified() {
        let cluster = FakeCluster::new();
        cluster.insert("prod", deployment("api", &[("a", "x:1")]));
        let before = cluster.get_deployment("prod", "api").await.unwrap();

        let err = cluster
            .update_deployment_container("prod", "api", "ghost", "x:2")
            .await
            .unwrap_err();
        assert!(matches!(err, ClusterError::ContainerNotFound(_)));

        let after = cluster.get_deployment("prod", "api").await.unwrap();
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn stale_replace_is_a_conflict() {
        let cluster = FakeCluster::new();
        cluster.insert("prod", deployment("api", &[("a", "x:1")]));

        let mut stale = cluster.get_deployment("prod", "api").await.unwrap();
        // Another writer replaces first.
        let fresh = stale.clone();
        cluster.replace_deployment("prod", &fresh).await.unwrap();

        stale.set_container_image("a", "x:2").unwrap();
        let err = cluster.replace_deployment("prod", &stale).await.unwrap_err();
        assert!(matches!(err, ClusterError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_retries_past_transient_conflicts() {
        let cluster = FakeCluster::new();
        cluster.insert("prod", deployment("api", &[("a", "x:1")]));
        cluster.inject_conflicts(MAX_UPDATE_ATTEMPTS - 1);

        let updated = cluster
            .update_deployment_container("prod", "api", "a", "x:2")
            .await
            .unwrap();
        assert_eq!(updated.spec.template.spec.containers[0].image, "x:2");
    }

    #[tokio::test]
    async fn update_gives_up_after_bounded_attempts() {
        let cluster = FakeCluster::new();
        cluster.insert("prod", deployment("api", &[("a", "x:1")]));
        cluster.inject_conflicts(MAX_UPDATE_ATTEMPTS);

        let err = cluster
            .update_deployment_container("prod", "api", "a", "x:2")
            .await
            .unwrap_err();
        assert!(matches!(err, ClusterError::Conflict(_)));
        // All injected conflicts were consumed: exactly MAX attempts ran.
        assert_eq!(cluster.inject_conflicts.load(Ordering::SeqCst), 0);

        // The image never changed.
        let fresh = cluster.get_deployment("prod", "api").await.unwrap();
        assert_eq!(fresh.spec.template.spec.containers[0].image, "x:1");
    }
}
