//! Deployment model.
//!
//! A serde view of the apps/v1 Deployment fields gantry actually touches.
//! Every struct carries a flattened `extra` map, so fields we don't model
//! survive the read-modify-write round trip untouched — the apiserver gets
//! back exactly what it sent, minus the one image change.

use std::io::Write;

use gantry_core::render::{CliRender, RenderResult};
use serde::{Deserialize, Serialize};

use crate::error::{ClusterError, ClusterResult};

/// A named, namespaced workload with one or more containers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: DeploymentSpec,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Optimistic-concurrency token; the apiserver rejects a replace
    /// carrying a stale value.
    #[serde(
        rename = "resourceVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_version: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(default)]
    pub template: PodTemplateSpec,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PodTemplateSpec {
    #[serde(default)]
    pub spec: PodSpec,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PodSpec {
    #[serde(default)]
    pub containers: Vec<Container>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One container in the pod template: a name bound to an image reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Read-only aggregate of deployments in a namespace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentList {
    pub deployments: Vec<Deployment>,
}

impl Deployment {
    /// Rewrite the image of the container matching `container` by name.
    /// The first match wins; nothing else in the deployment is touched.
    pub fn set_container_image(&mut self, container: &str, image: &str) -> ClusterResult<()> {
        match self
            .spec
            .template
            .spec
            .containers
            .iter_mut()
            .find(|c| c.name == container)
        {
            Some(matched) => {
                matched.image = image.to_string();
                Ok(())
            }
            None => Err(ClusterError::ContainerNotFound(container.to_string())),
        }
    }
}

impl CliRender for Deployment {
    fn render_cli(&self, out: &mut dyn Write) -> RenderResult<()> {
        writeln!(out, "-------------------------")?;
        writeln!(out, "Deployment: {}", self.metadata.name)?;
        writeln!(out, "  - replicas: {}", self.spec.replicas.unwrap_or(1))?;
        writeln!(out, "  - containers:")?;
        for container in &self.spec.template.spec.containers {
            writeln!(out, "    --name:  {}", container.name)?;
            writeln!(out, "    --image: {}", container.image)?;
        }
        Ok(())
    }
}

impl CliRender for DeploymentList {
    fn render_cli(&self, out: &mut dyn Write) -> RenderResult<()> {
        if self.deployments.is_empty() {
            writeln!(out, "No deployments found")?;
            return Ok(());
        }
        for deployment in &self.deployments {
            deployment.render_cli(out)?;
        }
        Ok(())
    }
}
