//! `gantry deployment` — list, show, and update cluster deployments.

use gantry_cluster::ClusterApi;
use gantry_core::CliRender;

pub async fn list(cluster: &dyn ClusterApi, namespace: &str) -> anyhow::Result<()> {
    let deployments = cluster.list_deployments(namespace).await?;
    deployments.render_cli(&mut std::io::stdout())?;
    Ok(())
}

pub async fn get(cluster: &dyn ClusterApi, namespace: &str, name: &str) -> anyhow::Result<()> {
    let deployment = cluster.get_deployment(namespace, name).await?;
    deployment.render_cli(&mut std::io::stdout())?;
    Ok(())
}

pub async fn update(
    cluster: &dyn ClusterApi,
    namespace: &str,
    name: &str,
    container: &str,
    image: &str,
) -> anyhow::Result<()> {
    let updated = cluster
        .update_deployment_container(namespace, name, container, image)
        .await?;
    println!("Updated {name}");
    updated.render_cli(&mut std::io::stdout())?;
    Ok(())
}
