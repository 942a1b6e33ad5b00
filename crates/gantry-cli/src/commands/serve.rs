//! `gantry serve` — run the HTTP API.

use std::net::SocketAddr;
use std::sync::Arc;

use gantry_api::ApiState;
use gantry_cluster::ClusterApi;
use gantry_store::ImageStore;
use tracing::info;

pub async fn run(
    store: Arc<ImageStore>,
    cluster: Arc<dyn ClusterApi>,
    default_namespace: String,
    port: u16,
) -> anyhow::Result<()> {
    let router = gantry_api::build_router(ApiState {
        store,
        cluster,
        default_namespace,
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "API server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl-C.
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install CTRL+C handler");
            info!("shutdown signal received");
        })
        .await?;

    info!("API server stopped");
    Ok(())
}
