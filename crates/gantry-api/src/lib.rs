//! gantry-api — REST API for gantry.
//!
//! Routes deployments reads and container-image updates to the cluster
//! connector, and image metadata reads to the active store.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/deployments` | List deployments in a namespace |
//! | GET | `/deployments/{name}` | Get one deployment |
//! | PUT | `/deployments/{name}` | Update one container's image |
//! | GET | `/images/{name}` | All stored records for an image name |
//! | GET | `/images/{name}/{version}` | Records for one version, all days |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use gantry_cluster::ClusterApi;
use gantry_store::ImageStore;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<ImageStore>,
    pub cluster: Arc<dyn ClusterApi>,
    /// Namespace used when a request doesn't name one.
    pub default_namespace: String,
}

/// Build the API router.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/deployments", get(handlers::list_deployments))
        .route(
            "/deployments/{name}",
            get(handlers::get_deployment).put(handlers::update_deployment),
        )
        .route("/images/{name}", get(handlers::get_images))
        .route("/images/{name}/{version}", get(handlers::get_image_version))
        .with_state(state)
}
