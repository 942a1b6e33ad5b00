//! REST API handlers.
//!
//! Success bodies are the entity's wire rendering; errors map onto status
//! codes by kind: validation 400, missing things 404, conflicting update
//! 409, store failure 500, cluster transport failure 502.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use gantry_core::WireRender;

use gantry_cluster::ClusterError;
use gantry_store::{ImageRecordList, StoreError};

use crate::ApiState;

/// Error body for non-2xx responses.
#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, msg: String) -> Response {
    (status, Json(ErrorBody { error: msg })).into_response()
}

fn store_error(err: StoreError) -> Response {
    let status = match &err {
        StoreError::Validation(_) => StatusCode::BAD_REQUEST,
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, err.to_string())
}

fn cluster_error(err: ClusterError) -> Response {
    let status = match &err {
        ClusterError::NotFound(_) | ClusterError::ContainerNotFound(_) => StatusCode::NOT_FOUND,
        ClusterError::Conflict(_) => StatusCode::CONFLICT,
        ClusterError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ClusterError::Connection(_) => StatusCode::BAD_GATEWAY,
    };
    error_response(status, err.to_string())
}

fn wire_response<T: WireRender>(entity: &T) -> Response {
    match entity.render_wire() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// Optional `?namespace=` on deployment routes.
#[derive(serde::Deserialize, Default)]
pub struct NamespaceQuery {
    pub namespace: Option<String>,
}

impl NamespaceQuery {
    fn resolve(&self, state: &ApiState) -> String {
        self.namespace
            .clone()
            .unwrap_or_else(|| state.default_namespace.clone())
    }
}

// ── Deployments ────────────────────────────────────────────────

/// GET /deployments
pub async fn list_deployments(
    State(state): State<ApiState>,
    Query(query): Query<NamespaceQuery>,
) -> Response {
    let namespace = query.resolve(&state);
    match state.cluster.list_deployments(&namespace).await {
        Ok(list) => wire_response(&list),
        Err(e) => cluster_error(e),
    }
}

/// GET /deployments/{name}
pub async fn get_deployment(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Query(query): Query<NamespaceQuery>,
) -> Response {
    let namespace = query.resolve(&state);
    match state.cluster.get_deployment(&namespace, &name).await {
        Ok(deployment) => wire_response(&deployment),
        Err(e) => cluster_error(e),
    }
}

/// Body of PUT /deployments/{name}: which container gets which image.
#[derive(serde::Deserialize)]
pub struct UpdateDeploymentRequest {
    pub container: String,
    pub image: String,
}

/// PUT /deployments/{name}
pub async fn update_deployment(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Query(query): Query<NamespaceQuery>,
    Json(req): Json<UpdateDeploymentRequest>,
) -> Response {
    let namespace = query.resolve(&state);
    match state
        .cluster
        .update_deployment_container(&namespace, &name, &req.container, &req.image)
        .await
    {
        Ok(updated) => wire_response(&updated),
        Err(e) => cluster_error(e),
    }
}

// ── Images ─────────────────────────────────────────────────────

/// GET /images/{name}
pub async fn get_images(State(state): State<ApiState>, Path(name): Path<String>) -> Response {
    match state.store.list(&name).await {
        Ok(list) => wire_response(&list),
        Err(e) => store_error(e),
    }
}

/// GET /images/{name}/{version}
pub async fn get_image_version(
    State(state): State<ApiState>,
    Path((name, version)): Path<(String, String)>,
) -> Response {
    match state.store.list(&name).await {
        Ok(list) => {
            let images: Vec<_> = list
                .images
                .into_iter()
                .filter(|record| record.version == version)
                .collect();
            if images.is_empty() {
                return error_response(
                    StatusCode::NOT_FOUND,
                    format!("no records for {name}:{version}"),
                );
            }
            wire_response(&ImageRecordList { images })
        }
        Err(e) => store_error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use gantry_cluster::fake::FakeCluster;
    use gantry_cluster::ClusterApi;
    use gantry_cluster::types::{
        Container, Deployment, DeploymentSpec, ObjectMeta, PodSpec, PodTemplateSpec,
    };
    use gantry_store::{ImageStore, RedbBackend};

    fn test_deployment(name: &str, container: &str, image: &str) -> Deployment {
        Deployment {
            metadata: ObjectMeta {
                name: name.to_string(),
                ..Default::default()
            },
            spec: DeploymentSpec {
                replicas: Some(1),
                template: PodTemplateSpec {
                    spec: PodSpec {
                        containers: vec![Container {
                            name: container.to_string(),
                            image: image.to_string(),
                            ..Default::default()
                        }],
                        ..Default::default()
                    },
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn test_state() -> (ApiState, Arc<FakeCluster>) {
        let cluster = Arc::new(FakeCluster::new());
        let state = ApiState {
            store: Arc::new(ImageStore::new(Box::new(RedbBackend::open_in_memory().unwrap()))),
            cluster: cluster.clone(),
            default_namespace: "default".to_string(),
        };
        (state, cluster)
    }

    #[tokio::test]
    async fn list_deployments_empty_namespace() {
        let (state, _) = test_state();
        let resp = list_deployments(State(state), Query(NamespaceQuery::default())).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn get_deployment_found_and_missing() {
        let (state, cluster) = test_state();
        cluster.insert("default", test_deployment("api", "a", "x:1"));

        let resp = get_deployment(
            State(state.clone()),
            Path("api".to_string()),
            Query(NamespaceQuery::default()),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = get_deployment(
            State(state),
            Path("ghost".to_string()),
            Query(NamespaceQuery::default()),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn namespace_query_overrides_default() {
        let (state, cluster) = test_state();
        cluster.insert("staging", test_deployment("api", "a", "x:1"));

        let resp = get_deployment(
            State(state.clone()),
            Path("api".to_string()),
            Query(NamespaceQuery::default()),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = get_deployment(
            State(state),
            Path("api".to_string()),
            Query(NamespaceQuery {
                namespace: Some("staging".to_string()),
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn update_deployment_swaps_image() {
        let (state, cluster) = test_state();
        cluster.insert("default", test_deployment("api", "a", "x:1"));

        let resp = update_deployment(
            State(state),
            Path("api".to_string()),
            Query(NamespaceQuery::default()),
            Json(UpdateDeploymentRequest {
                container: "a".to_string(),
                image: "x:2".to_string(),
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let fresh = cluster.get_deployment("default", "api").await.unwrap();
        assert_eq!(fresh.spec.template.spec.containers[0].image, "x:2");
    }

    #[tokio::test]
    async fn update_deployment_missing_container_is_404() {
        let (state, cluster) = test_state();
        cluster.insert("default", test_deployment("api", "a", "x:1"));

        let resp = update_deployment(
            State(state),
            Path("api".to_string()),
            Query(NamespaceQuery::default()),
            Json(UpdateDeploymentRequest {
                container: "ghost".to_string(),
                image: "x:2".to_string(),
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn get_images_returns_stored_records() {
        let (state, _) = test_state();
        state
            .store
            .store("my-api:v1", serde_json::json!({"commit": "abc"}))
            .await
            .unwrap();

        let resp = get_images(State(state.clone()), Path("my-api".to_string())).await;
        assert_eq!(resp.status(), StatusCode::OK);

        // Unknown names still render an empty list, not an error.
        let resp = get_images(State(state), Path("unknown".to_string())).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn get_image_version_filters_and_404s() {
        let (state, _) = test_state();
        state
            .store
            .store("my-api:v1", serde_json::json!({}))
            .await
            .unwrap();
        state
            .store
            .store("my-api:v2", serde_json::json!({}))
            .await
            .unwrap();

        let resp = get_image_version(
            State(state.clone()),
            Path(("my-api".to_string(), "v1".to_string())),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = get_image_version(
            State(state),
            Path(("my-api".to_string(), "v9".to_string())),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
