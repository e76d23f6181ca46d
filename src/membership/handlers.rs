use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;

use super::coordinator::ClusterCoordinator;
use super::protocol::{
    ENDPOINT_NODES, ENDPOINT_REBALANCE, ENDPOINT_REMOVE_NODE, ListNodesResponse,
    MigrationResponse, NodeRequest,
};
use crate::error::ClusterResult;
use crate::storage::client::StorageClient;

/// Admin routes of the coordinator.
pub fn admin_router<C>(coordinator: Arc<ClusterCoordinator<C>>) -> Router
where
    C: StorageClient + 'static,
{
    Router::new()
        .route(
            ENDPOINT_NODES,
            get(handle_list_nodes::<C>).post(handle_add_node::<C>),
        )
        .route(ENDPOINT_REMOVE_NODE, post(handle_remove_node::<C>))
        .route(ENDPOINT_REBALANCE, post(handle_rebalance::<C>))
        .layer(Extension(coordinator))
}

pub async fn handle_list_nodes<C>(
    Extension(coordinator): Extension<Arc<ClusterCoordinator<C>>>,
) -> (StatusCode, Json<ListNodesResponse>)
where
    C: StorageClient + 'static,
{
    let nodes = coordinator.list_nodes().await;
    let draining = coordinator.draining_nodes().await;
    (StatusCode::OK, Json(ListNodesResponse { nodes, draining }))
}

pub async fn handle_add_node<C>(
    Extension(coordinator): Extension<Arc<ClusterCoordinator<C>>>,
    Json(req): Json<NodeRequest>,
) -> Response
where
    C: StorageClient + 'static,
{
    let result = coordinator.add_node(&req.address).await;
    migration_response("add node", &req.address, result)
}

pub async fn handle_remove_node<C>(
    Extension(coordinator): Extension<Arc<ClusterCoordinator<C>>>,
    Json(req): Json<NodeRequest>,
) -> Response
where
    C: StorageClient + 'static,
{
    let result = coordinator.remove_node(&req.address).await;
    migration_response("remove node", &req.address, result)
}

pub async fn handle_rebalance<C>(
    Extension(coordinator): Extension<Arc<ClusterCoordinator<C>>>,
) -> Response
where
    C: StorageClient + 'static,
{
    let result = coordinator.rebalance().await;
    migration_response("rebalance", "cluster", result)
}

fn migration_response(op: &str, target: &str, result: ClusterResult<usize>) -> Response {
    match result {
        Ok(migrated_file_count) => (
            StatusCode::OK,
            Json(MigrationResponse {
                migrated_file_count,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to {} {}: {}", op, target, e);
            e.into_response()
        }
    }
}
