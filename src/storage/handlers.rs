use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Extension, Path},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;

use super::disk::NodeStore;
use super::protocol::{
    DeleteResponse, ENDPOINT_FILES, ENDPOINT_HEALTH, HealthResponse, ListFilesResponse,
    WriteResponse,
};
use crate::ring::types::FileKey;

/// Routes of the storage service. Request bodies are unbounded so whole
/// segment files pass through unmodified.
pub fn router(store: Arc<NodeStore>) -> Router {
    Router::new()
        .route(ENDPOINT_FILES, get(handle_list_files))
        .route(
            &format!("{}/:collection/:filename", ENDPOINT_FILES),
            get(handle_read).put(handle_write).delete(handle_delete),
        )
        .route(ENDPOINT_HEALTH, get(handle_health))
        .layer(DefaultBodyLimit::disable())
        .layer(Extension(store))
}

pub async fn handle_write(
    Extension(store): Extension<Arc<NodeStore>>,
    Path((collection_id, filename)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    let key = FileKey::new(collection_id, filename);

    match store.write(&key, &body).await {
        Ok(()) => (StatusCode::OK, Json(WriteResponse { success: true })).into_response(),
        Err(e) => {
            tracing::error!("Failed to write {}: {}", key, e);
            e.into_response()
        }
    }
}

pub async fn handle_read(
    Extension(store): Extension<Arc<NodeStore>>,
    Path((collection_id, filename)): Path<(String, String)>,
) -> Response {
    let key = FileKey::new(collection_id, filename);

    match store.read(&key).await {
        Ok(data) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/octet-stream")],
            data,
        )
            .into_response(),
        Err(e) => {
            if e.is_not_found() {
                tracing::debug!("Read miss for {}", key);
            } else {
                tracing::error!("Failed to read {}: {}", key, e);
            }
            e.into_response()
        }
    }
}

pub async fn handle_delete(
    Extension(store): Extension<Arc<NodeStore>>,
    Path((collection_id, filename)): Path<(String, String)>,
) -> Response {
    let key = FileKey::new(collection_id, filename);

    match store.delete(&key).await {
        Ok(()) => (StatusCode::OK, Json(DeleteResponse { success: true })).into_response(),
        Err(e) => {
            tracing::warn!("Failed to delete {}: {}", key, e);
            e.into_response()
        }
    }
}

pub async fn handle_list_files(Extension(store): Extension<Arc<NodeStore>>) -> Response {
    match store.list_files().await {
        Ok(files) => {
            tracing::debug!("Listing {} files", files.len());
            (StatusCode::OK, Json(ListFilesResponse { files })).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to list files: {}", e);
            e.into_response()
        }
    }
}

pub async fn handle_health() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
        }),
    )
}
