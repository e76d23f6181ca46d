//! Storage Network Protocol
//!
//! Defines the endpoints and Data Transfer Objects (DTOs) of the storage service that
//! every node exposes to the coordinator.
//!
//! File contents travel as raw `application/octet-stream` bodies. Everything else is JSON.

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{ClusterError, ClusterResult};
use crate::ring::types::FileKey;

// --- API Endpoints ---

/// Write (`PUT`), read (`GET`) and delete (`DELETE`) live under `/storage/files/{collection}/{file}`.
/// A bare `GET` on this path lists every file on the node.
pub const ENDPOINT_FILES: &str = "/storage/files";
/// Liveness check.
pub const ENDPOINT_HEALTH: &str = "/storage/health";

// --- Data Transfer Objects ---

#[derive(Debug, Serialize, Deserialize)]
pub struct WriteResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// Full inventory of one node.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListFilesResponse {
    pub files: Vec<FileKey>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Body of every non-success response, on both the storage and the admin service.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Set when a membership change failed part-way through its migration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrated_file_count: Option<usize>,
}

/// `http://<node>` as a base URL.
pub fn node_base_url(node: &str) -> ClusterResult<Url> {
    Url::parse(&format!("http://{}", node)).map_err(|e| ClusterError::connection(node, e))
}

/// URL of one file on one node, with both key parts percent-encoded.
pub fn file_url(node: &str, key: &FileKey) -> ClusterResult<Url> {
    let mut url = node_base_url(node)?;
    url.path_segments_mut()
        .map_err(|_| ClusterError::connection(node, "address cannot be a base URL"))?
        .pop_if_empty()
        .extend([
            "storage",
            "files",
            key.collection_id.as_str(),
            key.filename.as_str(),
        ]);
    Ok(url)
}

/// URL of a fixed endpoint on one node.
pub fn endpoint_url(node: &str, endpoint: &str) -> ClusterResult<Url> {
    node_base_url(node)?
        .join(endpoint)
        .map_err(|e| ClusterError::connection(node, e))
}
