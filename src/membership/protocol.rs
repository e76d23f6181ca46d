//! Admin Protocol
//!
//! Endpoints and DTOs of the coordinator's membership surface. Every mutating call
//! answers with the number of files it moved; a failed migration still reports how
//! far it got through [`ErrorResponse::migrated_file_count`].

use serde::{Deserialize, Serialize};

pub use crate::storage::protocol::ErrorResponse;

// --- API Endpoints ---

/// `GET` lists members in ring order, `POST` adds one.
pub const ENDPOINT_NODES: &str = "/admin/nodes";
pub const ENDPOINT_REMOVE_NODE: &str = "/admin/nodes/remove";
/// Moves misplaced files under the current ring without touching membership.
pub const ENDPOINT_REBALANCE: &str = "/admin/rebalance";

// --- Data Transfer Objects ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRequest {
    /// `host:port` of the storage node.
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListNodesResponse {
    /// Members in ring order.
    pub nodes: Vec<String>,
    /// Removed nodes whose files have not all been moved yet.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub draining: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationResponse {
    pub migrated_file_count: usize,
}
