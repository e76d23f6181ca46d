//! Error taxonomy shared by storage nodes, the coordinator and the content layer.
//!
//! Nothing in this crate retries or swallows an error: every failure is
//! returned to the immediate caller, which decides what the user sees.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::time::Duration;

use crate::storage::protocol::ErrorResponse;

pub type ClusterResult<T> = Result<T, ClusterError>;

#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    /// Read or delete of a file that does not exist.
    #[error("file {0} not found")]
    NotFound(String),

    /// Local disk failure on a storage node.
    #[error("storage i/o error: {0}")]
    Io(String),

    /// Dial or transport failure talking to a node.
    #[error("connection to {addr} failed: {message}")]
    Connection { addr: String, message: String },

    #[error("node {0} is already a cluster member")]
    DuplicateNode(String),

    #[error("node {0} is not a cluster member")]
    UnknownNode(String),

    /// The call exceeded its budget. Never retried.
    #[error("rpc to {addr} timed out after {timeout:?}")]
    Timeout { addr: String, timeout: Duration },

    /// Lookup against an empty ring.
    #[error("no storage node available")]
    NoAvailableNode,

    /// A membership change aborted mid-migration. The ring has already been
    /// rebuilt; `migrated` files were moved before `key` failed.
    #[error("migration aborted after {migrated} file(s), failed on {key}: {source}")]
    PartialMigrationFailure {
        migrated: usize,
        key: String,
        #[source]
        source: Box<ClusterError>,
    },

    /// Collection id, filename or node address that cannot be stored or routed.
    #[error("invalid key: {0}")]
    InvalidKey(String),
}

impl ClusterError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClusterError::NotFound(_))
    }

    pub fn connection(addr: impl Into<String>, message: impl ToString) -> Self {
        ClusterError::Connection {
            addr: addr.into(),
            message: message.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ClusterError::NotFound(_) | ClusterError::UnknownNode(_) => StatusCode::NOT_FOUND,
            ClusterError::DuplicateNode(_) => StatusCode::CONFLICT,
            ClusterError::InvalidKey(_) => StatusCode::BAD_REQUEST,
            ClusterError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ClusterError::Connection { .. } => StatusCode::BAD_GATEWAY,
            ClusterError::NoAvailableNode => StatusCode::SERVICE_UNAVAILABLE,
            ClusterError::Io(_) | ClusterError::PartialMigrationFailure { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<std::io::Error> for ClusterError {
    fn from(err: std::io::Error) -> Self {
        ClusterError::Io(err.to_string())
    }
}

impl IntoResponse for ClusterError {
    fn into_response(self) -> Response {
        let migrated_file_count = match &self {
            ClusterError::PartialMigrationFailure { migrated, .. } => Some(*migrated),
            _ => None,
        };
        let body = ErrorResponse {
            error: self.to_string(),
            migrated_file_count,
        };
        (self.status_code(), Json(body)).into_response()
    }
}
