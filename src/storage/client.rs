//! Storage Service Clients
//!
//! The coordinator reaches storage nodes only through [`StorageClient`]. Two
//! implementations exist:
//! - [`HttpStorageClient`]: the real transport. No connection pooling, so every call
//!   dials a fresh connection and drops it afterwards. No retries.
//! - [`InProcessClient`]: routes addresses to [`NodeStore`]s living in the same process.

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

use super::disk::NodeStore;
use super::protocol::{
    ENDPOINT_FILES, ENDPOINT_HEALTH, ErrorResponse, ListFilesResponse, endpoint_url, file_url,
};
use crate::error::{ClusterError, ClusterResult};
use crate::ring::types::FileKey;

/// The storage service as seen from the coordinator. `node` is the node address.
/// Every call carries its own budget; exceeding it yields [`ClusterError::Timeout`].
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn write(
        &self,
        node: &str,
        key: &FileKey,
        data: Vec<u8>,
        timeout: Duration,
    ) -> ClusterResult<()>;

    async fn read(&self, node: &str, key: &FileKey, timeout: Duration) -> ClusterResult<Vec<u8>>;

    async fn list_files(&self, node: &str, timeout: Duration) -> ClusterResult<Vec<FileKey>>;

    async fn delete_file(&self, node: &str, key: &FileKey, timeout: Duration)
    -> ClusterResult<()>;
}

pub struct HttpStorageClient {
    http_client: reqwest::Client,
}

impl HttpStorageClient {
    pub fn new() -> ClusterResult<Self> {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| ClusterError::connection("<client>", e))?;

        Ok(Self { http_client })
    }

    /// Calls a node's health endpoint.
    pub async fn health(&self, node: &str, timeout: Duration) -> ClusterResult<()> {
        let response = self
            .http_client
            .get(endpoint_url(node, ENDPOINT_HEALTH)?)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(node, timeout, e))?;

        check_status(node, None, response).await.map(|_| ())
    }
}

#[async_trait]
impl StorageClient for HttpStorageClient {
    async fn write(
        &self,
        node: &str,
        key: &FileKey,
        data: Vec<u8>,
        timeout: Duration,
    ) -> ClusterResult<()> {
        let response = self
            .http_client
            .put(file_url(node, key)?)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(data)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(node, timeout, e))?;

        check_status(node, Some(key), response).await?;
        Ok(())
    }

    async fn read(&self, node: &str, key: &FileKey, timeout: Duration) -> ClusterResult<Vec<u8>> {
        let response = self
            .http_client
            .get(file_url(node, key)?)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(node, timeout, e))?;

        let response = check_status(node, Some(key), response).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(node, timeout, e))?;

        Ok(body.to_vec())
    }

    async fn list_files(&self, node: &str, timeout: Duration) -> ClusterResult<Vec<FileKey>> {
        let response = self
            .http_client
            .get(endpoint_url(node, ENDPOINT_FILES)?)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(node, timeout, e))?;

        let response = check_status(node, None, response).await?;
        let listing: ListFilesResponse = response
            .json()
            .await
            .map_err(|e| transport_error(node, timeout, e))?;

        Ok(listing.files)
    }

    async fn delete_file(
        &self,
        node: &str,
        key: &FileKey,
        timeout: Duration,
    ) -> ClusterResult<()> {
        let response = self
            .http_client
            .delete(file_url(node, key)?)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(node, timeout, e))?;

        check_status(node, Some(key), response).await?;
        Ok(())
    }
}

fn transport_error(node: &str, timeout: Duration, err: reqwest::Error) -> ClusterError {
    if err.is_timeout() {
        ClusterError::Timeout {
            addr: node.to_string(),
            timeout,
        }
    } else {
        ClusterError::connection(node, err)
    }
}

/// Turns a non-success response into the matching [`ClusterError`].
async fn check_status(
    node: &str,
    key: Option<&FileKey>,
    response: reqwest::Response,
) -> ClusterResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status.to_string(),
    };

    Err(match (status, key) {
        (StatusCode::NOT_FOUND, Some(key)) => ClusterError::NotFound(key.canonical()),
        (StatusCode::BAD_REQUEST, _) => ClusterError::InvalidKey(message),
        _ => ClusterError::Io(format!("{} answered {}: {}", node, status, message)),
    })
}

/// Address → store map for nodes hosted inside this process.
///
/// Calls to an unregistered address fail with [`ClusterError::Connection`], the
/// same way an unreachable remote node would.
#[derive(Default)]
pub struct InProcessClient {
    nodes: DashMap<String, Arc<NodeStore>>,
}

impl InProcessClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, node: impl Into<String>, store: Arc<NodeStore>) {
        self.nodes.insert(node.into(), store);
    }

    pub fn unregister(&self, node: &str) -> Option<Arc<NodeStore>> {
        self.nodes.remove(node).map(|(_, store)| store)
    }

    pub fn store(&self, node: &str) -> ClusterResult<Arc<NodeStore>> {
        self.nodes
            .get(node)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ClusterError::connection(node, "no such node"))
    }
}

#[async_trait]
impl StorageClient for InProcessClient {
    async fn write(
        &self,
        node: &str,
        key: &FileKey,
        data: Vec<u8>,
        _timeout: Duration,
    ) -> ClusterResult<()> {
        self.store(node)?.write(key, &data).await
    }

    async fn read(&self, node: &str, key: &FileKey, _timeout: Duration) -> ClusterResult<Vec<u8>> {
        self.store(node)?.read(key).await
    }

    async fn list_files(&self, node: &str, _timeout: Duration) -> ClusterResult<Vec<FileKey>> {
        self.store(node)?.list_files().await
    }

    async fn delete_file(
        &self,
        node: &str,
        key: &FileKey,
        _timeout: Duration,
    ) -> ClusterResult<()> {
        self.store(node)?.delete(key).await
    }
}
