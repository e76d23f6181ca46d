//! Content Service Module
//!
//! The byte-blob interface the upper layers program against: `read`, `write`, `delete` and
//! `list_files`, all addressed by `(collection-id, filename)`.
//!
//! ## Variants
//! - **Local**: every file in one directory on this machine ([`local::LocalContentService`]).
//! - **Cluster**: files spread over storage nodes by the hash ring, through the coordinator.
//!
//! The variant is picked once from [`ContentBackend`] by [`build`]; callers only ever see
//! `Arc<dyn ContentService>`.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{ContentBackend, RpcTimeouts};
use crate::error::ClusterResult;
use crate::membership::coordinator::ClusterCoordinator;
use crate::ring::types::FileKey;
use crate::storage::client::HttpStorageClient;

pub mod cluster;
pub mod local;


#[async_trait]
pub trait ContentService: Send + Sync {
    async fn read(&self, key: &FileKey) -> ClusterResult<Vec<u8>>;

    /// Creates or overwrites the file.
    async fn write(&self, key: &FileKey, data: Vec<u8>) -> ClusterResult<()>;

    async fn delete(&self, key: &FileKey) -> ClusterResult<()>;

    /// Sorted filenames of one collection. Empty for an unknown collection.
    async fn list_files(&self, collection_id: &str) -> ClusterResult<Vec<String>>;
}

/// Builds the content service selected at startup.
pub fn build(
    backend: &ContentBackend,
    timeouts: RpcTimeouts,
) -> ClusterResult<Arc<dyn ContentService>> {
    match backend {
        ContentBackend::Local { base_dir } => {
            tracing::info!("Content backend: local directory {}", base_dir.display());
            Ok(Arc::new(local::LocalContentService::open(base_dir.clone())?))
        }
        ContentBackend::Cluster { nodes } => {
            tracing::info!("Content backend: cluster of {} node(s)", nodes.len());
            let client = Arc::new(HttpStorageClient::new()?);
            Ok(Arc::new(ClusterCoordinator::new(nodes, client, timeouts)))
        }
    }
}

/// Writes the outputs of one upload (a manifest plus its segments) one file at a time.
///
/// Not atomic: the first failure is returned and files written before it stay in place.
/// Returns the number of files written.
pub async fn publish_outputs<I>(
    service: &dyn ContentService,
    collection_id: &str,
    outputs: I,
) -> ClusterResult<usize>
where
    I: IntoIterator<Item = (String, Vec<u8>)>,
{
    let mut written = 0;

    for (filename, data) in outputs {
        let key = FileKey::new(collection_id, filename);
        if let Err(e) = service.write(&key, data).await {
            tracing::warn!(
                "Publishing {} stopped after {} file(s): {} failed: {}",
                collection_id,
                written,
                key,
                e
            );
            return Err(e);
        }
        written += 1;
    }

    tracing::info!("Published {} file(s) to {}", written, collection_id);
    Ok(written)
}
