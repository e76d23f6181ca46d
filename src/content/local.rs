use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::ContentService;
use crate::error::ClusterResult;
use crate::ring::types::FileKey;
use crate::storage::disk::NodeStore;

/// Content kept under a single local directory, laid out like a storage node.
pub struct LocalContentService {
    store: NodeStore,
}

impl LocalContentService {
    pub fn open(base_dir: impl Into<PathBuf>) -> ClusterResult<Self> {
        Ok(Self {
            store: NodeStore::open(base_dir)?,
        })
    }

    pub fn base_dir(&self) -> &Path {
        self.store.base_dir()
    }
}

#[async_trait]
impl ContentService for LocalContentService {
    async fn read(&self, key: &FileKey) -> ClusterResult<Vec<u8>> {
        self.store.read(key).await
    }

    async fn write(&self, key: &FileKey, data: Vec<u8>) -> ClusterResult<()> {
        self.store.write(key, &data).await
    }

    async fn delete(&self, key: &FileKey) -> ClusterResult<()> {
        self.store.delete(key).await
    }

    async fn list_files(&self, collection_id: &str) -> ClusterResult<Vec<String>> {
        self.store.list_collection(collection_id).await
    }
}
