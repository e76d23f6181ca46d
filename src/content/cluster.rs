use async_trait::async_trait;

use super::ContentService;
use crate::error::ClusterResult;
use crate::membership::coordinator::ClusterCoordinator;
use crate::ring::types::FileKey;
use crate::storage::client::StorageClient;

#[async_trait]
impl<C> ContentService for ClusterCoordinator<C>
where
    C: StorageClient + 'static,
{
    async fn read(&self, key: &FileKey) -> ClusterResult<Vec<u8>> {
        ClusterCoordinator::read(self, key).await
    }

    async fn write(&self, key: &FileKey, data: Vec<u8>) -> ClusterResult<()> {
        ClusterCoordinator::write(self, key, data).await
    }

    async fn delete(&self, key: &FileKey) -> ClusterResult<()> {
        ClusterCoordinator::delete(self, key).await
    }

    async fn list_files(&self, collection_id: &str) -> ClusterResult<Vec<String>> {
        ClusterCoordinator::list_files(self, collection_id).await
    }
}
