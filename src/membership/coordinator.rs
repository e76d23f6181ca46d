use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::migration::{gather_draining, gather_inventory, migrate};
use super::types::{Inventory, Topology};
use crate::config::RpcTimeouts;
use crate::error::{ClusterError, ClusterResult};
use crate::ring::types::{FileKey, normalize_address, validate_collection_id};
use crate::storage::client::{HttpStorageClient, StorageClient};

/// Owns the node list and ring, routes content calls and runs membership changes.
///
/// Content calls hold the read lock only while resolving the owner; the RPC runs
/// unlocked. Membership changes hold the write lock for the whole inventory and
/// migration, so no new lookup happens until they finish.
pub struct ClusterCoordinator<C: StorageClient = HttpStorageClient> {
    topology: RwLock<Topology>,
    client: Arc<C>,
    timeouts: RpcTimeouts,
}

impl<C: StorageClient> ClusterCoordinator<C> {
    pub fn new<I, S>(nodes: I, client: Arc<C>, timeouts: RpcTimeouts) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let topology = Topology::new(nodes);
        tracing::info!(
            "Coordinator starting with {} storage node(s)",
            topology.nodes().len()
        );

        Self {
            topology: RwLock::new(topology),
            client,
            timeouts,
        }
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    pub fn timeouts(&self) -> RpcTimeouts {
        self.timeouts
    }

    /// Resolves the owner of `key` under the current ring.
    pub async fn owner_of(&self, key: &FileKey) -> ClusterResult<String> {
        key.validate()?;
        let topology = self.topology.read().await;
        topology.owner_of(key)
    }

    // --- Content operations ---

    pub async fn read(&self, key: &FileKey) -> ClusterResult<Vec<u8>> {
        let owner = self.owner_of(key).await?;
        tracing::debug!("READ {} -> {}", key, owner);

        self.client.read(&owner, key, self.timeouts.read).await
    }

    pub async fn write(&self, key: &FileKey, data: Vec<u8>) -> ClusterResult<()> {
        let owner = self.owner_of(key).await?;
        tracing::debug!("WRITE {} ({} bytes) -> {}", key, data.len(), owner);

        self.client.write(&owner, key, data, self.timeouts.write).await
    }

    pub async fn delete(&self, key: &FileKey) -> ClusterResult<()> {
        let owner = self.owner_of(key).await?;
        tracing::debug!("DELETE {} -> {}", key, owner);

        self.client.delete_file(&owner, key, self.timeouts.read).await
    }

    /// Filenames of one collection, gathered from every node.
    ///
    /// A collection's files may be spread over any number of nodes, so there is
    /// no way around asking all of them.
    pub async fn list_files(&self, collection_id: &str) -> ClusterResult<Vec<String>> {
        validate_collection_id(collection_id)?;
        let nodes = self.topology.read().await.nodes().to_vec();

        let inventory = gather_inventory(self.client.as_ref(), &nodes, self.timeouts.admin).await?;
        Ok(inventory.filenames_in(collection_id))
    }

    // --- Membership operations ---

    /// Current node addresses in ring order.
    pub async fn list_nodes(&self) -> Vec<String> {
        self.topology.read().await.ring().nodes()
    }

    /// Removed nodes that may still hold files.
    pub async fn draining_nodes(&self) -> Vec<String> {
        self.topology.read().await.draining().to_vec()
    }

    /// Adds a node and moves every file the new ring assigns to it.
    ///
    /// Once the inventory succeeded the node is a member, even if the migration
    /// then fails part-way.
    pub async fn add_node(&self, address: &str) -> ClusterResult<usize> {
        let address = normalize_address(address)?;
        let run_id = Uuid::new_v4();
        let mut topology = self.topology.write().await;

        if topology.contains(&address) {
            return Err(ClusterError::DuplicateNode(address));
        }

        tracing::info!(%run_id, "Adding node {}", address);

        let (inventory, reached) = self.inventory(&topology).await?;

        topology.add(&address);

        let migrated = migrate(
            self.client.as_ref(),
            &inventory,
            topology.ring(),
            self.timeouts.admin,
        )
        .await?;
        topology.drained(&reached);

        tracing::info!(
            %run_id,
            "Added node {}, migrated {} file(s), cluster size now {}",
            address,
            migrated,
            topology.nodes().len()
        );
        Ok(migrated)
    }

    /// Removes a node and moves all of its files to their new owners.
    ///
    /// Once the inventory succeeded the node is gone from the ring, even if the
    /// migration then fails part-way. It then stays draining until `rebalance`
    /// or a later membership change has moved its remaining files.
    pub async fn remove_node(&self, address: &str) -> ClusterResult<usize> {
        let address = normalize_address(address)?;
        let run_id = Uuid::new_v4();
        let mut topology = self.topology.write().await;

        if !topology.contains(&address) {
            return Err(ClusterError::UnknownNode(address));
        }

        tracing::info!(%run_id, "Removing node {}", address);

        let (inventory, mut reached) = self.inventory(&topology).await?;

        topology.remove(&address);

        let migrated = migrate(
            self.client.as_ref(),
            &inventory,
            topology.ring(),
            self.timeouts.admin,
        )
        .await?;
        reached.push(address.clone());
        topology.drained(&reached);

        tracing::info!(
            %run_id,
            "Removed node {}, migrated {} file(s), cluster size now {}",
            address,
            migrated,
            topology.nodes().len()
        );
        Ok(migrated)
    }

    /// Moves every file that is not on its owner under the current ring,
    /// including what draining nodes still hold.
    ///
    /// Idempotent: on a balanced cluster it moves nothing. This is how a
    /// membership change that failed mid-migration is finished.
    pub async fn rebalance(&self) -> ClusterResult<usize> {
        let run_id = Uuid::new_v4();
        let mut topology = self.topology.write().await;

        tracing::info!(
            %run_id,
            "Rebalancing {} node(s), {} draining",
            topology.nodes().len(),
            topology.draining().len()
        );

        let (inventory, reached) = self.inventory(&topology).await?;

        let migrated = migrate(
            self.client.as_ref(),
            &inventory,
            topology.ring(),
            self.timeouts.admin,
        )
        .await?;
        topology.drained(&reached);

        tracing::info!(%run_id, "Rebalance moved {} file(s)", migrated);
        Ok(migrated)
    }

    /// Members must all answer; draining nodes are best effort.
    async fn inventory(&self, topology: &Topology) -> ClusterResult<(Inventory, Vec<String>)> {
        let mut inventory =
            gather_inventory(self.client.as_ref(), topology.nodes(), self.timeouts.admin).await?;
        let reached = gather_draining(
            self.client.as_ref(),
            &mut inventory,
            topology.draining(),
            self.timeouts.admin,
        )
        .await;

        Ok((inventory, reached))
    }
}
