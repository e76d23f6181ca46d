//! Migration Procedure
//!
//! Moves files after the ring changes:
//! 1. **Inventory**: scatter `ListFiles` to every node and gather the results.
//! 2. **Diff**: compare where each file physically is against its owner under the new ring.
//! 3. **Move**: for each misplaced file, read from the old node, write to the new one and only
//!    then delete from the old one. A crash between the last two steps leaves a duplicate,
//!    never a loss.
//! 4. **Collapse**: a stray copy of a key its owner already holds is deleted, never written.
//!
//! Files move one at a time and the first failure aborts the run. Nodes that left the ring
//! before their files were moved are inventoried too, until a run empties them.

use futures::future::join_all;
use std::time::Duration;

use super::types::{FileMove, Inventory, MoveAction, plan_moves};
use crate::error::{ClusterError, ClusterResult};
use crate::ring::hash_ring::HashRing;
use crate::storage::client::StorageClient;

/// Lists every node concurrently. Fails with the first node error, in node order.
pub async fn gather_inventory<C>(
    client: &C,
    nodes: &[String],
    timeout: Duration,
) -> ClusterResult<Inventory>
where
    C: StorageClient + ?Sized,
{
    let listings = join_all(nodes.iter().map(|node| async move {
        let files = client.list_files(node, timeout).await;
        (node, files)
    }))
    .await;

    let mut inventory = Inventory::new();
    for (node, files) in listings {
        match files {
            Ok(files) => {
                tracing::debug!("Inventory: {} holds {} file(s)", node, files.len());
                inventory.record(node.clone(), files);
            }
            Err(e) => {
                tracing::error!("Inventory of {} failed: {}", node, e);
                return Err(e);
            }
        }
    }

    Ok(inventory)
}

/// Adds nodes that are leaving the ring to `inventory`.
///
/// An unreachable draining node is skipped and stays draining, so a dead node
/// cannot block the cluster. Returns the nodes that answered.
pub async fn gather_draining<C>(
    client: &C,
    inventory: &mut Inventory,
    draining: &[String],
    timeout: Duration,
) -> Vec<String>
where
    C: StorageClient + ?Sized,
{
    let mut reached = Vec::new();

    for node in draining {
        match client.list_files(node, timeout).await {
            Ok(files) => {
                tracing::info!("Draining node {} still holds {} file(s)", node, files.len());
                inventory.record(node.clone(), files);
                reached.push(node.clone());
            }
            Err(e) => tracing::warn!("Draining node {} unreachable, skipping: {}", node, e),
        }
    }

    reached
}

/// Plans and executes every move needed to make `inventory` agree with `ring`.
///
/// Returns the number of files moved. Any failure, including a key with no
/// owner, is reported as [`ClusterError::PartialMigrationFailure`].
pub async fn migrate<C>(
    client: &C,
    inventory: &Inventory,
    ring: &HashRing,
    timeout: Duration,
) -> ClusterResult<usize>
where
    C: StorageClient + ?Sized,
{
    let moves = plan_moves(inventory, ring).map_err(|(key, e)| {
        tracing::error!("No owner for {}: {}", key, e);
        ClusterError::PartialMigrationFailure {
            migrated: 0,
            key: key.canonical(),
            source: Box::new(e),
        }
    })?;

    tracing::info!(
        "{} of {} inventoried file(s) need to move",
        moves.len(),
        inventory.file_count()
    );

    execute_moves(client, &moves, timeout).await
}

pub async fn execute_moves<C>(
    client: &C,
    moves: &[FileMove],
    timeout: Duration,
) -> ClusterResult<usize>
where
    C: StorageClient + ?Sized,
{
    let mut migrated = 0;

    for file_move in moves {
        match file_move.action {
            MoveAction::Transfer => tracing::info!(
                "Migrating {} from {} to {}",
                file_move.key,
                file_move.from,
                file_move.to
            ),
            MoveAction::DropStray => tracing::info!(
                "Dropping stray copy of {} on {}, {} holds the owned copy",
                file_move.key,
                file_move.from,
                file_move.to
            ),
        }

        if let Err(e) = move_file(client, file_move, timeout).await {
            tracing::error!(
                "Migration aborted after {} file(s): moving {} from {} to {} failed: {}",
                migrated,
                file_move.key,
                file_move.from,
                file_move.to,
                e
            );
            return Err(ClusterError::PartialMigrationFailure {
                migrated,
                key: file_move.key.canonical(),
                source: Box::new(e),
            });
        }

        migrated += 1;
    }

    Ok(migrated)
}

/// Read, write, then delete. The source copy is only removed once the
/// destination acknowledged the write.
async fn move_file<C>(client: &C, file_move: &FileMove, timeout: Duration) -> ClusterResult<()>
where
    C: StorageClient + ?Sized,
{
    if file_move.action == MoveAction::DropStray {
        return client
            .delete_file(&file_move.from, &file_move.key, timeout)
            .await;
    }

    let data = client.read(&file_move.from, &file_move.key, timeout).await?;
    client
        .write(&file_move.to, &file_move.key, data, timeout)
        .await?;
    client
        .delete_file(&file_move.from, &file_move.key, timeout)
        .await
}
