use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::config::dedup_nodes;
use crate::error::{ClusterError, ClusterResult};
use crate::ring::hash_ring::HashRing;
use crate::ring::types::FileKey;

/// The authoritative node list and the ring built from it.
///
/// Only ever changed as a whole, so the two can never disagree. Removed nodes stay in
/// `draining` until a migration has emptied them; they own no keys but are still
/// inventoried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    nodes: Vec<String>,
    ring: HashRing,
    draining: Vec<String>,
}

impl Topology {
    pub fn new<I, S>(nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let nodes = dedup_nodes(nodes);
        let ring = HashRing::build(&nodes);
        Self {
            nodes,
            ring,
            draining: Vec::new(),
        }
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn ring(&self) -> &HashRing {
        &self.ring
    }

    /// Former members that may still hold files.
    pub fn draining(&self) -> &[String] {
        &self.draining
    }

    pub fn contains(&self, node: &str) -> bool {
        self.nodes.iter().any(|member| member == node)
    }

    pub fn owner_of(&self, key: &FileKey) -> ClusterResult<String> {
        self.ring.lookup(key).map(str::to_string)
    }

    /// Appends a node and rebuilds the ring. A draining node rejoins as a member.
    pub fn add(&mut self, node: &str) {
        self.draining.retain(|leaving| leaving != node);
        self.nodes.push(node.to_string());
        self.ring = HashRing::build(&self.nodes);
    }

    /// Drops a node, rebuilds the ring and marks the node draining.
    pub fn remove(&mut self, node: &str) {
        self.nodes.retain(|member| member != node);
        if !self.draining.iter().any(|leaving| leaving == node) {
            self.draining.push(node.to_string());
        }
        self.ring = HashRing::build(&self.nodes);
    }

    /// Forgets draining nodes that a completed migration has emptied.
    pub fn drained<S: AsRef<str>>(&mut self, nodes: &[S]) {
        self.draining
            .retain(|leaving| !nodes.iter().any(|node| node.as_ref() == leaving));
    }
}

/// Which files each node physically holds, gathered right before a migration.
///
/// Never persisted. A key found on several nodes appears under each of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    holdings: BTreeMap<String, Vec<FileKey>>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, node: impl Into<String>, files: Vec<FileKey>) {
        self.holdings.entry(node.into()).or_default().extend(files);
    }

    pub fn holdings(&self) -> &BTreeMap<String, Vec<FileKey>> {
        &self.holdings
    }

    pub fn files_on(&self, node: &str) -> &[FileKey] {
        self.holdings.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn file_count(&self) -> usize {
        self.holdings.values().map(Vec::len).sum()
    }

    /// Filenames of one collection across every node, sorted and deduplicated.
    pub fn filenames_in(&self, collection_id: &str) -> Vec<String> {
        let mut filenames: Vec<String> = self
            .holdings
            .values()
            .flatten()
            .filter(|key| key.collection_id == collection_id)
            .map(|key| key.filename.clone())
            .collect();
        filenames.sort();
        filenames.dedup();
        filenames
    }
}

/// What happens to one misplaced copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveAction {
    /// Read from `from`, write to `to`, then delete from `from`.
    Transfer,
    /// The owner has, or is being sent, the key; only delete the copy on `from`.
    DropStray,
}

/// One copy that must leave `from`; `to` is the key's owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMove {
    pub key: FileKey,
    pub from: String,
    pub to: String,
    pub action: MoveAction,
}

/// Diffs physical placement against the ring: every held copy whose owner
/// under `ring` is not the node holding it must go.
///
/// The owner's copy always wins. A key the owner lacks is transferred from the
/// first holder in node order, and every other stray copy is only dropped, so
/// a leftover from an interrupted move never overwrites newer data.
///
/// Fails with the first key that has no owner (empty ring).
pub fn plan_moves(
    inventory: &Inventory,
    ring: &HashRing,
) -> Result<Vec<FileMove>, (FileKey, ClusterError)> {
    let mut misplaced = Vec::new();
    let mut placed: HashSet<&FileKey> = HashSet::new();

    for (node, files) in inventory.holdings() {
        for key in files {
            let owner = ring.lookup(key).map_err(|e| (key.clone(), e))?;
            if owner == node {
                placed.insert(key);
            } else {
                misplaced.push((key, node, owner));
            }
        }
    }

    let moves = misplaced
        .into_iter()
        .map(|(key, from, owner)| FileMove {
            key: key.clone(),
            from: from.clone(),
            to: owner.to_string(),
            action: if placed.insert(key) {
                MoveAction::Transfer
            } else {
                MoveAction::DropStray
            },
        })
        .collect();

    Ok(moves)
}
