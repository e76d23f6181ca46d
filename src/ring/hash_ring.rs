use sha2::{Digest, Sha256};
use std::collections::HashMap;

use super::types::FileKey;
use crate::error::{ClusterError, ClusterResult};

/// Hashes a string onto the ring: SHA-256, first 8 bytes read big-endian.
pub fn ring_position(value: &str) -> u64 {
    let digest = Sha256::digest(value.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head)
}

/// One position per node, sorted ascending, plus the way back from position to node.
///
/// Two addresses hashing to the same position are not separated: the one built
/// last keeps the position and the other receives no keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashRing {
    positions: Vec<u64>,
    owners: HashMap<u64, String>,
}

impl HashRing {
    pub fn build<I, S>(nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut positions = Vec::new();
        let mut owners = HashMap::new();

        for node in nodes {
            let node = node.as_ref();
            let position = ring_position(node);
            if owners.insert(position, node.to_string()).is_none() {
                positions.push(position);
            } else {
                tracing::warn!("Ring position collision at {} (now owned by {})", position, node);
            }
        }

        positions.sort_unstable();

        Self { positions, owners }
    }

    pub fn lookup(&self, key: &FileKey) -> ClusterResult<&str> {
        self.lookup_position(ring_position(&key.canonical()))
    }

    /// Owner of an arbitrary hash: first position `>= hash`, wrapping to index 0.
    pub fn lookup_position(&self, hash: u64) -> ClusterResult<&str> {
        if self.positions.is_empty() {
            return Err(ClusterError::NoAvailableNode);
        }

        let mut idx = self.positions.partition_point(|&position| position < hash);
        if idx == self.positions.len() {
            idx = 0;
        }

        self.owners
            .get(&self.positions[idx])
            .map(String::as_str)
            .ok_or(ClusterError::NoAvailableNode)
    }

    /// Node addresses in ring order.
    pub fn nodes(&self) -> Vec<String> {
        self.positions
            .iter()
            .filter_map(|position| self.owners.get(position).cloned())
            .collect()
    }

    pub fn positions(&self) -> &[u64] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
