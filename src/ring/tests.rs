//! Ring Module Tests
//!
//! ## Test Scopes
//! - **Hashing**: Pins the position function so independently built rings agree.
//! - **Lookup**: Ownership, wrap-around and the empty-ring failure.
//! - **Membership changes**: Order independence and minimal movement of keys.

#[cfg(test)]
mod tests {
    use crate::error::ClusterError;
    use crate::ring::hash_ring::{HashRing, ring_position};
    use crate::ring::types::{FileKey, normalize_address};

    const NODES: [&str; 3] = ["127.0.0.1:8090", "127.0.0.1:8091", "127.0.0.1:8092"];

    fn sample_keys(count: usize) -> Vec<FileKey> {
        (0..count)
            .map(|i| FileKey::new(format!("video-{}", i % 37), format!("chunk-{}.m4s", i)))
            .collect()
    }

    // ============================================================
    // HASHING
    // ============================================================

    #[test]
    fn test_ring_position_is_sha256_prefix() {
        // SHA-256("abc") = ba7816bf8f01cfea414140de5dae2223...
        assert_eq!(ring_position("abc"), 0xba7816bf8f01cfea);
    }

    #[test]
    fn test_ring_position_known_nodes() {
        assert_eq!(ring_position("127.0.0.1:8091"), 7749588763258714763);
        assert_eq!(ring_position("127.0.0.1:8092"), 9541866175801661764);
        assert_eq!(ring_position("127.0.0.1:8090"), 12570443636947007870);
    }

    #[test]
    fn test_canonical_key_format() {
        let key = FileKey::new("v1", "seg1.m4s");
        assert_eq!(key.canonical(), "v1/seg1.m4s");
        assert_eq!(key.to_string(), "v1/seg1.m4s");
    }

    // ============================================================
    // LOOKUP
    // ============================================================

    #[test]
    fn test_empty_ring_has_no_owner() {
        let ring = HashRing::build(Vec::<String>::new());

        assert!(ring.is_empty());
        let result = ring.lookup(&FileKey::new("v1", "seg1.m4s"));
        assert!(matches!(result, Err(ClusterError::NoAvailableNode)));
    }

    #[test]
    fn test_single_node_owns_everything() {
        let ring = HashRing::build(["10.0.0.7:9000"]);

        for key in sample_keys(200) {
            assert_eq!(ring.lookup(&key).unwrap(), "10.0.0.7:9000");
        }
    }

    #[test]
    fn test_lookup_returns_member_and_is_stable() {
        let ring = HashRing::build(NODES);

        for key in sample_keys(500) {
            let first = ring.lookup(&key).unwrap().to_string();
            let second = ring.lookup(&key).unwrap().to_string();
            assert!(NODES.contains(&first.as_str()));
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_known_owner_for_segment() {
        let ring = HashRing::build(NODES);
        let key = FileKey::new("v1", "seg1.m4s");

        assert_eq!(ring.lookup(&key).unwrap(), "127.0.0.1:8091");
    }

    #[test]
    fn test_nodes_are_listed_in_ring_order() {
        let ring = HashRing::build(NODES);

        assert_eq!(
            ring.nodes(),
            vec!["127.0.0.1:8091", "127.0.0.1:8092", "127.0.0.1:8090"]
        );
        assert!(ring.positions().windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_lookup_wraps_around() {
        let ring = HashRing::build(NODES);
        let first = ring.nodes()[0].clone();
        let last_position = *ring.positions().last().unwrap();

        assert_eq!(ring.lookup_position(u64::MAX).unwrap(), first);
        assert_eq!(ring.lookup_position(last_position + 1).unwrap(), first);
        assert_eq!(ring.lookup_position(0).unwrap(), first);
    }

    #[test]
    fn test_lookup_exact_position_is_inclusive() {
        let ring = HashRing::build(NODES);
        let nodes = ring.nodes();
        let positions = ring.positions().to_vec();

        assert_eq!(ring.lookup_position(positions[1]).unwrap(), nodes[1]);
        assert_eq!(ring.lookup_position(positions[0] + 1).unwrap(), nodes[1]);
        assert_eq!(ring.lookup_position(positions[2]).unwrap(), nodes[2]);
    }

    #[test]
    fn test_every_node_receives_keys() {
        let ring = HashRing::build(NODES);
        let mut counts = std::collections::HashMap::new();

        for i in 0..3000 {
            let key = FileKey::new(format!("video-{}", i), format!("chunk-{}.m4s", i));
            *counts.entry(ring.lookup(&key).unwrap().to_string()).or_insert(0) += 1;
        }

        assert_eq!(counts.len(), 3, "All nodes should own part of the keyspace");
    }

    #[test]
    fn test_duplicate_address_occupies_one_position() {
        let ring = HashRing::build(["127.0.0.1:8090", "127.0.0.1:8090"]);

        assert_eq!(ring.len(), 1);
        assert_eq!(ring.nodes(), vec!["127.0.0.1:8090"]);
    }

    // ============================================================
    // MEMBERSHIP CHANGES
    // ============================================================

    #[test]
    fn test_build_is_order_independent() {
        let abc = HashRing::build(["a:1", "b:1", "c:1"]);
        let cab = HashRing::build(["c:1", "a:1", "b:1"]);
        let bca = HashRing::build(["b:1", "c:1", "a:1"]);

        assert_eq!(abc, cab);
        assert_eq!(abc, bca);

        for key in sample_keys(1000) {
            assert_eq!(abc.lookup(&key).unwrap(), cab.lookup(&key).unwrap());
            assert_eq!(abc.lookup(&key).unwrap(), bca.lookup(&key).unwrap());
        }
    }

    #[test]
    fn test_adding_node_only_moves_keys_to_it() {
        let before = HashRing::build(NODES);
        let after = HashRing::build(NODES.iter().copied().chain(["127.0.0.1:8093"]));

        for key in sample_keys(2000) {
            let old_owner = before.lookup(&key).unwrap();
            let new_owner = after.lookup(&key).unwrap();
            if old_owner != new_owner {
                assert_eq!(new_owner, "127.0.0.1:8093");
            }
        }
    }

    #[test]
    fn test_removing_node_only_moves_its_keys() {
        let before = HashRing::build(NODES);
        let after = HashRing::build(["127.0.0.1:8090", "127.0.0.1:8092"]);

        for key in sample_keys(2000) {
            let old_owner = before.lookup(&key).unwrap();
            let new_owner = after.lookup(&key).unwrap();
            if old_owner != new_owner {
                assert_eq!(old_owner, "127.0.0.1:8091");
            }
        }
    }

    #[test]
    fn test_add_then_remove_restores_ownership() {
        let full = HashRing::build(NODES);
        let grown = HashRing::build(NODES.iter().copied().chain(["127.0.0.1:9999"]));
        let shrunk = HashRing::build(
            grown
                .nodes()
                .into_iter()
                .filter(|node| node != "127.0.0.1:9999"),
        );

        assert_eq!(full, shrunk);
        for key in sample_keys(1000) {
            assert_eq!(full.lookup(&key).unwrap(), shrunk.lookup(&key).unwrap());
        }
    }

    // ============================================================
    // KEY VALIDATION
    // ============================================================

    #[test]
    fn test_valid_keys() {
        assert!(FileKey::new("v1", "manifest.mpd").validate().is_ok());
        assert!(FileKey::new("abc-123", "chunk-0-00001.m4s").validate().is_ok());
    }

    #[test]
    fn test_invalid_keys() {
        let invalid = [
            FileKey::new("", "seg.m4s"),
            FileKey::new("v1", ""),
            FileKey::new("..", "seg.m4s"),
            FileKey::new("v1", "."),
            FileKey::new("v1", "../etc/passwd"),
            FileKey::new("a/b", "seg.m4s"),
            FileKey::new("v1", "dir\\seg.m4s"),
        ];

        for key in invalid {
            assert!(
                matches!(key.validate(), Err(ClusterError::InvalidKey(_))),
                "{:?} should be rejected",
                key
            );
        }
    }

    #[test]
    fn test_normalize_address() {
        assert_eq!(normalize_address(" 127.0.0.1:8090 ").unwrap(), "127.0.0.1:8090");
        assert!(matches!(
            normalize_address("   "),
            Err(ClusterError::InvalidKey(_))
        ));
    }
}
