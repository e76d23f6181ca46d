//! Consistent Hashing Module
//!
//! Maps every file key to exactly one owning storage node.
//!
//! ## Core Concepts
//! - **Positions**: Each node address is hashed (SHA-256, first 8 bytes big-endian) to a
//!   64-bit position. The positions are kept sorted and treated as a circle.
//! - **Lookup**: A key is owned by the node at the smallest position `>=` the key's hash,
//!   wrapping to the first position when the hash is past the last one.
//! - **Determinism**: The ring is a pure function of the node set, so any process that
//!   builds it from the same addresses routes every key identically.

pub mod hash_ring;
pub mod types;

#[cfg(test)]
mod tests;
