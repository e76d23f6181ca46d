//! Segment Cluster Library
//!
//! Distributed storage for media segments: manifests and segment files are spread over a set of
//! storage nodes by consistent hashing, and moved between them when the node set changes.
//! It serves as the foundation for the `segment-cluster` server binary and the `segctl` CLI.
//!
//! ## Architecture Modules
//! - **`ring`**: The consistent hash ring. Maps every `(collection-id, filename)` key to one node.
//! - **`storage`**: The storage node. A directory-backed byte store served over HTTP, and the
//!   clients the coordinator uses to reach it.
//! - **`membership`**: The coordinator. Routes content calls to their owner, adds and removes
//!   nodes and migrates the files whose owner changed.
//! - **`content`**: The interface upper layers use, backed either by a local directory or by
//!   the cluster.
//! - **`config`** and **`error`**: Shared settings and the error taxonomy.

pub mod config;
pub mod content;
pub mod error;
pub mod membership;
pub mod ring;
pub mod storage;
