//! Storage Node Module
//!
//! A storage node is a byte store keyed by `(collection-id, filename)` on top of one local
//! directory. It has no placement logic and no knowledge of the ring or of other nodes.
//!
//! ## Core Concepts
//! - **Disk layout**: `NodeStore` keeps one subdirectory per collection.
//! - **Service**: `handlers` expose Write/Read/ListFiles/DeleteFile over HTTP.
//! - **Clients**: `StorageClient` is the coordinator's view of a node, implemented over
//!   HTTP for real deployments and in-process for embedding.

pub mod client;
pub mod disk;
pub mod handlers;
pub mod protocol;
