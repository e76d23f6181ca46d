//! Membership & Migration Module
//!
//! The coordinator side of the cluster: it owns the authoritative node list, routes content
//! calls to the owning node and moves files when the node set changes.
//!
//! ## Core Mechanisms
//! - **Topology**: The node list and the ring built from it are replaced together under one lock.
//! - **Routing**: Content calls resolve their owner under a read lock and talk to it unlocked.
//! - **Migration**: Add/Remove inventory every node, rebuild the ring and then move each misplaced
//!   file with read, write, delete. The first failure aborts the run without rollback.
//! - **Rebalance**: The same diff-and-move pass against the current ring. It finishes any run that
//!   was aborted and does nothing on a balanced cluster.

pub mod coordinator;
pub mod handlers;
pub mod migration;
pub mod protocol;
pub mod types;
