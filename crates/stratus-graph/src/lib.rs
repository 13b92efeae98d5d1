//! Stratus Graph - Resource relationship management
//!
//! This crate holds the graph of cloud resources synced from one service,
//! the traversals that answer relationship questions over it, and the
//! on-disk store that keeps one snapshot per service between syncs.
//!
//! # Architecture
//!
//! The graph uses petgraph internally with a (type, id) index so each
//! resource has exactly one node. Containment is stored as `ParentOf`
//! edges only; `ChildOf` is read from the same edges backwards.
//!
//! # Example
//!
//! ```
//! use stratus_graph::{RelationKind, ResourceGraph};
//! use stratus_core::Resource;
//!
//! let mut graph = ResourceGraph::new();
//! let vpc = Resource::new("vpc", "vpc-1");
//! let subnet = Resource::new("subnet", "subnet-1");
//! graph.add_resource(vpc.clone());
//! graph.add_resource(subnet.clone());
//! graph.add_relation(RelationKind::ChildOf, &subnet.key(), &vpc.key());
//!
//! let parents = graph.parents(&subnet);
//! assert_eq!(parents[0].0.id, "vpc-1");
//! ```

mod builder;
mod graph;
mod relation;
mod store;
mod traversal;

pub use builder::GraphBuilder;
pub use graph::{GraphStats, NodeId, ResourceGraph};
pub use relation::{Relation, RelationKind};
pub use store::{GraphStore, Snapshot, SnapshotInfo, StoreError, SNAPSHOT_VERSION};
