//! Core graph data structure.
//!
//! The ResourceGraph wraps petgraph and adds a key index so every
//! (type, id) pair maps to exactly one node. Relations may name
//! resources this graph never received; those endpoints are kept as
//! reference slots so the edge survives, but lookups and traversals
//! treat them as absent.

use crate::relation::{Relation, RelationKind};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use stratus_core::{Resource, ResourceKey};
use tracing::debug;

/// Unique identifier for a node in the graph.
pub type NodeId = NodeIndex;

/// What a graph node holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) enum GraphNode {
    /// A resource this graph's service reported.
    Resource(Resource),
    /// An identity only known as the endpoint of a relation.
    Reference(ResourceKey),
}

impl GraphNode {
    fn key(&self) -> ResourceKey {
        match self {
            GraphNode::Resource(resource) => resource.key(),
            GraphNode::Reference(key) => key.clone(),
        }
    }

    fn resource(&self) -> Option<&Resource> {
        match self {
            GraphNode::Resource(resource) => Some(resource),
            GraphNode::Reference(_) => None,
        }
    }
}

/// The resource relationship graph of a single service.
///
/// There is no removal API: a graph is replaced wholesale on resync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceGraph {
    /// The underlying petgraph graph.
    pub(crate) graph: DiGraph<GraphNode, RelationKind>,

    /// Maps resource identities to graph node indexes.
    key_index: HashMap<ResourceKey, NodeId>,
}

impl ResourceGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a resource, or replaces the properties of the node with
    /// the same (type, id).
    ///
    /// A node previously known only as a relation endpoint is promoted
    /// in place, keeping its edges.
    pub fn add_resource(&mut self, resource: Resource) -> NodeId {
        let key = resource.key();

        if let Some(&index) = self.key_index.get(&key) {
            if let Some(slot) = self.graph.node_weight_mut(index) {
                *slot = GraphNode::Resource(resource);
            }
            return index;
        }

        let index = self.graph.add_node(GraphNode::Resource(resource));
        self.key_index.insert(key, index);
        index
    }

    /// Adds a directed relation. Returns false if it was already present.
    ///
    /// `ChildOf` is stored as the inverse `ParentOf` edge.
    pub fn add_relation(&mut self, kind: RelationKind, from: &ResourceKey, to: &ResourceKey) -> bool {
        let (kind, from, to) = kind.normalize(from, to);
        let source = self.ensure_node(from);
        let target = self.ensure_node(to);

        let exists = self
            .graph
            .edges_directed(source, Direction::Outgoing)
            .any(|edge| edge.target() == target && *edge.weight() == kind);
        if exists {
            return false;
        }

        self.graph.add_edge(source, target, kind);
        true
    }

    /// Adds a relation record.
    pub fn insert_relation(&mut self, relation: &Relation) -> bool {
        self.add_relation(relation.kind, &relation.from, &relation.to)
    }

    fn ensure_node(&mut self, key: &ResourceKey) -> NodeId {
        if let Some(&index) = self.key_index.get(key) {
            return index;
        }

        debug!("Relation endpoint {} not (yet) in graph", key);
        let index = self.graph.add_node(GraphNode::Reference(key.clone()));
        self.key_index.insert(key.clone(), index);
        index
    }

    /// Finds the first resource with the given id, whatever its type.
    ///
    /// Nodes are scanned in insertion order, so an id shared by several
    /// types always resolves to the one the service reported first.
    pub fn find_resource(&self, id: &str) -> Option<&Resource> {
        self.resources().find(|resource| resource.id == id)
    }

    /// Finds every resource with the given id, across types.
    pub fn find_resources(&self, id: &str) -> Vec<&Resource> {
        self.resources().filter(|resource| resource.id == id).collect()
    }

    /// Gets a resource by its full identity.
    pub fn get(&self, key: &ResourceKey) -> Option<&Resource> {
        let index = self.key_index.get(key)?;
        self.resource_at(*index)
    }

    /// Returns true if the graph holds a resource (not just a reference)
    /// with this identity.
    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.get(key).is_some()
    }

    /// Iterates over resources in insertion order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.graph.node_weights().filter_map(GraphNode::resource)
    }

    /// Returns all relations in insertion order.
    pub fn relations(&self) -> Vec<Relation> {
        self.graph
            .edge_references()
            .map(|edge| {
                Relation::new(
                    *edge.weight(),
                    self.graph[edge.source()].key(),
                    self.graph[edge.target()].key(),
                )
            })
            .collect()
    }

    /// Returns the number of resources.
    pub fn resource_count(&self) -> usize {
        self.resources().count()
    }

    /// Returns the number of relations.
    pub fn relation_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub(crate) fn index_of(&self, key: &ResourceKey) -> Option<NodeId> {
        self.key_index.get(key).copied()
    }

    pub(crate) fn resource_at(&self, index: NodeId) -> Option<&Resource> {
        self.graph.node_weight(index).and_then(GraphNode::resource)
    }

    /// Neighbours across edges of `kind`, in edge insertion order.
    ///
    /// Reference slots are included; callers decide whether to skip them.
    pub(crate) fn neighbors(&self, index: NodeId, kind: RelationKind, direction: Direction) -> Vec<NodeId> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(index, direction)
            .filter(|edge| *edge.weight() == kind)
            .map(|edge| {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                (edge.id(), other)
            })
            .collect();

        // petgraph yields adjacency newest first
        edges.sort_by_key(|(edge, _)| *edge);
        edges.into_iter().map(|(_, node)| node).collect()
    }
}

impl PartialEq for ResourceGraph {
    fn eq(&self, other: &Self) -> bool {
        self.resources().eq(other.resources()) && self.relations() == other.relations()
    }
}

/// Graph statistics for status output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub resources: usize,
    pub relations: usize,
    /// Relation endpoints with no resource in this graph.
    pub references: usize,
    pub by_type: BTreeMap<String, usize>,
}

impl ResourceGraph {
    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            relations: self.relation_count(),
            ..GraphStats::default()
        };

        for node in self.graph.node_weights() {
            match node {
                GraphNode::Resource(resource) => {
                    stats.resources += 1;
                    *stats
                        .by_type
                        .entry(resource.resource_type.clone())
                        .or_default() += 1;
                }
                GraphNode::Reference(_) => stats.references += 1,
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratus_core::PropertyValue;

    fn key(resource_type: &str, id: &str) -> ResourceKey {
        ResourceKey::new(resource_type, id)
    }

    #[test]
    fn test_add_and_find() {
        let mut graph = ResourceGraph::new();
        let vpc = Resource::new("vpc", "vpc-1").with_property("cidr", "10.0.0.0/16");
        graph.add_resource(vpc.clone());

        assert_eq!(graph.find_resource("vpc-1"), Some(&vpc));
        assert_eq!(graph.get(&key("vpc", "vpc-1")), Some(&vpc));
        assert!(graph.find_resource("vpc-2").is_none());
    }

    #[test]
    fn test_replace_preserves_identity_and_edges() {
        let mut graph = ResourceGraph::new();
        let first = graph.add_resource(Resource::new("instance", "i-1").with_property("state", "pending"));
        graph.add_resource(Resource::new("subnet", "s-1"));
        graph.add_relation(RelationKind::ParentOf, &key("subnet", "s-1"), &key("instance", "i-1"));

        let second = graph.add_resource(Resource::new("instance", "i-1").with_property("state", "running"));

        assert_eq!(first, second);
        assert_eq!(graph.resource_count(), 2);
        assert_eq!(graph.relation_count(), 1);
        assert_eq!(
            graph.find_resource("i-1").and_then(|r| r.property("state")),
            Some(&PropertyValue::from("running"))
        );
    }

    #[test]
    fn test_same_id_different_types_are_distinct() {
        let mut graph = ResourceGraph::new();
        graph.add_resource(Resource::new("user", "admin"));
        graph.add_resource(Resource::new("group", "admin"));

        assert_eq!(graph.resource_count(), 2);
        assert_eq!(graph.find_resource("admin").map(|r| r.resource_type.as_str()), Some("user"));
        assert_eq!(graph.find_resources("admin").len(), 2);
    }

    #[test]
    fn test_add_relation_is_idempotent() {
        let mut graph = ResourceGraph::new();
        graph.add_resource(Resource::new("vpc", "v"));
        graph.add_resource(Resource::new("subnet", "s"));

        assert!(graph.add_relation(RelationKind::ParentOf, &key("vpc", "v"), &key("subnet", "s")));
        assert!(!graph.add_relation(RelationKind::ParentOf, &key("vpc", "v"), &key("subnet", "s")));
        // Same edge spelled from the child's side
        assert!(!graph.add_relation(RelationKind::ChildOf, &key("subnet", "s"), &key("vpc", "v")));
        // Different kind between the same nodes is a new edge
        assert!(graph.add_relation(RelationKind::DependsOn, &key("vpc", "v"), &key("subnet", "s")));

        assert_eq!(graph.relation_count(), 2);
    }

    #[test]
    fn test_dangling_endpoint_is_not_a_resource() {
        let mut graph = ResourceGraph::new();
        graph.add_resource(Resource::new("policy", "p-1"));
        graph.add_relation(RelationKind::AppliedOn, &key("policy", "p-1"), &key("instance", "i-9"));

        assert_eq!(graph.resource_count(), 1);
        assert!(graph.find_resource("i-9").is_none());
        assert!(!graph.contains(&key("instance", "i-9")));

        let stats = graph.stats();
        assert_eq!(stats.references, 1);
        assert_eq!(stats.relations, 1);
    }

    #[test]
    fn test_reference_promoted_when_resource_arrives() {
        let mut graph = ResourceGraph::new();
        graph.add_relation(RelationKind::ParentOf, &key("vpc", "v"), &key("subnet", "s"));
        graph.add_resource(Resource::new("vpc", "v"));

        assert!(graph.contains(&key("vpc", "v")));
        assert_eq!(graph.stats().references, 1);
        assert_eq!(graph.relation_count(), 1);
    }

    #[test]
    fn test_relations_keep_insertion_order() {
        let mut graph = ResourceGraph::new();
        graph.add_relation(RelationKind::DependsOn, &key("a", "1"), &key("b", "2"));
        graph.add_relation(RelationKind::ChildOf, &key("c", "3"), &key("a", "1"));

        let relations = graph.relations();
        assert_eq!(relations.len(), 2);
        assert_eq!(relations[0], Relation::depends_on(key("a", "1"), key("b", "2")));
        assert_eq!(relations[1], Relation::parent_of(key("a", "1"), key("c", "3")));
    }

    #[test]
    fn test_stats_by_type() {
        let mut graph = ResourceGraph::new();
        graph.add_resource(Resource::new("instance", "i-1"));
        graph.add_resource(Resource::new("instance", "i-2"));
        graph.add_resource(Resource::new("subnet", "s-1"));

        let stats = graph.stats();
        assert_eq!(stats.resources, 3);
        assert_eq!(stats.by_type.get("instance"), Some(&2));
        assert_eq!(stats.by_type.get("subnet"), Some(&1));
    }
}
