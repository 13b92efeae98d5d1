//! Graph builder for constructing a service graph from fetched records.
//!
//! The builder takes resources and relations as a provider reports them
//! and assembles a fresh ResourceGraph. Every sync builds a new graph
//! this way; nothing is patched into a previous generation.

use crate::graph::ResourceGraph;
use crate::relation::Relation;
use stratus_core::Resource;
use tracing::debug;

/// Builds a ResourceGraph from provider records.
///
/// The builder handles the two-pass process:
/// 1. Add all resources to the graph
/// 2. Add relations, so endpoints reported in the same batch resolve
///    to resources instead of references
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: ResourceGraph,
    relations: Vec<Relation>,
}

impl GraphBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds resources to the graph. Later records with the same
    /// (type, id) replace earlier ones.
    pub fn add_resources(&mut self, resources: impl IntoIterator<Item = Resource>) -> &mut Self {
        for resource in resources {
            self.graph.add_resource(resource);
        }
        self
    }

    /// Queues relations; they are resolved in `build`.
    pub fn add_relations(&mut self, relations: impl IntoIterator<Item = Relation>) -> &mut Self {
        self.relations.extend(relations);
        self
    }

    /// Finishes building and returns the graph.
    pub fn build(mut self) -> ResourceGraph {
        let mut duplicates = 0usize;
        for relation in self.relations.drain(..) {
            if !self.graph.insert_relation(&relation) {
                duplicates += 1;
            }
        }

        let stats = self.graph.stats();
        debug!(
            resources = stats.resources,
            relations = stats.relations,
            references = stats.references,
            duplicates,
            "Graph built"
        );

        self.graph
    }
}
