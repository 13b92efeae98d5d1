//! Relationship traversal over a resource graph.
//!
//! Answers the questions an operator asks about one resource: where it
//! sits (parents), what it contains (children), what sits next to it
//! (siblings), what it targets (applied-on) and what needs it
//! (depending-on).
//!
//! Walks report every node with its hop distance from the root so the
//! caller can render a tree. Relation endpoints without a resource in
//! this graph are skipped silently; a graph synced from only some
//! services is expected to have them.

use crate::graph::{NodeId, ResourceGraph};
use crate::relation::RelationKind;
use petgraph::Direction;
use std::collections::HashSet;
use stratus_core::Resource;
use tracing::debug;

impl ResourceGraph {
    /// Walks containment upwards from `root`, depth first.
    ///
    /// A resource reachable through several parents is reported once per
    /// path. A node already on the current path is never re-entered, so
    /// malformed cyclic data still terminates.
    pub fn visit_parents<F>(&self, root: &Resource, mut visit: F)
    where
        F: FnMut(&Resource, usize),
    {
        self.walk_containment(root, Direction::Incoming, &mut visit);
    }

    /// Walks containment downwards from `root`, depth first.
    pub fn visit_children<F>(&self, root: &Resource, mut visit: F)
    where
        F: FnMut(&Resource, usize),
    {
        self.walk_containment(root, Direction::Outgoing, &mut visit);
    }

    /// Visits every resource sharing an immediate parent with `root`.
    ///
    /// Siblings are reported once each at distance 0, in the order their
    /// parents and then their parent-of edges were added. `root` itself is
    /// never reported.
    pub fn visit_siblings<F>(&self, root: &Resource, mut visit: F)
    where
        F: FnMut(&Resource, usize),
    {
        self.walk_siblings(root, &mut visit);
    }

    /// Collects `visit_parents` output.
    pub fn parents(&self, root: &Resource) -> Vec<(&Resource, usize)> {
        let mut out = Vec::new();
        self.walk_containment(root, Direction::Incoming, &mut |r, d| out.push((r, d)));
        out
    }

    /// Collects `visit_children` output.
    pub fn children(&self, root: &Resource) -> Vec<(&Resource, usize)> {
        let mut out = Vec::new();
        self.walk_containment(root, Direction::Outgoing, &mut |r, d| out.push((r, d)));
        out
    }

    /// Collects `visit_siblings` output.
    pub fn siblings(&self, root: &Resource) -> Vec<&Resource> {
        let mut out = Vec::new();
        self.walk_siblings(root, &mut |r, _| out.push(r));
        out
    }

    /// Resources `root` is applied on, in relation insertion order.
    pub fn list_resources_applied_on(&self, root: &Resource) -> Vec<&Resource> {
        self.related(root, RelationKind::AppliedOn, Direction::Outgoing)
    }

    /// Resources that depend on `root`, in relation insertion order.
    pub fn list_resources_depending_on(&self, root: &Resource) -> Vec<&Resource> {
        self.related(root, RelationKind::DependsOn, Direction::Incoming)
    }

    fn related(&self, root: &Resource, kind: RelationKind, direction: Direction) -> Vec<&Resource> {
        let Some(start) = self.index_of(&root.key()) else {
            return Vec::new();
        };

        self.neighbors(start, kind, direction)
            .into_iter()
            .filter(|&index| index != start)
            .filter_map(|index| self.resource_at(index))
            .collect()
    }

    fn walk_siblings<'g, F>(&'g self, root: &Resource, visit: &mut F)
    where
        F: FnMut(&'g Resource, usize),
    {
        let Some(start) = self.index_of(&root.key()) else {
            return;
        };

        let mut seen: HashSet<NodeId> = HashSet::new();
        seen.insert(start);

        for parent in self.neighbors(start, RelationKind::ParentOf, Direction::Incoming) {
            if self.resource_at(parent).is_none() {
                continue;
            }
            for sibling in self.neighbors(parent, RelationKind::ParentOf, Direction::Outgoing) {
                if !seen.insert(sibling) {
                    continue;
                }
                if let Some(resource) = self.resource_at(sibling) {
                    visit(resource, 0);
                }
            }
        }
    }

    fn walk_containment<'g, F>(&'g self, root: &Resource, direction: Direction, visit: &mut F)
    where
        F: FnMut(&'g Resource, usize),
    {
        let Some(start) = self.index_of(&root.key()) else {
            debug!("{} not in graph, nothing to walk", root);
            return;
        };

        let mut path = vec![start];
        self.descend(start, direction, 1, &mut path, visit);
    }

    fn descend<'g, F>(
        &'g self,
        node: NodeId,
        direction: Direction,
        distance: usize,
        path: &mut Vec<NodeId>,
        visit: &mut F,
    ) where
        F: FnMut(&'g Resource, usize),
    {
        for next in self.neighbors(node, RelationKind::ParentOf, direction) {
            if path.contains(&next) {
                debug!("Containment cycle at distance {}, not descending", distance);
                continue;
            }
            let Some(resource) = self.resource_at(next) else {
                continue;
            };

            visit(resource, distance);

            path.push(next);
            self.descend(next, direction, distance + 1, path, visit);
            path.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratus_core::ResourceKey;

    fn names(items: &[(&Resource, usize)]) -> Vec<(String, usize)> {
        items.iter().map(|(r, d)| (r.id.clone(), *d)).collect()
    }

    /// vpc N holds subnets S1 and S2, which hold instances I1 and I2.
    fn network() -> (ResourceGraph, Vec<Resource>) {
        let n = Resource::new("vpc", "N");
        let s1 = Resource::new("subnet", "S1");
        let s2 = Resource::new("subnet", "S2");
        let i1 = Resource::new("instance", "I1");
        let i2 = Resource::new("instance", "I2");

        let mut graph = ResourceGraph::new();
        for r in [&n, &s1, &s2, &i1, &i2] {
            graph.add_resource(r.clone());
        }
        graph.add_relation(RelationKind::ParentOf, &n.key(), &s1.key());
        graph.add_relation(RelationKind::ParentOf, &n.key(), &s2.key());
        graph.add_relation(RelationKind::ChildOf, &i1.key(), &s1.key());
        graph.add_relation(RelationKind::ParentOf, &s2.key(), &i2.key());

        (graph, vec![n, s1, s2, i1, i2])
    }

    #[test]
    fn test_parents_of_instance() {
        let (graph, r) = network();
        let parents = graph.parents(&r[3]);
        assert_eq!(
            names(&parents),
            vec![("S1".to_string(), 1), ("N".to_string(), 2)]
        );
    }

    #[test]
    fn test_children_of_network() {
        let (graph, r) = network();
        let children = graph.children(&r[0]);
        assert_eq!(
            names(&children),
            vec![
                ("S1".to_string(), 1),
                ("I1".to_string(), 2),
                ("S2".to_string(), 1),
                ("I2".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_visitor_matches_collected_output() {
        let (graph, r) = network();
        let mut seen = Vec::new();
        graph.visit_children(&r[0], |res, d| seen.push((res.id.clone(), d)));
        assert_eq!(seen, names(&graph.children(&r[0])));
    }

    #[test]
    fn test_siblings_of_subnet() {
        let (graph, r) = network();
        let siblings: Vec<_> = graph.siblings(&r[1]).iter().map(|s| s.id.clone()).collect();
        assert_eq!(siblings, vec!["S2"]);

        let mut visited = Vec::new();
        graph.visit_siblings(&r[1], |s, d| visited.push((s.id.clone(), d)));
        assert_eq!(visited, vec![("S2".to_string(), 0)]);
    }

    #[test]
    fn test_siblings_symmetric_and_exclude_root() {
        let (graph, r) = network();
        for resource in &r {
            for sibling in graph.siblings(resource) {
                assert_ne!(sibling.key(), resource.key());
                let back: Vec<_> = graph.siblings(sibling).iter().map(|s| s.key()).collect();
                assert!(back.contains(&resource.key()));
            }
        }
    }

    #[test]
    fn test_siblings_deduplicated_across_shared_parents() {
        let mut graph = ResourceGraph::new();
        let a = ResourceKey::new("group", "a");
        let b = ResourceKey::new("group", "b");
        for k in [&a, &b] {
            graph.add_resource(Resource::new(k.resource_type.clone(), k.id.clone()));
        }
        let u1 = Resource::new("user", "u1");
        let u2 = Resource::new("user", "u2");
        graph.add_resource(u1.clone());
        graph.add_resource(u2.clone());
        for parent in [&a, &b] {
            graph.add_relation(RelationKind::ParentOf, parent, &u1.key());
            graph.add_relation(RelationKind::ParentOf, parent, &u2.key());
        }

        let siblings = graph.siblings(&u1);
        assert_eq!(siblings.len(), 1);
        assert_eq!(siblings[0].id, "u2");
    }

    #[test]
    fn test_children_then_parents_reach_root() {
        let (graph, r) = network();
        for (child, _) in graph.children(&r[0]) {
            let ancestors: Vec<_> = graph.parents(child).iter().map(|(p, _)| p.key()).collect();
            assert!(ancestors.contains(&r[0].key()), "{} lost its root", child);
        }
    }

    #[test]
    fn test_multiple_parents_visited_per_path() {
        // A -> C, B -> C, both roots
        let mut graph = ResourceGraph::new();
        let a = Resource::new("group", "A");
        let b = Resource::new("group", "B");
        let c = Resource::new("user", "C");
        for r in [&a, &b, &c] {
            graph.add_resource(r.clone());
        }
        graph.add_relation(RelationKind::ParentOf, &a.key(), &c.key());
        graph.add_relation(RelationKind::ParentOf, &b.key(), &c.key());

        let parents = graph.parents(&c);
        assert_eq!(names(&parents), vec![("A".to_string(), 1), ("B".to_string(), 1)]);
    }

    #[test]
    fn test_cycle_no_infinite_loop() {
        // A -> B -> C -> A (malformed containment)
        let mut graph = ResourceGraph::new();
        let a = Resource::new("x", "A");
        let b = Resource::new("x", "B");
        let c = Resource::new("x", "C");
        for r in [&a, &b, &c] {
            graph.add_resource(r.clone());
        }
        graph.add_relation(RelationKind::ParentOf, &a.key(), &b.key());
        graph.add_relation(RelationKind::ParentOf, &b.key(), &c.key());
        graph.add_relation(RelationKind::ParentOf, &c.key(), &a.key());

        let children = graph.children(&a);
        assert_eq!(names(&children), vec![("B".to_string(), 1), ("C".to_string(), 2)]);

        let parents = graph.parents(&a);
        assert_eq!(names(&parents), vec![("C".to_string(), 1), ("B".to_string(), 2)]);
    }

    #[test]
    fn test_self_parent_is_ignored() {
        let mut graph = ResourceGraph::new();
        let a = Resource::new("x", "A");
        graph.add_resource(a.clone());
        graph.add_relation(RelationKind::ParentOf, &a.key(), &a.key());

        assert!(graph.children(&a).is_empty());
        assert!(graph.siblings(&a).is_empty());
    }

    #[test]
    fn test_dangling_edges_are_skipped() {
        let mut graph = ResourceGraph::new();
        let subnet = Resource::new("subnet", "S1");
        graph.add_resource(subnet.clone());
        // Parent lives in a service that was never synced
        graph.add_relation(
            RelationKind::ChildOf,
            &subnet.key(),
            &ResourceKey::new("vpc", "elsewhere"),
        );

        assert!(graph.parents(&subnet).is_empty());
        assert!(graph.siblings(&subnet).is_empty());
    }

    #[test]
    fn test_root_missing_from_graph() {
        let (graph, _) = network();
        let stranger = Resource::new("instance", "i-404");

        assert!(graph.parents(&stranger).is_empty());
        assert!(graph.children(&stranger).is_empty());
        assert!(graph.siblings(&stranger).is_empty());
        assert!(graph.list_resources_applied_on(&stranger).is_empty());
    }

    #[test]
    fn test_applied_on_in_insertion_order() {
        let mut graph = ResourceGraph::new();
        let policy = Resource::new("policy", "p-1");
        let g2 = Resource::new("group", "g2");
        let g1 = Resource::new("group", "g1");
        for r in [&policy, &g2, &g1] {
            graph.add_resource(r.clone());
        }
        graph.add_relation(RelationKind::AppliedOn, &policy.key(), &g2.key());
        graph.add_relation(RelationKind::AppliedOn, &policy.key(), &g1.key());
        graph.add_relation(
            RelationKind::AppliedOn,
            &policy.key(),
            &ResourceKey::new("user", "not-synced"),
        );

        let ids: Vec<_> = graph
            .list_resources_applied_on(&policy)
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["g2", "g1"]);

        // Targets do not see themselves applied on anything
        assert!(graph.list_resources_applied_on(&g1).is_empty());
    }

    #[test]
    fn test_depending_on() {
        let mut graph = ResourceGraph::new();
        let volume = Resource::new("volume", "vol-1");
        let i1 = Resource::new("instance", "i-1");
        let i2 = Resource::new("instance", "i-2");
        for r in [&volume, &i1, &i2] {
            graph.add_resource(r.clone());
        }
        graph.add_relation(RelationKind::DependsOn, &i2.key(), &volume.key());
        graph.add_relation(RelationKind::DependsOn, &i1.key(), &volume.key());

        let ids: Vec<_> = graph
            .list_resources_depending_on(&volume)
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["i-2", "i-1"]);
        assert!(graph.list_resources_depending_on(&i1).is_empty());
    }

    #[test]
    fn test_readding_resource_keeps_traversal_output() {
        let (mut graph, r) = network();
        let before = names(&graph.children(&r[0]));

        graph.add_resource(r[1].clone());
        graph.add_resource(r[3].clone());

        assert_eq!(names(&graph.children(&r[0])), before);
        assert_eq!(graph.resource_count(), 5);
    }
}
