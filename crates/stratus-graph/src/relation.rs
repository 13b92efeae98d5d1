//! Relation types for the resource graph.
//!
//! Relations are directed, typed edges. Containment is stored one way
//! only (parent to child); asking for `ChildOf` reads the same edges in
//! the opposite direction, so the two can never disagree.

use serde::{Deserialize, Serialize};
use stratus_core::ResourceKey;

/// The type of relationship between two resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Structural containment: a network is parent of its subnets.
    ParentOf,

    /// Inverse of `ParentOf`.
    ChildOf,

    /// The source's effect targets the destination (policy on a group).
    AppliedOn,

    /// The source requires the destination to exist or function.
    DependsOn,
}

impl RelationKind {
    /// Rewrites a relation into its stored orientation.
    ///
    /// `ChildOf(a, b)` becomes `ParentOf(b, a)`; every other kind is kept.
    pub fn normalize<'a>(
        self,
        from: &'a ResourceKey,
        to: &'a ResourceKey,
    ) -> (RelationKind, &'a ResourceKey, &'a ResourceKey) {
        match self {
            Self::ChildOf => (Self::ParentOf, to, from),
            kind => (kind, from, to),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParentOf => "parent_of",
            Self::ChildOf => "child_of",
            Self::AppliedOn => "applied_on",
            Self::DependsOn => "depends_on",
        }
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A relation between two resource identities.
///
/// Endpoints are keys, not nodes: a relation may point at a resource
/// owned by another service's graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub kind: RelationKind,
    pub from: ResourceKey,
    pub to: ResourceKey,
}

impl Relation {
    pub fn new(kind: RelationKind, from: ResourceKey, to: ResourceKey) -> Self {
        Self { kind, from, to }
    }

    pub fn parent_of(parent: ResourceKey, child: ResourceKey) -> Self {
        Self::new(RelationKind::ParentOf, parent, child)
    }

    pub fn applied_on(source: ResourceKey, target: ResourceKey) -> Self {
        Self::new(RelationKind::AppliedOn, source, target)
    }

    pub fn depends_on(dependent: ResourceKey, dependency: ResourceKey) -> Self {
        Self::new(RelationKind::DependsOn, dependent, dependency)
    }
}
