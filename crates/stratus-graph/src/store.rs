//! Per-service graph snapshots on disk.
//!
//! Each service owns one key in the `snapshots` tree of a sled database.
//! A save serializes the whole graph with bincode and swaps it in with a
//! single insert, so readers observe either the previous snapshot or the
//! new one, never a mix.

use crate::graph::ResourceGraph;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::{Db, Tree};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Bumped whenever the serialized layout changes.
pub const SNAPSHOT_VERSION: u32 = 1;

const SNAPSHOT_TREE: &str = "snapshots";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sled(#[from] sled::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("Snapshot for '{service}' has version {found}, expected {expected}")]
    UnsupportedVersion {
        service: String,
        found: u32,
        expected: u32,
    },
}

/// A stored graph plus when it was fetched.
#[derive(Debug, Clone, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub synced_at: DateTime<Utc>,
    pub graph: ResourceGraph,
}

/// Serialize-side twin of `Snapshot` that borrows the graph.
#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    synced_at: DateTime<Utc>,
    graph: &'a ResourceGraph,
}

/// Summary of a stored snapshot for status output.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotInfo {
    pub service: String,
    pub synced_at: DateTime<Utc>,
    pub resources: usize,
    pub relations: usize,
}

/// Durable store of the last synced graph per service.
///
/// Cloning is cheap and clones share the same database.
#[derive(Clone)]
pub struct GraphStore {
    db: Db,
    snapshots: Tree,
}

impl GraphStore {
    /// Opens or creates a graph store at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        let snapshots = db.open_tree(SNAPSHOT_TREE)?;
        Ok(Self { db, snapshots })
    }

    /// Replaces the snapshot of `service` with `graph`.
    ///
    /// Returns once the write is flushed to disk.
    pub fn save(&self, service: &str, graph: &ResourceGraph) -> Result<DateTime<Utc>, StoreError> {
        let synced_at = Utc::now();
        let bytes = bincode::serialize(&SnapshotRef {
            version: SNAPSHOT_VERSION,
            synced_at,
            graph,
        })?;

        self.snapshots.insert(service, bytes)?;
        self.snapshots.flush()?;

        debug!(
            service,
            resources = graph.resource_count(),
            relations = graph.relation_count(),
            "Snapshot saved"
        );
        Ok(synced_at)
    }

    /// Loads the graph of `service`, or an empty graph if it was never
    /// synced.
    pub fn load(&self, service: &str) -> Result<ResourceGraph, StoreError> {
        Ok(self
            .load_snapshot(service)?
            .map(|snapshot| snapshot.graph)
            .unwrap_or_default())
    }

    /// Loads the stored snapshot of `service` with its metadata.
    pub fn load_snapshot(&self, service: &str) -> Result<Option<Snapshot>, StoreError> {
        let Some(bytes) = self.snapshots.get(service)? else {
            return Ok(None);
        };

        // The version leads every layout; check it before decoding the rest.
        let version: u32 = bincode::deserialize(&bytes)?;
        if version != SNAPSHOT_VERSION {
            return Err(StoreError::UnsupportedVersion {
                service: service.to_string(),
                found: version,
                expected: SNAPSHOT_VERSION,
            });
        }

        Ok(Some(bincode::deserialize(&bytes)?))
    }

    /// Returns snapshot metadata for `service`, if one is stored.
    pub fn info(&self, service: &str) -> Result<Option<SnapshotInfo>, StoreError> {
        Ok(self.load_snapshot(service)?.map(|snapshot| SnapshotInfo {
            service: service.to_string(),
            synced_at: snapshot.synced_at,
            resources: snapshot.graph.resource_count(),
            relations: snapshot.graph.relation_count(),
        }))
    }

    /// Lists services that have a stored snapshot, in key order.
    pub fn services(&self) -> Result<Vec<String>, StoreError> {
        self.snapshots
            .iter()
            .keys()
            .map(|key| -> Result<String, StoreError> {
                let key = key?;
                Ok(String::from_utf8_lossy(&key).into_owned())
            })
            .collect()
    }

    /// Drops the stored snapshot of `service`.
    pub fn clear(&self, service: &str) -> Result<(), StoreError> {
        self.snapshots.remove(service)?;
        self.db.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore")
            .field("snapshots", &self.snapshots.len())
            .finish()
    }
}
