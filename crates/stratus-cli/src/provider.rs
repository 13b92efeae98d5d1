//! Directory-backed service fetcher.
//!
//! Reads a provider export from `<source_dir>/<service>.json`:
//!
//! ```json
//! {
//!   "resources": [{ "type": "subnet", "id": "subnet-1", "properties": { "cidr": "10.0.1.0/24" } }],
//!   "relations": [{ "kind": "child_of", "from": { "type": "subnet", "id": "subnet-1" },
//!                   "to": { "type": "vpc", "id": "vpc-1" } }]
//! }
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use stratus_core::{Resource, ResourceKey};
use stratus_graph::{Relation, RelationKind};
use stratus_sync::{FetchError, FetchedResources, ServiceFetcher};
use tracing::debug;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct Export {
    #[serde(default)]
    resources: Vec<serde_json::Value>,
    #[serde(default)]
    relations: Vec<RelationRecord>,
}

#[derive(Deserialize)]
struct KeyRecord {
    #[serde(rename = "type")]
    resource_type: String,
    id: String,
}

#[derive(Deserialize)]
struct RelationRecord {
    kind: RelationKind,
    from: KeyRecord,
    to: KeyRecord,
}

impl From<KeyRecord> for ResourceKey {
    fn from(record: KeyRecord) -> Self {
        ResourceKey::new(record.resource_type, record.id)
    }
}

/// A service whose resources come from a JSON export on disk.
pub struct DirectoryService {
    name: String,
    path: PathBuf,
}

impl DirectoryService {
    pub fn new(name: impl Into<String>, source_dir: &Path) -> Self {
        let name = name.into();
        let path = source_dir.join(format!("{}.json", name));
        Self { name, path }
    }

    fn parse(&self, raw: &str) -> Result<FetchedResources, FetchError> {
        let export: Export = serde_json::from_str(raw)
            .map_err(|e| FetchError::Provider(format!("{}: {}", self.path.display(), e)))?;

        let resources = export
            .resources
            .iter()
            .map(Resource::from_json)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| FetchError::Provider(format!("{}: {}", self.path.display(), e)))?;

        let relations = export
            .relations
            .into_iter()
            .map(|r| Relation::new(r.kind, r.from.into(), r.to.into()))
            .collect();

        Ok(FetchedResources::new(resources, relations))
    }
}

#[async_trait]
impl ServiceFetcher for DirectoryService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<FetchedResources, FetchError> {
        debug!(service = %self.name, path = %self.path.display(), "Reading export");

        let raw = tokio::time::timeout(FETCH_TIMEOUT, tokio::fs::read_to_string(&self.path))
            .await
            .map_err(|_| FetchError::Timeout(FETCH_TIMEOUT))?
            .map_err(|e| FetchError::Provider(format!("{}: {}", self.path.display(), e)))?;

        self.parse(&raw)
    }
}
