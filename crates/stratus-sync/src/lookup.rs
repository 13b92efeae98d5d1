//! Resolving a resource id against cached graphs.
//!
//! Lookups read local snapshots first. A miss escalates to a single full
//! sync followed by one more local search; a second miss is a plain
//! "not found". A hit can optionally refresh the owning service before
//! the caller traverses its graph.

use crate::coordinator::SyncCoordinator;
use crate::error::SyncError;
use stratus_core::Resource;
use stratus_graph::{ResourceGraph, StoreError};
use tracing::{debug, info, warn};

/// How much network access a lookup may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LookupMode {
    /// Answer from snapshots only; a miss is "not found".
    LocalOnly,
    /// Full sync on a miss; trust the snapshot on a hit.
    CacheFirst,
    /// Full sync on a miss; targeted resync of the owning service on a hit.
    #[default]
    Refresh,
}

/// A resource together with the graph it was found in.
#[derive(Debug, Clone)]
pub struct LocalMatch {
    /// Service whose snapshot holds the resource.
    pub service: String,
    pub resource: Resource,
    pub graph: ResourceGraph,
    /// Locally stored resources sharing this id, across all services.
    pub candidates: usize,
}

/// Result of a lookup. Not finding a resource is not an error.
#[derive(Debug, Clone)]
pub enum LookupOutcome {
    Found(LocalMatch),
    NotFound,
}

impl LookupOutcome {
    pub fn found(self) -> Option<LocalMatch> {
        match self {
            LookupOutcome::Found(found) => Some(found),
            LookupOutcome::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, LookupOutcome::Found(_))
    }
}

impl From<Option<LocalMatch>> for LookupOutcome {
    fn from(found: Option<LocalMatch>) -> Self {
        found.map_or(LookupOutcome::NotFound, LookupOutcome::Found)
    }
}

impl SyncCoordinator {
    /// Searches the stored snapshots, in registration order, for a
    /// resource with this id. No network access.
    ///
    /// The first match wins, both across services and across types
    /// within one service. Every service is still searched so that an id
    /// shared by several resources is reported as ambiguous.
    pub fn find_in_local_graphs(&self, id: &str) -> Result<Option<LocalMatch>, StoreError> {
        let mut first: Option<LocalMatch> = None;
        let mut candidates = 0;

        for service in self.registry.names() {
            let graph = self.store.load(service)?;

            let matches = graph.find_resources(id);
            let Some(resource) = matches.first().map(|r| (*r).clone()) else {
                continue;
            };
            candidates += matches.len();

            if first.is_none() {
                debug!(id, service, "Found in local graph");
                first = Some(LocalMatch {
                    service: service.to_string(),
                    resource,
                    graph,
                    candidates: 0,
                });
            }
        }

        if let Some(found) = first.as_mut() {
            found.candidates = candidates;
            if candidates > 1 {
                warn!(
                    id,
                    service = %found.service,
                    candidates,
                    "Ambiguous id, using {}",
                    found.resource
                );
            }
        }

        Ok(first)
    }

    /// Every locally stored resource with this id, across services.
    pub fn find_all_in_local_graphs(&self, id: &str) -> Result<Vec<(String, Resource)>, StoreError> {
        let mut found = Vec::new();
        for service in self.registry.names() {
            let graph = self.store.load(service)?;
            found.extend(
                graph
                    .find_resources(id)
                    .into_iter()
                    .map(|r| (service.to_string(), r.clone())),
            );
        }
        Ok(found)
    }

    /// Resolves `id` following the cache policy of `mode`.
    pub async fn lookup(&self, id: &str, mode: LookupMode) -> Result<LookupOutcome, SyncError> {
        if let Some(found) = self.find_in_local_graphs(id)? {
            if mode != LookupMode::Refresh {
                return Ok(LookupOutcome::Found(found));
            }

            info!(service = %found.service, "Syncing service for {} type", found.resource.resource_type);
            let graph = self.targeted_sync(&found.service).await?;

            let key = found.resource.key();
            let refreshed = graph.get(&key).cloned();
            if refreshed.is_none() {
                info!(id, service = %found.service, "Resource gone after refresh");
            }

            return Ok(refreshed
                .map(|resource| LocalMatch {
                    service: found.service,
                    resource,
                    graph,
                    candidates: found.candidates,
                })
                .into());
        }

        if mode == LookupMode::LocalOnly {
            return Ok(LookupOutcome::NotFound);
        }

        info!(id, "Cannot resolve resource, running full sync");
        self.full_sync().await?;

        Ok(self.find_in_local_graphs(id)?.into())
    }
}
