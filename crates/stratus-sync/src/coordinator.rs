//! Targeted and full synchronization of service graphs.
//!
//! A sync fetches a service's resources, builds a fresh graph and
//! replaces that service's snapshot. Full sync runs one worker per
//! service; each worker saves on its own, so a failing service never
//! takes its siblings' snapshots down with it.

use crate::error::SyncError;
use crate::service::{ServiceFetcher, ServiceRegistry};
use futures_util::future::join_all;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;
use stratus_graph::{GraphStore, ResourceGraph};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Drives syncs of the registered services into a GraphStore.
pub struct SyncCoordinator {
    pub(crate) registry: ServiceRegistry,
    pub(crate) store: GraphStore,
    /// One writer lock per service; syncs of the same service serialize.
    writers: HashMap<String, Arc<Mutex<()>>>,
}

impl SyncCoordinator {
    pub fn new(registry: ServiceRegistry, store: GraphStore) -> Self {
        let writers = registry
            .names()
            .map(|name| (name.to_string(), Arc::new(Mutex::new(()))))
            .collect();

        Self {
            registry,
            store,
            writers,
        }
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// Refreshes exactly one service and returns its new graph.
    pub async fn targeted_sync(&self, service: &str) -> Result<ResourceGraph, SyncError> {
        let (fetcher, writer) = self.worker_parts(service)?;
        sync_service(fetcher, self.store.clone(), writer).await
    }

    /// Refreshes every registered service.
    ///
    /// Services are fetched concurrently. If any of them fails, the first
    /// failure in registration order is returned; services that did
    /// succeed keep their newly saved snapshots.
    pub async fn full_sync(&self) -> Result<BTreeMap<String, ResourceGraph>, SyncError> {
        let start = Instant::now();
        info!(services = self.registry.len(), "Starting full sync");

        let mut names = Vec::with_capacity(self.registry.len());
        let mut workers = Vec::with_capacity(self.registry.len());
        for name in self.registry.names() {
            let (fetcher, writer) = self.worker_parts(name)?;
            names.push(name.to_string());
            workers.push(tokio::spawn(sync_service(fetcher, self.store.clone(), writer)));
        }

        let mut graphs = BTreeMap::new();
        let mut first_error = None;

        for (name, joined) in names.into_iter().zip(join_all(workers).await) {
            let result = joined.map_err(|e| SyncError::Worker {
                service: name.clone(),
                message: e.to_string(),
            });

            match result.and_then(|synced| synced) {
                Ok(graph) => {
                    graphs.insert(name, graph);
                }
                Err(e) => {
                    warn!(service = %name, error = %e, "Service sync failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        info!(
            services = graphs.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Full sync complete"
        );
        Ok(graphs)
    }

    fn worker_parts(&self, service: &str) -> Result<(Arc<dyn ServiceFetcher>, Arc<Mutex<()>>), SyncError> {
        let fetcher = self
            .registry
            .get(service)
            .cloned()
            .ok_or_else(|| SyncError::UnknownService(service.to_string()))?;
        let writer = self
            .writers
            .get(service)
            .cloned()
            .ok_or_else(|| SyncError::UnknownService(service.to_string()))?;
        Ok((fetcher, writer))
    }
}

/// Fetches one service and replaces its snapshot.
///
/// The writer lock is held from fetch to save so two syncs of the same
/// service cannot interleave their generations.
async fn sync_service(
    fetcher: Arc<dyn ServiceFetcher>,
    store: GraphStore,
    writer: Arc<Mutex<()>>,
) -> Result<ResourceGraph, SyncError> {
    let _guard = writer.lock().await;
    let service = fetcher.name().to_string();

    debug!(service = %service, "Fetching resources");
    let fetched = fetcher.fetch().await.map_err(|source| SyncError::Fetch {
        service: service.clone(),
        source,
    })?;

    // sled insert and flush block on disk
    let graph = fetched.into_graph();
    let (graph, saved) = {
        let name = service.clone();
        tokio::task::spawn_blocking(move || {
            let saved = store.save(&name, &graph);
            (graph, saved)
        })
        .await
        .map_err(|e| SyncError::Worker {
            service: service.clone(),
            message: e.to_string(),
        })?
    };
    saved?;

    info!(
        service = %service,
        resources = graph.resource_count(),
        relations = graph.relation_count(),
        "Service synced"
    );
    Ok(graph)
}
