//! The fetch capability every synced service provides.
//!
//! Provider clients live outside this crate. They implement
//! `ServiceFetcher` and are listed, in lookup order, in a
//! `ServiceRegistry` handed to the coordinator.

use crate::error::FetchError;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use stratus_core::Resource;
use stratus_graph::{GraphBuilder, Relation, ResourceGraph};

/// One service's resources and relations as returned by its provider.
#[derive(Debug, Clone, Default)]
pub struct FetchedResources {
    pub resources: Vec<Resource>,
    pub relations: Vec<Relation>,
}

impl FetchedResources {
    pub fn new(resources: Vec<Resource>, relations: Vec<Relation>) -> Self {
        Self {
            resources,
            relations,
        }
    }

    /// Assembles a fresh graph from these records.
    pub fn into_graph(self) -> ResourceGraph {
        let mut builder = GraphBuilder::new();
        builder
            .add_resources(self.resources)
            .add_relations(self.relations);
        builder.build()
    }
}

/// Enumerates all resources of one named service.
///
/// Implementations own their timeouts: `fetch` must return, with an
/// error if need be, within a bounded time.
#[async_trait]
pub trait ServiceFetcher: Send + Sync {
    /// Service name, also the key of its stored snapshot.
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<FetchedResources, FetchError>;
}

/// Ordered set of services to sync and search.
///
/// Registration order is lookup order: when an id exists in several
/// services, the first registered one answers.
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    services: Vec<Arc<dyn ServiceFetcher>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a service. A service with the same name is replaced in place.
    pub fn register(mut self, service: Arc<dyn ServiceFetcher>) -> Self {
        match self.services.iter().position(|s| s.name() == service.name()) {
            Some(existing) => self.services[existing] = service,
            None => self.services.push(service),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ServiceFetcher>> {
        self.services.iter().find(|s| s.name() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.services.iter().map(|s| s.name())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ServiceFetcher>> {
        self.services.iter()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
