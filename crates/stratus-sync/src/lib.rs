//! Stratus Sync - Keeping local resource graphs trustworthy
//!
//! Provider clients implement [`ServiceFetcher`]. The [`SyncCoordinator`]
//! fetches them into per-service snapshots and decides, per lookup,
//! whether the cached graphs can answer or a resync is needed.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use stratus_graph::GraphStore;
//! use stratus_sync::{LookupMode, ServiceFetcher, ServiceRegistry, SyncCoordinator};
//!
//! # async fn run(ec2: Arc<dyn ServiceFetcher>, iam: Arc<dyn ServiceFetcher>) -> Result<(), Box<dyn std::error::Error>> {
//! let store = GraphStore::open("/tmp/stratus")?;
//! let registry = ServiceRegistry::new().register(ec2).register(iam);
//! let coordinator = SyncCoordinator::new(registry, store);
//!
//! if let Some(found) = coordinator.lookup("i-0abc", LookupMode::Refresh).await?.found() {
//!     for (parent, distance) in found.graph.parents(&found.resource) {
//!         println!("{}{}", "\t".repeat(distance), parent);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod coordinator;
mod error;
mod lookup;
mod service;

#[cfg(test)]
mod testing;

pub use coordinator::SyncCoordinator;
pub use error::{FetchError, SyncError};
pub use lookup::{LocalMatch, LookupMode, LookupOutcome};
pub use service::{FetchedResources, ServiceFetcher, ServiceRegistry};
