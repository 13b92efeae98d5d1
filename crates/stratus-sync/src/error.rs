//! Error types for fetching and syncing.

use std::time::Duration;
use stratus_graph::StoreError;
use thiserror::Error;

/// Why a service could not enumerate its resources.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Request throttled by provider")]
    Throttled,

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Provider error: {0}")]
    Provider(String),
}

#[derive(Error, Debug)]
pub enum SyncError {
    /// A service fetch failed; the enclosing sync is reported as failed.
    #[error("Failed to sync service '{service}': {source}")]
    Fetch {
        service: String,
        #[source]
        source: FetchError,
    },

    #[error("Snapshot store error: {0}")]
    Store(#[from] StoreError),

    #[error("Unknown service '{0}'")]
    UnknownService(String),

    /// The task syncing a service panicked or was cancelled.
    #[error("Sync worker for '{service}' stopped: {message}")]
    Worker { service: String, message: String },
}

impl SyncError {
    /// Name of the service this error is about, if any.
    pub fn service(&self) -> Option<&str> {
        match self {
            SyncError::Fetch { service, .. } | SyncError::Worker { service, .. } => Some(service),
            SyncError::UnknownService(service) => Some(service),
            SyncError::Store(_) => None,
        }
    }
}
