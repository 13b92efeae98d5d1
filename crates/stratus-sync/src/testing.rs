//! In-memory services for coordinator tests.

use crate::error::FetchError;
use crate::service::{FetchedResources, ServiceFetcher};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Serves canned records and counts how often it is asked.
pub(crate) struct StaticService {
    name: String,
    data: Mutex<Option<FetchedResources>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StaticService {
    pub(crate) fn new(name: &str, data: FetchedResources) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            data: Mutex::new(Some(data)),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    /// A service whose every fetch fails.
    pub(crate) fn failing(name: &str) -> Arc<Self> {
        let service = Self::new(name, FetchedResources::default());
        service.set_failing();
        service
    }

    pub(crate) fn set_data(&self, data: FetchedResources) {
        *self.data.lock().unwrap() = Some(data);
    }

    pub(crate) fn set_failing(&self) {
        *self.data.lock().unwrap() = None;
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ServiceFetcher for StaticService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<FetchedResources, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        // Let other tasks interleave, like a real network call would.
        tokio::task::yield_now().await;

        let data = self.data.lock().unwrap().clone();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        data.ok_or_else(|| FetchError::Network(format!("{} unreachable", self.name)))
    }
}
