//! Mock flow source for unit testing.
//!
//! Serves programmed responses without making network requests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::UpstreamError;

use super::client::FlowSource;
use super::grid::GeoPoint;
use super::types::FlowSample;

/// Programmed outcome for one lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockResponse {
    /// Return this sample.
    Flow(FlowSample),
    /// Provider had no flow data.
    NoData,
    /// Lookup fails with a timeout.
    Fail,
}

/// Configuration for mock source behavior.
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Response for points without an explicit entry.
    pub default_response: MockResponse,
    /// Simulated latency in milliseconds.
    pub latency_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            default_response: MockResponse::NoData,
            latency_ms: 0,
        }
    }
}

/// Mock flow source for testing.
#[derive(Debug, Clone, Default)]
pub struct MockFlowSource {
    /// Mock configuration.
    config: MockConfig,
    /// Responses keyed by the point's `lat,lon` rendering.
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    /// Number of lookups served.
    calls: Arc<AtomicUsize>,
}

impl MockFlowSource {
    /// Create a mock source that answers every point with no data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock source with custom configuration.
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Answer every unprogrammed point with `sample`.
    pub fn with_default_flow(sample: FlowSample) -> Self {
        Self::with_config(MockConfig {
            default_response: MockResponse::Flow(sample),
            ..MockConfig::default()
        })
    }

    /// Fail every unprogrammed point.
    pub fn failing() -> Self {
        Self::with_config(MockConfig {
            default_response: MockResponse::Fail,
            ..MockConfig::default()
        })
    }

    /// Program the response for a point.
    pub fn set_response(&self, point: GeoPoint, response: MockResponse) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(point.to_string(), response);
    }

    /// Number of lookups served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Clear all programmed responses.
    pub fn clear(&self) {
        self.responses.lock().unwrap().clear();
    }
}

#[async_trait]
impl FlowSource for MockFlowSource {
    async fn fetch_flow(&self, point: GeoPoint) -> Result<Option<FlowSample>, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }

        let response = self
            .responses
            .lock()
            .unwrap()
            .get(&point.to_string())
            .copied()
            .unwrap_or(self.config.default_response);

        match response {
            MockResponse::Flow(sample) => Ok(Some(sample)),
            MockResponse::NoData => Ok(None),
            MockResponse::Fail => Err(UpstreamError::Timeout),
        }
    }
}
