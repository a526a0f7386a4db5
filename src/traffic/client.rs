//! TomTom flow-segment API client.

use std::fmt::Debug;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::UpstreamError;
use crate::metrics;

use super::grid::GeoPoint;
use super::types::{FlowSample, FlowSegmentResponse};

/// Longest response body kept in error messages.
const MAX_ERROR_BODY: usize = 200;

/// Source of per-point traffic flow samples.
#[async_trait]
pub trait FlowSource: Send + Sync + Debug {
    /// Look up flow at `point`.
    ///
    /// `Ok(None)` means the provider answered but had no usable flow data.
    async fn fetch_flow(&self, point: GeoPoint) -> Result<Option<FlowSample>, UpstreamError>;
}

/// Client for the TomTom flow-segment-by-point endpoint.
#[derive(Clone)]
pub struct TomTomClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Flow endpoint URL.
    flow_url: String,
    /// API key.
    api_key: String,
}

impl Debug for TomTomClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TomTomClient")
            .field("flow_url", &self.flow_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl TomTomClient {
    /// Create a client from config.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.http_timeout_ms))
            .connect_timeout(Duration::from_millis(config.http_connect_timeout_ms))
            .tcp_nodelay(true)
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(config.http_pool_size)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            http,
            flow_url: config.tomtom_flow_url.clone(),
            api_key: config.tomtom_api_key.clone(),
        })
    }

    /// Get the flow endpoint URL.
    pub fn flow_url(&self) -> &str {
        &self.flow_url
    }
}

#[async_trait]
impl FlowSource for TomTomClient {
    #[instrument(skip(self, point), fields(point = %point))]
    async fn fetch_flow(&self, point: GeoPoint) -> Result<Option<FlowSample>, UpstreamError> {
        let start = Instant::now();
        metrics::inc_upstream_requests();

        let result = self.request_flow(point).await;

        metrics::record_upstream_latency(start);
        if result.is_err() {
            metrics::inc_upstream_failures();
        }
        result
    }
}

impl TomTomClient {
    async fn request_flow(&self, point: GeoPoint) -> Result<Option<FlowSample>, UpstreamError> {
        let point_param = point.to_string();

        let response = self
            .http
            .get(&self.flow_url)
            .query(&[("key", self.api_key.as_str()), ("point", point_param.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: FlowSegmentResponse = serde_json::from_str(&body)
            .map_err(|e| UpstreamError::Parse(format!("{}: {}", e, truncate_body(&body))))?;

        let sample = parsed.into_sample();
        debug!(?sample, "Flow lookup complete");

        Ok(sample)
    }
}

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }

    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
