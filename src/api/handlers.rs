//! HTTP API handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tracing::instrument;

use crate::error::ApiError;
use crate::metrics;
use crate::traffic::{GeoPoint, TrafficAggregator, TrafficReportEntry};

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Grid aggregator backed by the flow source.
    pub aggregator: Arc<TrafficAggregator>,
    /// Center used when the query omits coordinates.
    pub default_center: GeoPoint,
    /// Prometheus handle, if a recorder was installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state.
    pub fn new(aggregator: TrafficAggregator, default_center: GeoPoint) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            default_center,
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for the `/metrics` endpoint.
    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }
}

/// Raw `/traffic` query parameters.
///
/// Built from the raw key/value pairs so repeated keys and bad numbers both
/// end up as an `ApiError`. The first occurrence of a key wins.
#[derive(Debug, Default)]
pub struct TrafficQuery {
    /// Center latitude.
    pub lat: Option<String>,
    /// Center longitude.
    pub lon: Option<String>,
}

impl TrafficQuery {
    /// Collect `lat`/`lon` from decoded query pairs, ignoring other keys.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "lat" => &mut query.lat,
                "lon" => &mut query.lon,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }

    /// Resolve the center point, falling back to `default` per coordinate.
    pub fn center(&self, default: GeoPoint) -> Result<GeoPoint, ApiError> {
        let lat = parse_coordinate("lat", self.lat.as_deref(), default.lat, 90.0)?;
        let lon = parse_coordinate("lon", self.lon.as_deref(), default.lon, 180.0)?;
        Ok(GeoPoint::new(lat, lon))
    }
}

fn parse_coordinate(
    param: &'static str,
    raw: Option<&str>,
    default: f64,
    limit: f64,
) -> Result<f64, ApiError> {
    let Some(raw) = raw.map(str::trim) else {
        return Ok(default);
    };

    let invalid = |reason| ApiError::InvalidQuery {
        param,
        value: raw.to_string(),
        reason,
    };

    let value: f64 = raw.parse().map_err(|_| invalid("not a number"))?;
    if !value.is_finite() {
        return Err(invalid("must be a finite number"));
    }
    if value.abs() > limit {
        return Err(invalid("out of range"));
    }

    Ok(value)
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Traffic report handler.
///
/// Always answers 200 with a (possibly empty) array unless the coordinates
/// themselves are unusable.
#[instrument(skip(state))]
pub async fn traffic(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<TrafficReportEntry>>, ApiError> {
    metrics::inc_traffic_requests();

    let query = TrafficQuery::from_pairs(pairs);
    let center = query.center(state.default_center)?;
    let entries = state.aggregator.aggregate(center).await;

    Ok(Json(entries))
}

/// Prometheus scrape handler - 404 when no recorder is installed.
pub async fn prometheus(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
