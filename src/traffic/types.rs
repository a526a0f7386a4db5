//! Upstream payloads and report entries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::congestion::{congestion_percent, TrafficLevel};
use super::grid::GeoPoint;

/// Flow-segment response from the TomTom traffic API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlowSegmentResponse {
    /// Flow data for the road segment nearest to the point.
    #[serde(rename = "flowSegmentData", default)]
    pub flow_segment_data: Option<FlowSegmentData>,
}

impl FlowSegmentResponse {
    /// Usable flow sample, or `None` when the flow object is missing or empty.
    pub fn into_sample(self) -> Option<FlowSample> {
        self.flow_segment_data
            .filter(|flow| !flow.is_empty())
            .map(FlowSample::from)
    }
}

/// Flow data for one road segment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlowSegmentData {
    /// Current average speed.
    #[serde(rename = "currentSpeed", default)]
    pub current_speed: Option<f64>,
    /// Speed expected under free-flow conditions.
    #[serde(rename = "freeFlowSpeed", default)]
    pub free_flow_speed: Option<f64>,
    /// Current travel time in seconds.
    #[serde(rename = "currentTravelTime", default)]
    pub current_travel_time: Option<f64>,
    /// Free-flow travel time in seconds.
    #[serde(rename = "freeFlowTravelTime", default)]
    pub free_flow_travel_time: Option<f64>,
    /// Provider confidence in `0.0..=1.0`.
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Whether the segment is closed.
    #[serde(rename = "roadClosure", default)]
    pub road_closure: Option<bool>,
    /// Any other fields the provider sent.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FlowSegmentData {
    /// True when the provider sent an empty object.
    pub fn is_empty(&self) -> bool {
        self.current_speed.is_none()
            && self.free_flow_speed.is_none()
            && self.current_travel_time.is_none()
            && self.free_flow_travel_time.is_none()
            && self.confidence.is_none()
            && self.road_closure.is_none()
            && self.extra.is_empty()
    }
}

/// Speeds extracted from one upstream lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowSample {
    /// Current speed, 0 when absent.
    pub current_speed: i64,
    /// Free-flow speed, 1 when absent.
    pub free_flow_speed: i64,
}

impl FlowSample {
    /// Create a sample from explicit speeds.
    pub const fn new(current_speed: i64, free_flow_speed: i64) -> Self {
        Self {
            current_speed,
            free_flow_speed,
        }
    }
}

impl From<FlowSegmentData> for FlowSample {
    fn from(flow: FlowSegmentData) -> Self {
        Self {
            current_speed: flow.current_speed.map_or(0, |s| s.round() as i64),
            free_flow_speed: flow.free_flow_speed.map_or(1, |s| s.round() as i64),
        }
    }
}

/// Congestion report for one grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficReportEntry {
    /// Sample latitude.
    pub lat: f64,
    /// Sample longitude.
    pub lon: f64,
    /// Classification derived from `congestion_percent`.
    pub traffic_level: TrafficLevel,
    /// Congestion in `0..=100`.
    pub congestion_percent: u8,
    /// Current speed as reported upstream.
    pub current_speed: i64,
    /// Free-flow speed as reported upstream.
    pub free_flow_speed: i64,
}

impl TrafficReportEntry {
    /// Derive the report entry for a sampled point.
    pub fn from_sample(point: GeoPoint, sample: FlowSample) -> Self {
        let congestion = congestion_percent(sample.current_speed, sample.free_flow_speed);

        Self {
            lat: point.lat,
            lon: point.lon,
            traffic_level: TrafficLevel::from_congestion(congestion),
            congestion_percent: congestion,
            current_speed: sample.current_speed,
            free_flow_speed: sample.free_flow_speed,
        }
    }
}
