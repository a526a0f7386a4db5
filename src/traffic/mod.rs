//! Area traffic sampling.
//!
//! This module handles:
//! - The 5x5 sample grid around a center point
//! - Congestion percentage and level classification
//! - Upstream flow payloads and report entries
//! - The TomTom flow client and a mock source for testing
//! - Bounded-concurrency fan-out over the grid

pub mod aggregator;
pub mod client;
pub mod congestion;
pub mod grid;
pub mod mock;
pub mod types;

pub use aggregator::{AggregationSummary, TrafficAggregator};
pub use client::{FlowSource, TomTomClient};
pub use congestion::{congestion_percent, TrafficLevel};
pub use grid::{sample_grid, GeoPoint, GRID_OFFSETS, GRID_SIZE};
pub use mock::{MockConfig, MockFlowSource, MockResponse};
pub use types::{FlowSample, FlowSegmentResponse, TrafficReportEntry};
