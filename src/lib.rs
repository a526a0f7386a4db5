//! Area traffic congestion service.
//!
//! Given a center coordinate, this library samples a 5x5 grid of points
//! around it, looks up live flow for each point from the TomTom traffic API,
//! and reports a congestion level per point.
//!
//! # Congestion
//!
//! ```text
//! current speed:    30 km/h
//! free-flow speed:  60 km/h
//! ─────────────────────────
//! congestion:       100 - round(30 / 60 * 100) = 50%  -> Medium
//! ```
//!
//! Above 50% is `High`, above 25% is `Medium`, anything else is `Low`.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`traffic`]: Grid sampling, congestion math and the upstream client
//! - [`api`]: HTTP API for the traffic report, health and metrics
//! - [`metrics`]: Prometheus counters and latency histograms
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod traffic;
pub mod utils;

pub use config::Config;
pub use error::{AggregatorError, Result};
