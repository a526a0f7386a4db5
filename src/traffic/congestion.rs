//! Congestion percentage and traffic level classification.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Congestion above this percentage is `High`.
pub const HIGH_THRESHOLD: u8 = 50;

/// Congestion above this percentage (and up to `HIGH_THRESHOLD`) is `Medium`.
pub const MEDIUM_THRESHOLD: u8 = 25;

/// Coarse traffic classification for a sample point.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, Default,
)]
pub enum TrafficLevel {
    /// Congestion at or below 25%.
    #[default]
    Low,
    /// Congestion above 25% and at most 50%.
    Medium,
    /// Congestion above 50%.
    High,
}

impl TrafficLevel {
    /// Classify a congestion percentage.
    pub fn from_congestion(congestion: u8) -> Self {
        if congestion > HIGH_THRESHOLD {
            TrafficLevel::High
        } else if congestion > MEDIUM_THRESHOLD {
            TrafficLevel::Medium
        } else {
            TrafficLevel::Low
        }
    }
}

/// Percentage by which current speed falls short of free-flow speed.
///
/// Computes `100 - round(current / free_flow * 100)` clamped to `0..=100`.
/// A free-flow speed of zero or below is treated as 1, and a negative current
/// speed as 0.
pub fn congestion_percent(current_speed: i64, free_flow_speed: i64) -> u8 {
    let divisor = free_flow_speed.max(1) as f64;
    let current = current_speed.max(0) as f64;
    let ratio_pct = (current / divisor * 100.0).round();

    (100.0 - ratio_pct).clamp(0.0, 100.0) as u8
}
