//! Sample grid around a requested center point.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Offsets in degrees applied independently to latitude and longitude.
pub const GRID_OFFSETS: [f64; 5] = [-0.04, -0.02, 0.0, 0.02, 0.04];

/// Number of points in one sample grid.
pub const GRID_SIZE: usize = GRID_OFFSETS.len() * GRID_OFFSETS.len();

/// WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
}

impl GeoPoint {
    /// Create a point from latitude and longitude.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Point shifted by the given deltas.
    pub fn offset(&self, dlat: f64, dlon: f64) -> Self {
        Self::new(self.lat + dlat, self.lon + dlon)
    }

    /// Finite and within the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Formats as `lat,lon`, the form the flow API expects in `point`.
impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// Build the 5x5 sample grid around `center`.
///
/// Latitude offsets form the outer loop and longitude offsets the inner one,
/// so index `i` corresponds to `(GRID_OFFSETS[i / 5], GRID_OFFSETS[i % 5])`.
pub fn sample_grid(center: GeoPoint) -> Vec<GeoPoint> {
    GRID_OFFSETS
        .iter()
        .flat_map(|&dlat| GRID_OFFSETS.iter().map(move |&dlon| center.offset(dlat, dlon)))
        .collect()
}
