//! Rule-based tsunami risk classification for the Indian Ocean basin
//!
//! Only shallow, large events inside the basin box can reach `High`.
//! `Moderate` applies anywhere in the world. Inputs are never clamped;
//! out-of-range values just run through the same comparisons.

use crate::models::{Coordinates, RiskLevel, RiskReport, SeismicEvent};

/// Minimum magnitude for a `High` rating (inclusive)
pub const HIGH_MIN_MAGNITUDE: f64 = 7.5;
/// Depth must be strictly below this for a `High` rating
pub const HIGH_MAX_DEPTH_KM: f64 = 70.0;

/// Basin gate, exclusive on all four sides
pub const BASIN_MIN_LONGITUDE: f64 = 40.0;
pub const BASIN_MAX_LONGITUDE: f64 = 110.0;
pub const BASIN_MIN_LATITUDE: f64 = -10.0;
pub const BASIN_MAX_LATITUDE: f64 = 30.0;

/// Minimum magnitude for a `Moderate` rating (inclusive)
pub const MODERATE_MIN_MAGNITUDE: f64 = 6.5;
/// Depth must be strictly below this for a `Moderate` rating
pub const MODERATE_MAX_DEPTH_KM: f64 = 150.0;

/// Stateless classifier handle for callers that prefer a value to a free function
#[derive(Debug, Clone, Copy, Default)]
pub struct TsunamiRiskClassifier;

impl TsunamiRiskClassifier {
    pub fn new() -> Self {
        TsunamiRiskClassifier
    }

    pub fn classify(&self, event: &SeismicEvent) -> RiskReport {
        classify(event)
    }
}

/// Whether a point lies strictly inside the Indian Ocean / Andaman Sea box
pub fn in_basin(longitude: f64, latitude: f64) -> bool {
    BASIN_MIN_LONGITUDE < longitude
        && longitude < BASIN_MAX_LONGITUDE
        && BASIN_MIN_LATITUDE < latitude
        && latitude < BASIN_MAX_LATITUDE
}

/// Assign a risk tier from raw event parameters. First matching rule wins.
pub fn assess(magnitude: f64, depth_km: f64, longitude: f64, latitude: f64) -> RiskLevel {
    if magnitude >= HIGH_MIN_MAGNITUDE
        && depth_km < HIGH_MAX_DEPTH_KM
        && in_basin(longitude, latitude)
    {
        RiskLevel::High
    } else if magnitude >= MODERATE_MIN_MAGNITUDE && depth_km < MODERATE_MAX_DEPTH_KM {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

/// Classify a seismic event into a risk report
pub fn classify(event: &SeismicEvent) -> RiskReport {
    let risk = assess(
        event.magnitude(),
        event.depth_km(),
        event.longitude(),
        event.latitude(),
    );

    RiskReport {
        place: event.place().to_string(),
        magnitude: event.magnitude(),
        depth_km: event.depth_km(),
        coordinates: Coordinates {
            lat: event.latitude(),
            lon: event.longitude(),
        },
        risk,
        time: event.time().clone(),
    }
}
