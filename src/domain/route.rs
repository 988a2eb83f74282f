//! Route value objects shared by the provider adapters, the cache and
//! the trip engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Travel mode requested from a route provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Driving,
    Walking,
    Cycling,
}

impl Default for TravelMode {
    fn default() -> Self {
        Self::Driving
    }
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Walking => "walking",
            Self::Cycling => "cycling",
        }
    }
}

/// Geographic coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance in meters (haversine)
    pub fn distance_meters(&self, other: &GeoPoint) -> f64 {
        const EARTH_RADIUS_M: f64 = 6_371_000.0;
        let (lat1, lng1) = (self.lat.to_radians(), self.lng.to_radians());
        let (lat2, lng2) = (other.lat.to_radians(), other.lng.to_radians());
        let dlat = lat2 - lat1;
        let dlng = lng2 - lng1;
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().asin()
    }
}

/// What a route provider returns for one origin/destination pair
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub encoded_polyline: Option<String>,
    pub provider: &'static str,
}

/// Immutable cached snapshot of a provider result
#[derive(Debug, Clone)]
pub struct RouteCacheEntry {
    pub summary: RouteSummary,
    pub fetched_at: DateTime<Utc>,
}

/// Known transit stop used as a snap target for the stops-shaped trip
/// creation and served by the catalog endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct Stop {
    pub id: &'static str,
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_zero_for_same_point() {
        let p = GeoPoint::new(4.8612, -74.0334);
        assert!(p.distance_meters(&p) < 1e-6);
    }

    #[test]
    fn haversine_known_distance() {
        // Universidad de La Sabana -> Portal Norte is roughly 12 km
        let sabana = GeoPoint::new(4.8612, -74.0334);
        let portal = GeoPoint::new(4.7546, -74.0459);
        let d = sabana.distance_meters(&portal);
        assert!(d > 11_000.0 && d < 13_500.0, "got {d}");
    }

    #[test]
    fn haversine_symmetric() {
        let a = GeoPoint::new(4.86, -74.03);
        let b = GeoPoint::new(4.70, -74.05);
        let ab = a.distance_meters(&b);
        let ba = b.distance_meters(&a);
        assert!((ab - ba).abs() < 1e-6);
    }
}
