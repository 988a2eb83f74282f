//! Maps API DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::tariff::TariffSuggestion;
use crate::domain::route::{GeoPoint, RouteCacheEntry, TravelMode};
use crate::domain::DomainError;
use crate::interfaces::http::common::ApiError;

/// Parse a `"lat,lng"` pair
pub fn parse_coord(raw: &str) -> Result<GeoPoint, ApiError> {
    let mut parts = raw.split(',');
    let (Some(lat), Some(lng), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ApiError(DomainError::Validation(format!(
            "expected lat,lng but got {raw}"
        ))));
    };
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| ApiError(DomainError::Validation(format!("invalid latitude {lat}"))))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|_| ApiError(DomainError::Validation(format!("invalid longitude {lng}"))))?;
    if !crate::shared::validations::in_coordinate_bounds(lat, lng) {
        return Err(ApiError(DomainError::Validation(format!(
            "coordinates out of range: {raw}"
        ))));
    }
    Ok(GeoPoint::new(lat, lng))
}

pub fn parse_mode(raw: Option<&str>) -> Result<TravelMode, ApiError> {
    match raw {
        None => Ok(TravelMode::Driving),
        Some("driving") => Ok(TravelMode::Driving),
        Some("walking") => Ok(TravelMode::Walking),
        Some("cycling") => Ok(TravelMode::Cycling),
        Some(other) => Err(ApiError(DomainError::Validation(format!(
            "unknown travel mode {other}"
        )))),
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RouteQuery {
    /// Origin as `lat,lng`
    pub origin: String,
    /// Destination as `lat,lng`
    pub destination: String,
    /// `driving` (default), `walking` or `cycling`
    pub mode: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CalculateRequest {
    pub origin: CoordinateBody,
    pub destination: CoordinateBody,
    /// `driving` (default), `walking` or `cycling`
    pub mode: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CoordinateBody {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RouteResponse {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub encoded_polyline: Option<String>,
    pub provider: String,
    pub fetched_at: DateTime<Utc>,
}

impl From<RouteCacheEntry> for RouteResponse {
    fn from(entry: RouteCacheEntry) -> Self {
        Self {
            distance_meters: entry.summary.distance_meters,
            duration_seconds: entry.summary.duration_seconds,
            encoded_polyline: entry.summary.encoded_polyline,
            provider: entry.summary.provider.to_string(),
            fetched_at: entry.fetched_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RouteSuggestResponse {
    pub route: RouteResponse,
    /// Suggested per-seat fare derived from the route
    #[schema(value_type = Object)]
    pub tariff: TariffSuggestion,
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_coord_accepts_lat_lng() {
        let p = parse_coord("4.8612,-74.0334").unwrap();
        assert!((p.lat - 4.8612).abs() < 1e-9);
        assert!((p.lng + 74.0334).abs() < 1e-9);
    }

    #[test]
    fn parse_coord_rejects_garbage() {
        assert!(parse_coord("4.86").is_err());
        assert!(parse_coord("a,b").is_err());
        assert!(parse_coord("1,2,3").is_err());
        assert!(parse_coord("95.0,10.0").is_err());
    }

    #[test]
    fn parse_mode_defaults_to_driving() {
        assert!(matches!(parse_mode(None), Ok(TravelMode::Driving)));
        assert!(matches!(parse_mode(Some("walking")), Ok(TravelMode::Walking)));
        assert!(parse_mode(Some("flying")).is_err());
    }
}
