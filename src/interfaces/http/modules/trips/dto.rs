//! Trip API DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::trips::{
    CreateTripInput, ManifestEntry, TariffAttachment, TripListing, TripShape,
};
use crate::application::vehicles::PickupPointInput;
use crate::domain::rating::DriverStats;
use crate::domain::route::GeoPoint;
use crate::domain::trip::{PickupSuggestion, Reservation, Trip, TripFilter, TripPickupPoint};
use crate::domain::DomainError;
use crate::interfaces::http::common::ApiError;
use crate::interfaces::http::modules::vehicles::dto::PickupPointRequest;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GeoPointRequest {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TariffAttachmentRequest {
    pub distance_km: f64,
    pub duration_minutes: f64,
    pub demand_factor: Option<f64>,
    pub occupancy: Option<u32>,
}

/// Trip creation. Two shapes are accepted: free-text
/// `origin`/`destination`, or `origin_stop_id`/`destination_stop_id`
/// plus a `route` of at least two points that snaps to known stops.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTripRequest {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub origin_stop_id: Option<String>,
    pub destination_stop_id: Option<String>,
    pub route: Option<Vec<GeoPointRequest>>,
    pub vehicle_id: Option<String>,
    pub route_description: Option<String>,
    pub departure_at: DateTime<Utc>,
    #[validate(range(min = 1))]
    pub seats_total: i32,
    pub price_per_seat: f64,
    pub distance_km: Option<f64>,
    pub duration_minutes: Option<f64>,
    #[serde(default)]
    pub pickup_points: Vec<PickupPointRequest>,
    pub tariff: Option<TariffAttachmentRequest>,
}

impl CreateTripRequest {
    pub fn into_input(self) -> Result<CreateTripInput, ApiError> {
        let shape = match (
            &self.origin_stop_id,
            &self.destination_stop_id,
            &self.route,
        ) {
            (Some(origin_stop_id), Some(destination_stop_id), Some(route)) => TripShape::Stops {
                origin_stop_id: origin_stop_id.clone(),
                destination_stop_id: destination_stop_id.clone(),
                route: route
                    .iter()
                    .map(|p| GeoPoint::new(p.lat, p.lng))
                    .collect(),
            },
            (None, None, None) => match (&self.origin, &self.destination) {
                (Some(origin), Some(destination)) => TripShape::Legacy {
                    origin: origin.clone(),
                    destination: destination.clone(),
                },
                _ => {
                    return Err(ApiError(DomainError::Validation(
                        "either origin/destination or the stops shape is required".to_string(),
                    )))
                }
            },
            _ => {
                return Err(ApiError(DomainError::Validation(
                    "the stops shape needs origin_stop_id, destination_stop_id and route"
                        .to_string(),
                )))
            }
        };

        Ok(CreateTripInput {
            shape,
            vehicle_id: self.vehicle_id,
            route_description: self.route_description,
            departure_at: self.departure_at,
            seats_total: self.seats_total,
            price_per_seat: self.price_per_seat,
            distance_km: self.distance_km,
            duration_minutes: self.duration_minutes,
            pickup_points: self
                .pickup_points
                .into_iter()
                .map(|p| PickupPointInput {
                    name: p.name,
                    description: p.description,
                    lat: p.lat,
                    lng: p.lng,
                })
                .collect(),
            tariff: self.tariff.map(|t| TariffAttachment {
                distance_km: t.distance_km,
                duration_minutes: t.duration_minutes,
                demand_factor: t.demand_factor,
                occupancy: t.occupancy,
            }),
        })
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReservationRequest {
    #[validate(range(min = 1))]
    pub seats: i32,
    /// One boarding point per seat
    pub pickup_points: Vec<String>,
    /// `cash` or `nequi`
    pub payment_method: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PickupSuggestionRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub description: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

/// Trip listing filters
#[derive(Debug, Deserialize, IntoParams)]
pub struct TripsQuery {
    /// Substring of the origin
    pub departure_point: Option<String>,
    /// Minimum seats still available
    pub min_seats: Option<i32>,
    /// Maximum price per seat
    pub max_price: Option<f64>,
    /// Departure window start (RFC 3339)
    pub start_time: Option<DateTime<Utc>>,
    /// Departure window end (RFC 3339)
    pub end_time: Option<DateTime<Utc>>,
}

impl From<TripsQuery> for TripFilter {
    fn from(q: TripsQuery) -> Self {
        Self {
            departure_point: q.departure_point,
            min_seats: q.min_seats,
            max_price: q.max_price,
            start_time: q.start_time,
            end_time: q.end_time,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TripPickupPointResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub source: String,
    pub status: String,
}

impl From<TripPickupPoint> for TripPickupPointResponse {
    fn from(p: TripPickupPoint) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            lat: p.lat,
            lng: p.lng,
            source: p.source.as_str().to_string(),
            status: p.status.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DriverStatsResponse {
    pub average_score: f64,
    pub rating_count: u64,
}

impl From<DriverStats> for DriverStatsResponse {
    fn from(s: DriverStats) -> Self {
        Self {
            average_score: s.average_score,
            rating_count: s.rating_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TripResponse {
    pub id: String,
    pub driver: String,
    pub vehicle: String,
    pub origin: String,
    pub destination: String,
    pub route_description: Option<String>,
    pub departure_at: DateTime<Utc>,
    pub seats_total: i32,
    pub seats_available: i32,
    pub price_per_seat: f64,
    pub distance_km: Option<f64>,
    pub duration_minutes: Option<f64>,
    pub status: String,
    pub pickup_points: Vec<TripPickupPointResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_rating: Option<DriverStatsResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Trip> for TripResponse {
    fn from(t: Trip) -> Self {
        Self {
            id: t.id,
            driver: t.driver_id,
            vehicle: t.vehicle_id,
            origin: t.origin,
            destination: t.destination,
            route_description: t.route_description,
            departure_at: t.departure_at,
            seats_total: t.seats_total,
            seats_available: t.seats_available,
            price_per_seat: t.price_per_seat,
            distance_km: t.distance_km,
            duration_minutes: t.duration_minutes,
            status: t.status.as_str().to_string(),
            pickup_points: t.pickup_points.into_iter().map(Into::into).collect(),
            driver_rating: None,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

impl From<TripListing> for TripResponse {
    fn from(listing: TripListing) -> Self {
        let mut response: TripResponse = listing.trip.into();
        response.driver_rating = Some(listing.driver_stats.into());
        response
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReservationResponse {
    pub id: String,
    pub trip: String,
    pub passenger: String,
    pub seats: i32,
    pub pickup_points: Vec<String>,
    pub payment_method: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub decision_at: Option<DateTime<Utc>>,
}

impl From<Reservation> for ReservationResponse {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            trip: r.trip_id,
            passenger: r.passenger_id,
            seats: r.seats,
            pickup_points: r.pickup_points,
            payment_method: r.payment_method.as_str().to_string(),
            status: r.status.as_str().to_string(),
            created_at: r.created_at,
            decision_at: r.decision_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReservationCreatedResponse {
    pub reservation: ReservationResponse,
    pub trip: TripResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PickupSuggestionResponse {
    pub id: String,
    pub trip: String,
    pub passenger: String,
    pub name: String,
    pub description: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<PickupSuggestion> for PickupSuggestionResponse {
    fn from(s: PickupSuggestion) -> Self {
        Self {
            id: s.id,
            trip: s.trip_id,
            passenger: s.passenger_id,
            name: s.name,
            description: s.description,
            lat: s.lat,
            lng: s.lng,
            status: s.status.as_str().to_string(),
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ManifestEntryResponse {
    pub reservation: ReservationResponse,
    pub passenger_name: String,
    pub passenger_phone: String,
    pub passenger_email: String,
}

impl From<ManifestEntry> for ManifestEntryResponse {
    fn from(e: ManifestEntry) -> Self {
        Self {
            reservation: e.reservation.into(),
            passenger_name: e.passenger_name,
            passenger_phone: e.passenger_phone,
            passenger_email: e.passenger_email,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TariffSuggestRequest {
    pub distance_km: f64,
    pub duration_minutes: f64,
    pub demand_factor: Option<f64>,
    pub occupancy: Option<u32>,
}
