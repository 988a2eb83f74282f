//! Trip engine
//!
//! Trip publication (both request shapes), the atomic reservation path,
//! the reservation state machine, trip cancellation with its email
//! fan-out, pickup suggestions and the public listing.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::tariff::TariffCalculator;
use crate::application::trips::snapping::snap_route_to_stops;
use crate::application::vehicles::PickupPointInput;
use crate::domain::rating::DriverStats;
use crate::domain::route::GeoPoint;
use crate::domain::trip::{
    NewReservation, PickupSource, PickupSuggestion, Reservation, ReservationAction,
    SuggestionStatus, Transition, Trip, TripFilter, TripPickupPoint, TripPointStatus, TripStatus,
};
use crate::domain::user::{PaymentMethod, Role};
use crate::domain::vehicle::Vehicle;
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::infrastructure::email::EmailSender;
use crate::infrastructure::routing::catalog;
use crate::shared::validations::in_coordinate_bounds;

/// Per-message cap on the cancellation fan-out
const EMAIL_TIMEOUT: Duration = Duration::from_secs(10);

/// Origin/destination request shapes
#[derive(Debug, Clone)]
pub enum TripShape {
    /// Free-text origin and destination
    Legacy { origin: String, destination: String },
    /// Known stops plus the route the driver will follow; the route
    /// snaps to stops and becomes the system pickup-point set
    Stops {
        origin_stop_id: String,
        destination_stop_id: String,
        route: Vec<GeoPoint>,
    },
}

/// Tariff suggestion attached to a trip-create request; when present the
/// chosen price must fall inside the recomputed tolerance band
#[derive(Debug, Clone)]
pub struct TariffAttachment {
    pub distance_km: f64,
    pub duration_minutes: f64,
    pub demand_factor: Option<f64>,
    pub occupancy: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct CreateTripInput {
    pub shape: TripShape,
    /// Defaults to the caller's active vehicle
    pub vehicle_id: Option<String>,
    pub route_description: Option<String>,
    pub departure_at: DateTime<Utc>,
    pub seats_total: i32,
    pub price_per_seat: f64,
    pub distance_km: Option<f64>,
    pub duration_minutes: Option<f64>,
    pub pickup_points: Vec<PickupPointInput>,
    pub tariff: Option<TariffAttachment>,
}

#[derive(Debug, Clone)]
pub struct ReserveInput {
    pub seats: i32,
    pub pickup_points: Vec<String>,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone)]
pub struct SuggestPickupInput {
    pub name: String,
    pub description: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

/// Listing entry: trip plus the driver's aggregate rating
#[derive(Debug, Clone)]
pub struct TripListing {
    pub trip: Trip,
    pub driver_stats: DriverStats,
}

/// One row of the driver-only passenger manifest
#[derive(Debug, Clone)]
pub struct ManifestEntry {
    pub reservation: Reservation,
    pub passenger_name: String,
    pub passenger_phone: String,
    pub passenger_email: String,
}

pub struct TripService {
    repos: Arc<dyn RepositoryProvider>,
    email_sender: Arc<dyn EmailSender>,
    tariff: TariffCalculator,
}

impl TripService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        email_sender: Arc<dyn EmailSender>,
        tariff: TariffCalculator,
    ) -> Self {
        Self {
            repos,
            email_sender,
            tariff,
        }
    }

    // ── Publication ─────────────────────────────────────────────

    pub async fn create_trip(&self, caller_id: &str, input: CreateTripInput) -> DomainResult<Trip> {
        let caller = self
            .repos
            .users()
            .find_by_id(caller_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: caller_id.to_string(),
            })?;
        if !caller.roles.contains(Role::Driver) {
            return Err(DomainError::RoleNotEnabled);
        }

        let vehicle = self
            .select_vehicle(caller_id, input.vehicle_id.as_deref(), &caller.active_vehicle_id)
            .await?;
        let now = Utc::now();
        if !vehicle.documents_valid(now) {
            return Err(DomainError::ExpiredDocument);
        }

        if input.departure_at <= now {
            return Err(DomainError::Validation(
                "departure must be in the future".to_string(),
            ));
        }
        if input.seats_total < 1 || input.seats_total > vehicle.capacity {
            return Err(DomainError::Validation(format!(
                "seats must be between 1 and the vehicle capacity of {}",
                vehicle.capacity
            )));
        }
        if !(input.price_per_seat.is_finite() && input.price_per_seat >= 0.0) {
            return Err(DomainError::Validation(
                "price per seat must be zero or positive".to_string(),
            ));
        }

        if let Some(attachment) = &input.tariff {
            let suggestion = self.tariff.suggest(
                attachment.distance_km,
                attachment.duration_minutes,
                attachment.demand_factor,
                attachment.occupancy,
            )?;
            if !suggestion.accepts(input.price_per_seat) {
                return Err(DomainError::Validation(format!(
                    "price {} is outside the suggested range {}..{}",
                    input.price_per_seat, suggestion.range.min, suggestion.range.max
                )));
            }
        }

        let mut pickup_points = Vec::new();
        for point in &input.pickup_points {
            if point.name.trim().is_empty() || !in_coordinate_bounds(point.lat, point.lng) {
                return Err(DomainError::Validation(format!(
                    "invalid pickup point {}",
                    point.name
                )));
            }
            pickup_points.push(TripPickupPoint {
                id: Uuid::new_v4().to_string(),
                name: point.name.trim().to_string(),
                description: point.description.clone(),
                lat: point.lat,
                lng: point.lng,
                source: PickupSource::Driver,
                status: TripPointStatus::Active,
            });
        }

        let (origin, destination) = match &input.shape {
            TripShape::Legacy {
                origin,
                destination,
            } => {
                if origin.trim().is_empty() || destination.trim().is_empty() {
                    return Err(DomainError::Validation(
                        "origin and destination must not be empty".to_string(),
                    ));
                }
                (origin.trim().to_string(), destination.trim().to_string())
            }
            TripShape::Stops {
                origin_stop_id,
                destination_stop_id,
                route,
            } => {
                if route.len() < 2 {
                    return Err(DomainError::Validation(
                        "route must contain at least two points".to_string(),
                    ));
                }
                let origin_stop =
                    catalog::find_stop(origin_stop_id).ok_or(DomainError::Validation(format!(
                        "unknown origin stop {origin_stop_id}"
                    )))?;
                let destination_stop = catalog::find_stop(destination_stop_id).ok_or(
                    DomainError::Validation(format!("unknown destination stop {destination_stop_id}")),
                )?;

                for stop in snap_route_to_stops(route, catalog::STOPS) {
                    pickup_points.push(TripPickupPoint {
                        id: Uuid::new_v4().to_string(),
                        name: stop.name.to_string(),
                        description: None,
                        lat: stop.lat,
                        lng: stop.lng,
                        source: PickupSource::System,
                        status: TripPointStatus::Active,
                    });
                }
                (
                    origin_stop.name.to_string(),
                    destination_stop.name.to_string(),
                )
            }
        };

        let trip = Trip {
            id: Uuid::new_v4().to_string(),
            driver_id: caller_id.to_string(),
            vehicle_id: vehicle.id.clone(),
            origin,
            destination,
            route_description: input.route_description,
            departure_at: input.departure_at,
            seats_total: input.seats_total,
            seats_available: input.seats_total,
            price_per_seat: input.price_per_seat,
            distance_km: input.distance_km,
            duration_minutes: input.duration_minutes,
            status: TripStatus::Scheduled,
            pickup_points,
            created_at: now,
            updated_at: now,
        };
        self.repos.trips().save(trip.clone()).await?;
        info!(
            "Trip published: {} {} -> {} by {}",
            trip.id, trip.origin, trip.destination, caller_id
        );
        Ok(trip)
    }

    // ── Reservations ────────────────────────────────────────────

    /// The hot path: everything beyond local shape checks happens inside
    /// the repository's single conditional update.
    pub async fn reserve(
        &self,
        caller_id: &str,
        trip_id: &str,
        input: ReserveInput,
    ) -> DomainResult<(Trip, Reservation)> {
        if input.seats < 1 {
            return Err(DomainError::Validation(
                "seats must be at least 1".to_string(),
            ));
        }
        if input.pickup_points.len() != input.seats as usize {
            return Err(DomainError::Validation(
                "one pickup point per seat is required".to_string(),
            ));
        }

        let reservation_id = Uuid::new_v4().to_string();
        let trip = self
            .repos
            .trips()
            .reserve(
                trip_id,
                NewReservation {
                    id: reservation_id.clone(),
                    passenger_id: caller_id.to_string(),
                    seats: input.seats,
                    pickup_points: input.pickup_points,
                    payment_method: input.payment_method,
                },
            )
            .await?;

        let reservation = self
            .repos
            .trips()
            .find_reservation(trip_id, &reservation_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "Reservation",
                field: "id",
                value: reservation_id,
            })?;
        info!(
            "Reservation created: {} on trip {} ({} seats)",
            reservation.id, trip_id, reservation.seats
        );
        Ok((trip, reservation))
    }

    /// Driver confirm/reject or either-side cancel. Terminal states are
    /// idempotent: the unchanged reservation comes back with no error.
    pub async fn transition_reservation(
        &self,
        caller_id: &str,
        trip_id: &str,
        reservation_id: &str,
        action: ReservationAction,
    ) -> DomainResult<Reservation> {
        let trip = self.trip(trip_id).await?;
        let reservation = self
            .repos
            .trips()
            .find_reservation(trip_id, reservation_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "Reservation",
                field: "id",
                value: reservation_id.to_string(),
            })?;

        match action {
            ReservationAction::Confirm | ReservationAction::Reject => {
                if trip.driver_id != caller_id {
                    return Err(DomainError::Forbidden(
                        "only the driver may decide reservations".to_string(),
                    ));
                }
            }
            ReservationAction::Cancel => {
                if trip.driver_id != caller_id && reservation.passenger_id != caller_id {
                    return Err(DomainError::Forbidden(
                        "only the driver or the passenger may cancel".to_string(),
                    ));
                }
            }
        }

        match reservation.status.apply(action) {
            Transition::Idempotent => Ok(reservation),
            Transition::Invalid => Err(DomainError::Validation(format!(
                "cannot {:?} a {} reservation",
                action, reservation.status
            ))),
            Transition::Apply { to, returns_seats } => {
                self.repos
                    .trips()
                    .transition_reservation(
                        trip_id,
                        reservation_id,
                        reservation.status,
                        to,
                        returns_seats,
                    )
                    .await
            }
        }
    }

    // ── Cancellation ────────────────────────────────────────────

    /// Driver-only trip cancellation with a concurrent, best-effort
    /// email fan-out to every passenger holding an active reservation.
    pub async fn cancel_trip(&self, caller_id: &str, trip_id: &str) -> DomainResult<Trip> {
        let trip = self.trip(trip_id).await?;
        if trip.driver_id != caller_id {
            return Err(DomainError::Forbidden(
                "only the driver may cancel the trip".to_string(),
            ));
        }
        if trip.status == TripStatus::Completed {
            return Err(DomainError::TripNotAvailable);
        }

        let dropped = self.repos.trips().cancel_trip(trip_id).await?;
        info!(
            "Trip cancelled: {} ({} active reservations dropped)",
            trip_id,
            dropped.len()
        );

        let mut tasks = JoinSet::new();
        for reservation in dropped {
            let Some(passenger) = self
                .repos
                .users()
                .find_by_id(&reservation.passenger_id)
                .await?
            else {
                continue;
            };
            let sender = self.email_sender.clone();
            let subject = "Viaje cancelado".to_string();
            let body = format!(
                "Hola {}, el viaje {} -> {} del {} fue cancelado por el conductor.",
                passenger.first_name,
                trip.origin,
                trip.destination,
                trip.departure_at.format("%Y-%m-%d %H:%M")
            );
            tasks.spawn(async move {
                let send = sender.send(&passenger.email, &subject, &body);
                match tokio::time::timeout(EMAIL_TIMEOUT, send).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!("cancellation email to {} failed: {}", passenger.email, e),
                    Err(_) => warn!("cancellation email to {} timed out", passenger.email),
                }
            });
        }
        // Fan-out completes before the cancel returns; failures are logged
        while tasks.join_next().await.is_some() {}

        self.trip(trip_id).await
    }

    // ── Pickup suggestions ──────────────────────────────────────

    /// Passenger proposes a boarding point. Capped at three pending
    /// proposals per passenger per trip.
    pub async fn suggest_pickup(
        &self,
        caller_id: &str,
        trip_id: &str,
        input: SuggestPickupInput,
    ) -> DomainResult<PickupSuggestion> {
        let trip = self.trip(trip_id).await?;
        if trip.driver_id == caller_id {
            return Err(DomainError::Forbidden(
                "drivers manage pickup points directly".to_string(),
            ));
        }
        if !trip.is_bookable() {
            return Err(DomainError::TripNotAvailable);
        }
        if input.name.trim().is_empty() || !in_coordinate_bounds(input.lat, input.lng) {
            return Err(DomainError::Validation(
                "suggestion needs a name and valid coordinates".to_string(),
            ));
        }

        let pending = self
            .repos
            .trips()
            .count_pending_suggestions(trip_id, caller_id)
            .await?;
        if pending >= 3 {
            return Err(DomainError::TooManyPendingSuggestions);
        }

        let now = Utc::now();
        let mirror = TripPickupPoint {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            lat: input.lat,
            lng: input.lng,
            source: PickupSource::Passenger,
            status: TripPointStatus::Active,
        };
        let suggestion = PickupSuggestion {
            id: Uuid::new_v4().to_string(),
            trip_id: trip_id.to_string(),
            passenger_id: caller_id.to_string(),
            name: mirror.name.clone(),
            description: input.description,
            lat: input.lat,
            lng: input.lng,
            status: SuggestionStatus::Pending,
            mirror_point_id: mirror.id.clone(),
            created_at: now,
        };
        self.repos
            .trips()
            .add_suggestion(suggestion.clone(), mirror)
            .await?;
        Ok(suggestion)
    }

    /// Driver settles a pending suggestion
    pub async fn resolve_suggestion(
        &self,
        caller_id: &str,
        trip_id: &str,
        suggestion_id: &str,
        accept: bool,
    ) -> DomainResult<PickupSuggestion> {
        let trip = self.trip(trip_id).await?;
        if trip.driver_id != caller_id {
            return Err(DomainError::Forbidden(
                "only the driver may resolve suggestions".to_string(),
            ));
        }
        self.repos
            .trips()
            .find_suggestion(trip_id, suggestion_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "PickupSuggestion",
                field: "id",
                value: suggestion_id.to_string(),
            })?;

        let verdict = if accept {
            SuggestionStatus::Accepted
        } else {
            SuggestionStatus::Rejected
        };
        self.repos
            .trips()
            .resolve_suggestion(trip_id, suggestion_id, verdict)
            .await
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Public listing: non-terminal trips, departure ascending, each
    /// enriched with the driver's aggregate rating.
    pub async fn list(&self, filter: TripFilter) -> DomainResult<Vec<TripListing>> {
        let trips = self.repos.trips().list(&filter).await?;
        let mut listings = Vec::with_capacity(trips.len());
        for trip in trips {
            let driver_stats = self.repos.ratings().driver_stats(&trip.driver_id).await?;
            listings.push(TripListing { trip, driver_stats });
        }
        Ok(listings)
    }

    pub async fn get(&self, trip_id: &str) -> DomainResult<Trip> {
        self.trip(trip_id).await
    }

    /// Driver-only manifest with minimal passenger PII
    pub async fn passengers(
        &self,
        caller_id: &str,
        trip_id: &str,
    ) -> DomainResult<Vec<ManifestEntry>> {
        let trip = self.trip(trip_id).await?;
        if trip.driver_id != caller_id {
            return Err(DomainError::Forbidden(
                "only the driver may read the manifest".to_string(),
            ));
        }

        let reservations = self.repos.trips().reservations_for_trip(trip_id).await?;
        let mut manifest = Vec::with_capacity(reservations.len());
        for reservation in reservations {
            let Some(passenger) = self
                .repos
                .users()
                .find_by_id(&reservation.passenger_id)
                .await?
            else {
                continue;
            };
            manifest.push(ManifestEntry {
                passenger_name: passenger.full_name(),
                passenger_phone: passenger.phone,
                passenger_email: passenger.email,
                reservation,
            });
        }
        Ok(manifest)
    }

    // ── Helpers ─────────────────────────────────────────────────

    async fn trip(&self, trip_id: &str) -> DomainResult<Trip> {
        self.repos
            .trips()
            .find_by_id(trip_id)
            .await?
            .ok_or(DomainError::TripNotFound)
    }

    async fn select_vehicle(
        &self,
        caller_id: &str,
        requested: Option<&str>,
        active: &Option<String>,
    ) -> DomainResult<Vehicle> {
        let vehicle_id = requested
            .map(str::to_string)
            .or_else(|| active.clone())
            .ok_or(DomainError::Validation(
                "no vehicle selected and no active vehicle set".to_string(),
            ))?;
        let vehicle = self
            .repos
            .vehicles()
            .find_by_id(&vehicle_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "Vehicle",
                field: "id",
                value: vehicle_id,
            })?;
        if vehicle.owner_id != caller_id {
            return Err(DomainError::Forbidden(
                "vehicle belongs to another user".to_string(),
            ));
        }
        Ok(vehicle)
    }
}
