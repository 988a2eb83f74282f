//! Trip repository interface
//!
//! The seat-booking contract: `reserve` must be a single conditional
//! update combining the seat decrement, the duplicate check and every
//! precondition, so parallel requests can never oversell or double-book.
//! Read-then-write sequences are forbidden on that path.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{
    PickupSuggestion, Reservation, ReservationStatus, SuggestionStatus, Trip, TripPickupPoint,
};
use crate::domain::user::PaymentMethod;
use crate::domain::DomainResult;

/// Filters for the public trip listing
#[derive(Debug, Clone, Default)]
pub struct TripFilter {
    /// Substring of the origin (case-insensitive)
    pub departure_point: Option<String>,
    /// Minimum seats still available
    pub min_seats: Option<i32>,
    /// Maximum price per seat
    pub max_price: Option<f64>,
    /// Departure window start
    pub start_time: Option<DateTime<Utc>>,
    /// Departure window end
    pub end_time: Option<DateTime<Utc>>,
}

/// Payload for the atomic reservation insert
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub id: String,
    pub passenger_id: String,
    pub seats: i32,
    pub pickup_points: Vec<String>,
    pub payment_method: PaymentMethod,
}

#[async_trait]
pub trait TripRepository: Send + Sync {
    /// Persist a new trip with its pickup-point snapshot
    async fn save(&self, trip: Trip) -> DomainResult<()>;

    /// Find by id (pickup points loaded, reservations not)
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Trip>>;

    /// Non-terminal trips matching the filter, departure ascending
    async fn list(&self, filter: &TripFilter) -> DomainResult<Vec<Trip>>;

    /// Atomically decrement seats and insert the reservation iff ALL of:
    /// trip exists, `seats_available >= seats`, status is bookable,
    /// the caller is not the driver, and the caller holds no active
    /// (pending/confirmed) reservation on this trip. On success the trip
    /// status is renormalized and the fresh trip is returned. On failure
    /// the root cause is classified into the domain taxonomy
    /// (`TRIP_NOT_FOUND`, `OWN_TRIP`, `TRIP_NOT_AVAILABLE`,
    /// `INSUFFICIENT_SEATS`, `DUPLICATE_RESERVATION`).
    async fn reserve(&self, trip_id: &str, reservation: NewReservation) -> DomainResult<Trip>;

    /// Find one reservation on a trip
    async fn find_reservation(
        &self,
        trip_id: &str,
        reservation_id: &str,
    ) -> DomainResult<Option<Reservation>>;

    /// All reservations of a trip, oldest first
    async fn reservations_for_trip(&self, trip_id: &str) -> DomainResult<Vec<Reservation>>;

    /// Move a reservation to `to` iff its current status is `from`,
    /// optionally returning its seats to the trip (capped at
    /// `seats_total`) and renormalizing trip status, all in one
    /// transaction. Returns the updated reservation, or `Conflict` when
    /// the guard failed because of a concurrent transition.
    async fn transition_reservation(
        &self,
        trip_id: &str,
        reservation_id: &str,
        from: ReservationStatus,
        to: ReservationStatus,
        return_seats: bool,
    ) -> DomainResult<Reservation>;

    /// Cancel the trip: status=cancelled, seats_available=0, every
    /// reservation cancelled. Returns the passengers of previously
    /// active reservations (for the notification fan-out). Idempotent on
    /// an already-cancelled trip (returns an empty list).
    async fn cancel_trip(&self, trip_id: &str) -> DomainResult<Vec<Reservation>>;

    /// Pending suggestion count for one passenger on one trip
    async fn count_pending_suggestions(
        &self,
        trip_id: &str,
        passenger_id: &str,
    ) -> DomainResult<u64>;

    /// Store the suggestion and its mirrored active pickup point together
    async fn add_suggestion(
        &self,
        suggestion: PickupSuggestion,
        mirror: TripPickupPoint,
    ) -> DomainResult<()>;

    /// Find one suggestion on a trip
    async fn find_suggestion(
        &self,
        trip_id: &str,
        suggestion_id: &str,
    ) -> DomainResult<Option<PickupSuggestion>>;

    /// All suggestions on a trip, oldest first
    async fn suggestions_for_trip(&self, trip_id: &str) -> DomainResult<Vec<PickupSuggestion>>;

    /// Settle a pending suggestion and its mirrored point in one
    /// transaction (accepted keeps the point active, rejected rejects it)
    async fn resolve_suggestion(
        &self,
        trip_id: &str,
        suggestion_id: &str,
        verdict: SuggestionStatus,
    ) -> DomainResult<PickupSuggestion>;

    /// Whether the vehicle is referenced by any scheduled/full trip with
    /// a future departure (blocks vehicle deletion)
    async fn vehicle_has_blocking_trips(
        &self,
        vehicle_id: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<bool>;
}
