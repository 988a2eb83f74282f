//! Trip domain entities: the trip itself, its reservations, pickup
//! points and passenger pickup suggestions.
//!
//! Seat bookkeeping invariant: at all times
//! `seats_available = seats_total - Σ(r.seats for active r)` where active
//! means pending or confirmed. `full` is never a stored fact of its own:
//! it is the normalized face of `scheduled` with zero seats left.

use chrono::{DateTime, Utc};

use crate::domain::user::PaymentMethod;

/// Trip lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripStatus {
    Scheduled,
    Full,
    Cancelled,
    Completed,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Full => "full",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "full" => Self::Full,
            "cancelled" => Self::Cancelled,
            "completed" => Self::Completed,
            _ => Self::Scheduled,
        }
    }

    /// Terminal statuses never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }

    /// Re-derive `scheduled` ⇄ `full` from the seat count. Terminal
    /// statuses pass through untouched.
    pub fn normalized(self, seats_available: i32) -> Self {
        match self {
            Self::Scheduled if seats_available == 0 => Self::Full,
            Self::Full if seats_available > 0 => Self::Scheduled,
            other => other,
        }
    }
}

impl std::fmt::Display for TripStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who contributed a pickup point to the trip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupSource {
    Driver,
    Passenger,
    System,
}

impl PickupSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Driver => "driver",
            Self::Passenger => "passenger",
            Self::System => "system",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "passenger" => Self::Passenger,
            "system" => Self::System,
            _ => Self::Driver,
        }
    }
}

/// Whether a trip pickup point is offered or was withdrawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripPointStatus {
    Active,
    Rejected,
}

impl TripPointStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "rejected" => Self::Rejected,
            _ => Self::Active,
        }
    }
}

/// Boarding coordinate snapshotted onto a trip
#[derive(Debug, Clone, PartialEq)]
pub struct TripPickupPoint {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub source: PickupSource,
    pub status: TripPointStatus,
}

/// Reservation lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "confirmed" => Self::Confirmed,
            "rejected" => Self::Rejected,
            "cancelled" => Self::Cancelled,
            _ => Self::Pending,
        }
    }

    /// Holds seats against the trip
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Cancelled)
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Driver/passenger action on a reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationAction {
    Confirm,
    Reject,
    Cancel,
}

/// Outcome of applying an action to a reservation status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Move to the new status; `returns_seats` when the held seats go
    /// back to the trip
    Apply {
        to: ReservationStatus,
        returns_seats: bool,
    },
    /// Already in (or past) the requested state; return the unchanged body
    Idempotent,
    /// The machine does not define this edge
    Invalid,
}

impl ReservationStatus {
    /// The reservation state machine:
    ///
    /// - `pending` —confirm→ `confirmed` (no seat change)
    /// - `pending` —reject→ `rejected` (seats returned)
    /// - `pending`|`confirmed` —cancel→ `cancelled` (seats returned)
    /// - terminal states absorb every further action
    pub fn apply(self, action: ReservationAction) -> Transition {
        use ReservationAction::*;
        use ReservationStatus::*;
        match (self, action) {
            (Pending, Confirm) => Transition::Apply {
                to: Confirmed,
                returns_seats: false,
            },
            (Pending, Reject) => Transition::Apply {
                to: Rejected,
                returns_seats: true,
            },
            (Pending, Cancel) | (Confirmed, Cancel) => Transition::Apply {
                to: Cancelled,
                returns_seats: true,
            },
            (Confirmed, Confirm) => Transition::Idempotent,
            (Confirmed, Reject) => Transition::Invalid,
            (s, _) if s.is_terminal() => Transition::Idempotent,
            _ => Transition::Invalid,
        }
    }
}

/// Seat reservation on a trip
#[derive(Debug, Clone)]
pub struct Reservation {
    pub id: String,
    pub trip_id: String,
    pub passenger_id: String,
    pub seats: i32,
    /// One boarding point per seat (names of trip pickup points)
    pub pickup_points: Vec<String>,
    pub payment_method: PaymentMethod,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub decision_at: Option<DateTime<Utc>>,
}

/// Status of a passenger pickup suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionStatus {
    Pending,
    Accepted,
    Rejected,
}

impl SuggestionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "accepted" => Self::Accepted,
            "rejected" => Self::Rejected,
            _ => Self::Pending,
        }
    }
}

/// Passenger-proposed boarding point waiting for the driver's verdict.
/// The proposal is mirrored immediately as an active passenger-sourced
/// trip pickup point; the driver's verdict settles both records.
#[derive(Debug, Clone)]
pub struct PickupSuggestion {
    pub id: String,
    pub trip_id: String,
    pub passenger_id: String,
    pub name: String,
    pub description: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub status: SuggestionStatus,
    /// Trip pickup point created alongside this suggestion
    pub mirror_point_id: String,
    pub created_at: DateTime<Utc>,
}

/// Published trip
#[derive(Debug, Clone)]
pub struct Trip {
    pub id: String,
    pub driver_id: String,
    pub vehicle_id: String,
    pub origin: String,
    pub destination: String,
    pub route_description: Option<String>,
    pub departure_at: DateTime<Utc>,
    pub seats_total: i32,
    pub seats_available: i32,
    pub price_per_seat: f64,
    pub distance_km: Option<f64>,
    pub duration_minutes: Option<f64>,
    pub status: TripStatus,
    pub pickup_points: Vec<TripPickupPoint>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    /// Open for new reservations
    pub fn is_bookable(&self) -> bool {
        matches!(self.status, TripStatus::Scheduled | TripStatus::Full)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_normalization_bijection() {
        // scheduled with zero seats becomes full
        assert_eq!(
            TripStatus::Scheduled.normalized(0),
            TripStatus::Full
        );
        // full with seats again becomes scheduled
        assert_eq!(TripStatus::Full.normalized(2), TripStatus::Scheduled);
        // stable cases
        assert_eq!(TripStatus::Scheduled.normalized(3), TripStatus::Scheduled);
        assert_eq!(TripStatus::Full.normalized(0), TripStatus::Full);
        // terminal statuses never flip
        assert_eq!(TripStatus::Cancelled.normalized(0), TripStatus::Cancelled);
        assert_eq!(TripStatus::Cancelled.normalized(5), TripStatus::Cancelled);
        assert_eq!(TripStatus::Completed.normalized(0), TripStatus::Completed);
    }

    #[test]
    fn confirm_from_pending() {
        assert_eq!(
            ReservationStatus::Pending.apply(ReservationAction::Confirm),
            Transition::Apply {
                to: ReservationStatus::Confirmed,
                returns_seats: false
            }
        );
    }

    #[test]
    fn reject_from_pending_returns_seats() {
        assert_eq!(
            ReservationStatus::Pending.apply(ReservationAction::Reject),
            Transition::Apply {
                to: ReservationStatus::Rejected,
                returns_seats: true
            }
        );
    }

    #[test]
    fn cancel_from_pending_and_confirmed_returns_seats() {
        for from in [ReservationStatus::Pending, ReservationStatus::Confirmed] {
            assert_eq!(
                from.apply(ReservationAction::Cancel),
                Transition::Apply {
                    to: ReservationStatus::Cancelled,
                    returns_seats: true
                }
            );
        }
    }

    #[test]
    fn terminal_states_are_idempotent() {
        for terminal in [ReservationStatus::Rejected, ReservationStatus::Cancelled] {
            for action in [
                ReservationAction::Confirm,
                ReservationAction::Reject,
                ReservationAction::Cancel,
            ] {
                assert_eq!(terminal.apply(action), Transition::Idempotent);
            }
        }
    }

    #[test]
    fn confirm_twice_is_idempotent() {
        assert_eq!(
            ReservationStatus::Confirmed.apply(ReservationAction::Confirm),
            Transition::Idempotent
        );
    }

    #[test]
    fn reject_of_confirmed_is_invalid() {
        assert_eq!(
            ReservationStatus::Confirmed.apply(ReservationAction::Reject),
            Transition::Invalid
        );
    }

    #[test]
    fn active_means_holding_seats() {
        assert!(ReservationStatus::Pending.is_active());
        assert!(ReservationStatus::Confirmed.is_active());
        assert!(!ReservationStatus::Rejected.is_active());
        assert!(!ReservationStatus::Cancelled.is_active());
    }

    #[test]
    fn status_parse_roundtrip() {
        for s in [
            TripStatus::Scheduled,
            TripStatus::Full,
            TripStatus::Cancelled,
            TripStatus::Completed,
        ] {
            assert_eq!(TripStatus::parse(s.as_str()), s);
        }
        for s in [
            ReservationStatus::Pending,
            ReservationStatus::Confirmed,
            ReservationStatus::Rejected,
            ReservationStatus::Cancelled,
        ] {
            assert_eq!(ReservationStatus::parse(s.as_str()), s);
        }
    }
}
