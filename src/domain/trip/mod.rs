pub mod model;
pub mod repository;

pub use model::{
    PickupSource, PickupSuggestion, Reservation, ReservationAction, ReservationStatus,
    SuggestionStatus, Transition, Trip, TripPickupPoint, TripPointStatus, TripStatus,
};
pub use repository::{NewReservation, TripFilter, TripRepository};
