//! Core business entities, repository traits, and value objects

pub mod error;
pub mod rating;
pub mod repositories;
pub mod route;
pub mod trip;
pub mod user;
pub mod vehicle;

// Re-export commonly used types
pub use error::{DomainError, DomainResult};
pub use repositories::RepositoryProvider;
pub use rating::{DriverStats, RatingRepository};
pub use route::{GeoPoint, RouteCacheEntry, RouteSummary, Stop, TravelMode};
pub use trip::{
    PickupSource, PickupSuggestion, Reservation, ReservationStatus, SuggestionStatus, Trip,
    TripFilter, TripPickupPoint, TripPointStatus, TripRepository, TripStatus,
};
pub use user::{PasswordReset, PasswordResetRepository, PaymentMethod, Role, RoleSet, User, UserRepository};
pub use vehicle::{PickupPoint, Vehicle, VehicleRepository, VehicleStatus};
