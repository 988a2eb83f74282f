//! SeaORM entity definitions

pub mod password_reset;
pub mod rating;
pub mod reservation;
pub mod trip;
pub mod trip_pickup_point;
pub mod trip_pickup_suggestion;
pub mod user;
pub mod vehicle;
pub mod vehicle_pickup_point;
