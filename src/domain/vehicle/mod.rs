pub mod model;
pub mod repository;

pub use model::{PickupPoint, Vehicle, VehicleStatus};
pub use repository::VehicleRepository;
