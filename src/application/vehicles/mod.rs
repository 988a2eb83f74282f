pub mod decoration;
pub mod service;

pub use decoration::{decorate, DocumentStatus, VehicleMeta};
pub use service::{PickupPointInput, VehicleInput, VehicleService, VehicleUpdate};
