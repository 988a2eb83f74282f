//! Repository provider: one handle that hands out every repository,
//! so services depend on a single injected capability.

use std::sync::Arc;

use super::rating::RatingRepository;
use super::trip::TripRepository;
use super::user::{PasswordResetRepository, UserRepository};
use super::vehicle::VehicleRepository;

pub trait RepositoryProvider: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;
    fn password_resets(&self) -> Arc<dyn PasswordResetRepository>;
    fn vehicles(&self) -> Arc<dyn VehicleRepository>;
    fn trips(&self) -> Arc<dyn TripRepository>;
    fn ratings(&self) -> Arc<dyn RatingRepository>;
}
