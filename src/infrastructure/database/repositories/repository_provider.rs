//! SeaORM-backed repository provider

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::domain::rating::RatingRepository;
use crate::domain::trip::TripRepository;
use crate::domain::user::{PasswordResetRepository, UserRepository};
use crate::domain::vehicle::VehicleRepository;
use crate::domain::RepositoryProvider;

use super::{
    SeaOrmPasswordResetRepository, SeaOrmRatingRepository, SeaOrmTripRepository,
    SeaOrmUserRepository, SeaOrmVehicleRepository,
};

/// Bundles one repository instance per aggregate over a shared pool
pub struct SeaOrmRepositoryProvider {
    users: Arc<SeaOrmUserRepository>,
    password_resets: Arc<SeaOrmPasswordResetRepository>,
    vehicles: Arc<SeaOrmVehicleRepository>,
    trips: Arc<SeaOrmTripRepository>,
    ratings: Arc<SeaOrmRatingRepository>,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: Arc::new(SeaOrmUserRepository::new(db.clone())),
            password_resets: Arc::new(SeaOrmPasswordResetRepository::new(db.clone())),
            vehicles: Arc::new(SeaOrmVehicleRepository::new(db.clone())),
            trips: Arc::new(SeaOrmTripRepository::new(db.clone())),
            ratings: Arc::new(SeaOrmRatingRepository::new(db)),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn password_resets(&self) -> Arc<dyn PasswordResetRepository> {
        self.password_resets.clone()
    }

    fn vehicles(&self) -> Arc<dyn VehicleRepository> {
        self.vehicles.clone()
    }

    fn trips(&self) -> Arc<dyn TripRepository> {
        self.trips.clone()
    }

    fn ratings(&self) -> Arc<dyn RatingRepository> {
        self.ratings.clone()
    }
}
