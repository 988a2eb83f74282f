//! SeaORM repository implementations

mod password_reset_repository;
mod rating_repository;
mod repository_provider;
mod trip_repository;
mod user_repository;
mod vehicle_repository;

pub use password_reset_repository::SeaOrmPasswordResetRepository;
pub use rating_repository::SeaOrmRatingRepository;
pub use repository_provider::SeaOrmRepositoryProvider;
pub use trip_repository::SeaOrmTripRepository;
pub use user_repository::SeaOrmUserRepository;
pub use vehicle_repository::SeaOrmVehicleRepository;
