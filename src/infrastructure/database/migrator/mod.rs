//! Database migrator

use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users;
mod m20250301_000002_create_password_resets;
mod m20250301_000003_create_vehicles;
mod m20250301_000004_create_vehicle_pickup_points;
mod m20250301_000005_create_trips;
mod m20250301_000006_create_trip_pickup_points;
mod m20250301_000007_create_reservations;
mod m20250301_000008_create_trip_pickup_suggestions;
mod m20250301_000009_create_ratings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users::Migration),
            Box::new(m20250301_000002_create_password_resets::Migration),
            Box::new(m20250301_000003_create_vehicles::Migration),
            Box::new(m20250301_000004_create_vehicle_pickup_points::Migration),
            Box::new(m20250301_000005_create_trips::Migration),
            Box::new(m20250301_000006_create_trip_pickup_points::Migration),
            Box::new(m20250301_000007_create_reservations::Migration),
            Box::new(m20250301_000008_create_trip_pickup_suggestions::Migration),
            Box::new(m20250301_000009_create_ratings::Migration),
        ]
    }
}
