//! Vehicle repository interface

use async_trait::async_trait;

use super::model::{PickupPoint, Vehicle};
use crate::domain::DomainResult;

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    /// Persist a new vehicle together with its pickup points
    async fn save(&self, vehicle: Vehicle) -> DomainResult<()>;

    /// Find by id (pickup points loaded)
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Vehicle>>;

    /// Find by normalized plate
    async fn find_by_plate(&self, plate: &str) -> DomainResult<Option<Vehicle>>;

    /// All vehicles of one owner, oldest first
    async fn find_by_owner(&self, owner_id: &str) -> DomainResult<Vec<Vehicle>>;

    /// Update scalar fields (not pickup points)
    async fn update(&self, vehicle: Vehicle) -> DomainResult<()>;

    /// Replace the vehicle's pickup-point list wholesale
    async fn replace_pickup_points(
        &self,
        vehicle_id: &str,
        points: Vec<PickupPoint>,
    ) -> DomainResult<()>;

    /// Add one pickup point
    async fn add_pickup_point(&self, vehicle_id: &str, point: PickupPoint) -> DomainResult<()>;

    /// Update one pickup point; NotFound when absent
    async fn update_pickup_point(&self, vehicle_id: &str, point: PickupPoint) -> DomainResult<()>;

    /// Delete one pickup point; NotFound when absent
    async fn delete_pickup_point(&self, vehicle_id: &str, point_id: &str) -> DomainResult<()>;

    /// Delete the vehicle and its pickup points
    async fn delete(&self, id: &str) -> DomainResult<()>;
}
