//! SeaORM implementation of VehicleRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::domain::vehicle::{PickupPoint, Vehicle, VehicleRepository, VehicleStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{vehicle, vehicle_pickup_point};

pub struct SeaOrmVehicleRepository {
    db: DatabaseConnection,
}

impl SeaOrmVehicleRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load_points(&self, vehicle_id: &str) -> DomainResult<Vec<PickupPoint>> {
        let models = vehicle_pickup_point::Entity::find()
            .filter(vehicle_pickup_point::Column::VehicleId.eq(vehicle_id))
            .order_by_asc(vehicle_pickup_point::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(point_to_domain).collect())
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn point_to_domain(m: vehicle_pickup_point::Model) -> PickupPoint {
    PickupPoint {
        id: m.id,
        name: m.name,
        description: m.description,
        lat: m.lat,
        lng: m.lng,
    }
}

fn point_to_active(vehicle_id: &str, p: &PickupPoint) -> vehicle_pickup_point::ActiveModel {
    vehicle_pickup_point::ActiveModel {
        id: Set(p.id.clone()),
        vehicle_id: Set(vehicle_id.to_string()),
        name: Set(p.name.clone()),
        description: Set(p.description.clone()),
        lat: Set(p.lat),
        lng: Set(p.lng),
    }
}

pub(crate) fn model_to_domain(m: vehicle::Model, points: Vec<PickupPoint>) -> Vehicle {
    Vehicle {
        id: m.id,
        owner_id: m.owner_id,
        plate: m.plate,
        brand: m.brand,
        model: m.model,
        capacity: m.capacity,
        year: m.year,
        color: m.color,
        vehicle_photo_url: m.vehicle_photo_url,
        soat_photo_url: m.soat_photo_url,
        license_photo_url: m.license_photo_url,
        soat_expiration: m.soat_expiration,
        license_number: m.license_number,
        license_expiration: m.license_expiration,
        status: VehicleStatus::parse(&m.status),
        status_updated_at: m.status_updated_at,
        requested_review_at: m.requested_review_at,
        reviewed_at: m.reviewed_at,
        reviewed_by: m.reviewed_by,
        verification_notes: m.verification_notes,
        pickup_points: points,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn domain_to_active(v: &Vehicle) -> vehicle::ActiveModel {
    vehicle::ActiveModel {
        id: Set(v.id.clone()),
        owner_id: Set(v.owner_id.clone()),
        plate: Set(v.plate.clone()),
        brand: Set(v.brand.clone()),
        model: Set(v.model.clone()),
        capacity: Set(v.capacity),
        year: Set(v.year),
        color: Set(v.color.clone()),
        vehicle_photo_url: Set(v.vehicle_photo_url.clone()),
        soat_photo_url: Set(v.soat_photo_url.clone()),
        license_photo_url: Set(v.license_photo_url.clone()),
        soat_expiration: Set(v.soat_expiration),
        license_number: Set(v.license_number.clone()),
        license_expiration: Set(v.license_expiration),
        status: Set(v.status.as_str().to_string()),
        status_updated_at: Set(v.status_updated_at),
        requested_review_at: Set(v.requested_review_at),
        reviewed_at: Set(v.reviewed_at),
        reviewed_by: Set(v.reviewed_by.clone()),
        verification_notes: Set(v.verification_notes.clone()),
        created_at: Set(v.created_at),
        updated_at: Set(v.updated_at),
    }
}

// ── VehicleRepository impl ──────────────────────────────────────

#[async_trait]
impl VehicleRepository for SeaOrmVehicleRepository {
    async fn save(&self, v: Vehicle) -> DomainResult<()> {
        debug!("Saving vehicle: {} ({})", v.id, v.plate);
        let txn = self.db.begin().await?;
        domain_to_active(&v).insert(&txn).await?;
        for point in &v.pickup_points {
            point_to_active(&v.id, point).insert(&txn).await?;
        }
        txn.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Vehicle>> {
        let Some(model) = vehicle::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let points = self.load_points(id).await?;
        Ok(Some(model_to_domain(model, points)))
    }

    async fn find_by_plate(&self, plate: &str) -> DomainResult<Option<Vehicle>> {
        let Some(model) = vehicle::Entity::find()
            .filter(vehicle::Column::Plate.eq(plate))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };
        let points = self.load_points(&model.id.clone()).await?;
        Ok(Some(model_to_domain(model, points)))
    }

    async fn find_by_owner(&self, owner_id: &str) -> DomainResult<Vec<Vehicle>> {
        let models = vehicle::Entity::find()
            .filter(vehicle::Column::OwnerId.eq(owner_id))
            .order_by_asc(vehicle::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let mut vehicles = Vec::with_capacity(models.len());
        for model in models {
            let points = self.load_points(&model.id.clone()).await?;
            vehicles.push(model_to_domain(model, points));
        }
        Ok(vehicles)
    }

    async fn update(&self, v: Vehicle) -> DomainResult<()> {
        let existing = vehicle::Entity::find_by_id(&v.id).one(&self.db).await?;
        if existing.is_none() {
            return Err(DomainError::NotFound {
                entity: "Vehicle",
                field: "id",
                value: v.id.clone(),
            });
        }
        domain_to_active(&v).update(&self.db).await?;
        Ok(())
    }

    async fn replace_pickup_points(
        &self,
        vehicle_id: &str,
        points: Vec<PickupPoint>,
    ) -> DomainResult<()> {
        let txn = self.db.begin().await?;
        vehicle_pickup_point::Entity::delete_many()
            .filter(vehicle_pickup_point::Column::VehicleId.eq(vehicle_id))
            .exec(&txn)
            .await?;
        for point in &points {
            point_to_active(vehicle_id, point).insert(&txn).await?;
        }
        txn.commit().await?;
        Ok(())
    }

    async fn add_pickup_point(&self, vehicle_id: &str, point: PickupPoint) -> DomainResult<()> {
        point_to_active(vehicle_id, &point).insert(&self.db).await?;
        Ok(())
    }

    async fn update_pickup_point(&self, vehicle_id: &str, point: PickupPoint) -> DomainResult<()> {
        let existing = vehicle_pickup_point::Entity::find_by_id(&point.id)
            .filter(vehicle_pickup_point::Column::VehicleId.eq(vehicle_id))
            .one(&self.db)
            .await?;
        if existing.is_none() {
            return Err(DomainError::NotFound {
                entity: "PickupPoint",
                field: "id",
                value: point.id.clone(),
            });
        }
        point_to_active(vehicle_id, &point).update(&self.db).await?;
        Ok(())
    }

    async fn delete_pickup_point(&self, vehicle_id: &str, point_id: &str) -> DomainResult<()> {
        let result = vehicle_pickup_point::Entity::delete_many()
            .filter(vehicle_pickup_point::Column::Id.eq(point_id))
            .filter(vehicle_pickup_point::Column::VehicleId.eq(vehicle_id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(DomainError::NotFound {
                entity: "PickupPoint",
                field: "id",
                value: point_id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let txn = self.db.begin().await?;
        vehicle_pickup_point::Entity::delete_many()
            .filter(vehicle_pickup_point::Column::VehicleId.eq(id))
            .exec(&txn)
            .await?;
        let result = vehicle::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(DomainError::NotFound {
                entity: "Vehicle",
                field: "id",
                value: id.to_string(),
            });
        }
        txn.commit().await?;
        Ok(())
    }
}
