//! Vehicle lifecycle service
//!
//! Creation, field-wise update with the material-change verification
//! reset, activation, deletion safety against future trips, pickup-point
//! CRUD and the owner-driven review transitions.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::config::VehicleConfig;
use crate::domain::trip::TripRepository;
use crate::domain::user::{Role, User};
use crate::domain::vehicle::{PickupPoint, Vehicle, VehicleStatus};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::shared::validations::{in_coordinate_bounds, is_valid_plate, normalize_plate};

/// Pickup point payload
#[derive(Debug, Clone)]
pub struct PickupPointInput {
    pub name: String,
    pub description: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

/// Vehicle creation payload (photo urls are blob-store relative paths,
/// already resolved by the upload layer)
#[derive(Debug, Clone)]
pub struct VehicleInput {
    pub plate: String,
    pub brand: String,
    pub model: String,
    pub capacity: i32,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub vehicle_photo_url: Option<String>,
    pub soat_photo_url: Option<String>,
    pub soat_expiration: chrono::DateTime<Utc>,
    pub license_number: String,
    pub license_expiration: chrono::DateTime<Utc>,
    pub license_photo_url: Option<String>,
    pub pickup_points: Vec<PickupPointInput>,
}

/// Field-wise partial update
#[derive(Debug, Clone, Default)]
pub struct VehicleUpdate {
    pub plate: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub capacity: Option<i32>,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub vehicle_photo_url: Option<String>,
    pub soat_photo_url: Option<String>,
    pub soat_expiration: Option<chrono::DateTime<Utc>>,
    pub license_number: Option<String>,
    pub license_expiration: Option<chrono::DateTime<Utc>>,
    pub license_photo_url: Option<String>,
    /// Replaces the whole list when present
    pub pickup_points: Option<Vec<PickupPointInput>>,
}

pub struct VehicleService {
    repos: Arc<dyn RepositoryProvider>,
    trips: Arc<dyn TripRepository>,
    config: VehicleConfig,
}

impl VehicleService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        trips: Arc<dyn TripRepository>,
        config: VehicleConfig,
    ) -> Self {
        Self {
            repos,
            trips,
            config,
        }
    }

    // ── Validation ──────────────────────────────────────────────

    /// Full dry-run validation of a creation payload, including the
    /// plate-uniqueness probe. Backs `POST /vehicles/validate`.
    pub async fn validate_input(&self, input: &VehicleInput) -> DomainResult<()> {
        let plate = normalize_plate(&input.plate);
        if !is_valid_plate(&plate) {
            return Err(DomainError::Validation(format!(
                "plate {plate} does not match the accepted formats"
            )));
        }
        if input.capacity < self.config.min_capacity || input.capacity > self.config.max_capacity {
            return Err(DomainError::Validation(format!(
                "capacity must be between {} and {}",
                self.config.min_capacity, self.config.max_capacity
            )));
        }
        let now = Utc::now();
        if input.soat_expiration < now || input.license_expiration < now {
            return Err(DomainError::ExpiredDocument);
        }
        validate_points(&input.pickup_points)?;

        if self.repos.vehicles().find_by_plate(&plate).await?.is_some() {
            return Err(DomainError::DuplicatePlate);
        }
        Ok(())
    }

    // ── Lifecycle ───────────────────────────────────────────────

    /// Create the vehicle, grant the owner the driver role and adopt it
    /// as active vehicle when none is set.
    pub async fn create(&self, owner_id: &str, input: VehicleInput) -> DomainResult<Vehicle> {
        self.validate_input(&input).await?;

        let now = Utc::now();
        let vehicle = Vehicle {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            plate: normalize_plate(&input.plate),
            brand: input.brand,
            model: input.model,
            capacity: input.capacity,
            year: input.year,
            color: input.color,
            vehicle_photo_url: input.vehicle_photo_url,
            soat_photo_url: input.soat_photo_url,
            license_photo_url: input.license_photo_url,
            soat_expiration: input.soat_expiration,
            license_number: input.license_number,
            license_expiration: input.license_expiration,
            status: VehicleStatus::Pending,
            status_updated_at: now,
            requested_review_at: None,
            reviewed_at: None,
            reviewed_by: None,
            verification_notes: None,
            pickup_points: materialize_points(input.pickup_points),
            created_at: now,
            updated_at: now,
        };
        self.repos.vehicles().save(vehicle.clone()).await?;

        let mut owner = self.owner(owner_id).await?;
        owner.roles.grant_driver();
        if owner.active_vehicle_id.is_none() {
            owner.active_vehicle_id = Some(vehicle.id.clone());
        }
        owner.updated_at = now;
        self.repos.users().update(owner).await?;

        info!("Vehicle created: {} ({})", vehicle.id, vehicle.plate);
        Ok(vehicle)
    }

    /// Field-wise update. A material change (identity or document
    /// fields) resets verification to `pending`.
    pub async fn update(
        &self,
        caller_id: &str,
        vehicle_id: &str,
        update: VehicleUpdate,
    ) -> DomainResult<Vehicle> {
        let mut vehicle = self.owned_vehicle(caller_id, vehicle_id).await?;
        let now = Utc::now();
        let mut material = false;

        if let Some(plate) = update.plate {
            let plate = normalize_plate(&plate);
            if !is_valid_plate(&plate) {
                return Err(DomainError::Validation(format!(
                    "plate {plate} does not match the accepted formats"
                )));
            }
            if plate != vehicle.plate {
                if self.repos.vehicles().find_by_plate(&plate).await?.is_some() {
                    return Err(DomainError::DuplicatePlate);
                }
                vehicle.plate = plate;
                material = true;
            }
        }
        if let Some(brand) = update.brand {
            material |= brand != vehicle.brand;
            vehicle.brand = brand;
        }
        if let Some(model) = update.model {
            material |= model != vehicle.model;
            vehicle.model = model;
        }
        if let Some(capacity) = update.capacity {
            if capacity < self.config.min_capacity || capacity > self.config.max_capacity {
                return Err(DomainError::Validation(format!(
                    "capacity must be between {} and {}",
                    self.config.min_capacity, self.config.max_capacity
                )));
            }
            material |= capacity != vehicle.capacity;
            vehicle.capacity = capacity;
        }
        if let Some(year) = update.year {
            vehicle.year = Some(year);
        }
        if let Some(color) = update.color {
            vehicle.color = Some(color);
        }
        if let Some(url) = update.vehicle_photo_url {
            vehicle.vehicle_photo_url = Some(url);
        }
        if let Some(url) = update.soat_photo_url {
            vehicle.soat_photo_url = Some(url);
            material = true;
        }
        if let Some(expiration) = update.soat_expiration {
            material |= expiration != vehicle.soat_expiration;
            vehicle.soat_expiration = expiration;
        }
        if let Some(number) = update.license_number {
            material |= number != vehicle.license_number;
            vehicle.license_number = number;
        }
        if let Some(expiration) = update.license_expiration {
            material |= expiration != vehicle.license_expiration;
            vehicle.license_expiration = expiration;
        }
        if let Some(url) = update.license_photo_url {
            vehicle.license_photo_url = Some(url);
            material = true;
        }

        if material {
            vehicle.reset_verification(now);
        }
        vehicle.updated_at = now;
        self.repos.vehicles().update(vehicle.clone()).await?;

        if let Some(points) = update.pickup_points {
            validate_points(&points)?;
            let points = materialize_points(points);
            self.repos
                .vehicles()
                .replace_pickup_points(vehicle_id, points.clone())
                .await?;
            vehicle.pickup_points = points;
        }

        Ok(vehicle)
    }

    /// Set the caller's active vehicle; requires `verified` status and
    /// unexpired documents.
    pub async fn activate(&self, caller_id: &str, vehicle_id: &str) -> DomainResult<User> {
        let vehicle = self.owned_vehicle(caller_id, vehicle_id).await?;
        let now = Utc::now();
        if vehicle.status != VehicleStatus::Verified {
            return Err(DomainError::DocumentsInvalid);
        }
        if !vehicle.documents_valid(now) {
            return Err(DomainError::ExpiredDocument);
        }

        let mut owner = self.owner(caller_id).await?;
        owner.active_vehicle_id = Some(vehicle.id);
        owner.updated_at = now;
        self.repos.users().update(owner.clone()).await?;
        Ok(owner)
    }

    /// Delete the vehicle unless a future scheduled/full trip still
    /// references it; afterwards recompute the owner's driver
    /// capability and active vehicle.
    pub async fn delete(&self, caller_id: &str, vehicle_id: &str) -> DomainResult<User> {
        let vehicle = self.owned_vehicle(caller_id, vehicle_id).await?;
        let now = Utc::now();

        if self
            .trips
            .vehicle_has_blocking_trips(&vehicle.id, now)
            .await?
        {
            return Err(DomainError::BlockedByActiveTrips);
        }

        self.repos.vehicles().delete(&vehicle.id).await?;
        info!("Vehicle deleted: {} ({})", vehicle.id, vehicle.plate);

        let mut owner = self.owner(caller_id).await?;
        let remaining = self.repos.vehicles().find_by_owner(caller_id).await?;
        if remaining.is_empty() {
            owner.roles.revoke_driver();
            owner.active_role = Role::Passenger;
            owner.active_vehicle_id = None;
        } else {
            // Prefer a vehicle with unexpired documents, oldest otherwise
            let next = remaining
                .iter()
                .find(|v| v.documents_valid(now))
                .unwrap_or(&remaining[0]);
            owner.active_vehicle_id = Some(next.id.clone());
        }
        owner.updated_at = now;
        self.repos.users().update(owner.clone()).await?;
        Ok(owner)
    }

    // ── Review transitions ──────────────────────────────────────

    /// Owner submits the vehicle for review
    pub async fn request_review(&self, caller_id: &str, vehicle_id: &str) -> DomainResult<Vehicle> {
        let mut vehicle = self.owned_vehicle(caller_id, vehicle_id).await?;
        vehicle.request_review(Utc::now())?;
        self.repos.vehicles().update(vehicle.clone()).await?;
        Ok(vehicle)
    }

    /// Admin verdict on a vehicle under review. The admin endpoint
    /// itself lives outside this core; the transition contract is
    /// enforced here.
    pub async fn apply_review(
        &self,
        vehicle_id: &str,
        verdict: VehicleStatus,
        reviewer: &str,
        notes: Option<String>,
    ) -> DomainResult<Vehicle> {
        let mut vehicle = self.vehicle(vehicle_id).await?;
        vehicle.apply_review(verdict, reviewer, notes, Utc::now())?;
        self.repos.vehicles().update(vehicle.clone()).await?;
        Ok(vehicle)
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn list_for_owner(&self, owner_id: &str) -> DomainResult<Vec<Vehicle>> {
        self.repos.vehicles().find_by_owner(owner_id).await
    }

    pub async fn get_owned(&self, caller_id: &str, vehicle_id: &str) -> DomainResult<Vehicle> {
        self.owned_vehicle(caller_id, vehicle_id).await
    }

    // ── Pickup points ───────────────────────────────────────────

    pub async fn add_pickup_point(
        &self,
        caller_id: &str,
        vehicle_id: &str,
        input: PickupPointInput,
    ) -> DomainResult<PickupPoint> {
        self.owned_vehicle(caller_id, vehicle_id).await?;
        validate_points(std::slice::from_ref(&input))?;
        let point = PickupPoint {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            description: input.description,
            lat: input.lat,
            lng: input.lng,
        };
        self.repos
            .vehicles()
            .add_pickup_point(vehicle_id, point.clone())
            .await?;
        Ok(point)
    }

    pub async fn update_pickup_point(
        &self,
        caller_id: &str,
        vehicle_id: &str,
        point_id: &str,
        input: PickupPointInput,
    ) -> DomainResult<PickupPoint> {
        self.owned_vehicle(caller_id, vehicle_id).await?;
        validate_points(std::slice::from_ref(&input))?;
        let point = PickupPoint {
            id: point_id.to_string(),
            name: input.name.trim().to_string(),
            description: input.description,
            lat: input.lat,
            lng: input.lng,
        };
        self.repos
            .vehicles()
            .update_pickup_point(vehicle_id, point.clone())
            .await?;
        Ok(point)
    }

    pub async fn delete_pickup_point(
        &self,
        caller_id: &str,
        vehicle_id: &str,
        point_id: &str,
    ) -> DomainResult<()> {
        self.owned_vehicle(caller_id, vehicle_id).await?;
        self.repos
            .vehicles()
            .delete_pickup_point(vehicle_id, point_id)
            .await
    }

    // ── Helpers ─────────────────────────────────────────────────

    async fn vehicle(&self, vehicle_id: &str) -> DomainResult<Vehicle> {
        self.repos
            .vehicles()
            .find_by_id(vehicle_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "Vehicle",
                field: "id",
                value: vehicle_id.to_string(),
            })
    }

    async fn owned_vehicle(&self, caller_id: &str, vehicle_id: &str) -> DomainResult<Vehicle> {
        let vehicle = self.vehicle(vehicle_id).await?;
        if vehicle.owner_id != caller_id {
            return Err(DomainError::Forbidden(
                "vehicle belongs to another user".to_string(),
            ));
        }
        Ok(vehicle)
    }

    async fn owner(&self, owner_id: &str) -> DomainResult<User> {
        self.repos
            .users()
            .find_by_id(owner_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: owner_id.to_string(),
            })
    }
}

fn validate_points(points: &[PickupPointInput]) -> DomainResult<()> {
    for point in points {
        if point.name.trim().is_empty() {
            return Err(DomainError::Validation(
                "pickup point name must not be empty".to_string(),
            ));
        }
        if !in_coordinate_bounds(point.lat, point.lng) {
            return Err(DomainError::Validation(format!(
                "pickup point {} has out-of-range coordinates",
                point.name
            )));
        }
    }
    Ok(())
}

fn materialize_points(points: Vec<PickupPointInput>) -> Vec<PickupPoint> {
    points
        .into_iter()
        .map(|p| PickupPoint {
            id: Uuid::new_v4().to_string(),
            name: p.name.trim().to_string(),
            description: p.description,
            lat: p.lat,
            lng: p.lng,
        })
        .collect()
}
