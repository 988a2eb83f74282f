//! Vehicle API DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::vehicles::{
    decorate, PickupPointInput, VehicleInput, VehicleMeta, VehicleUpdate,
};
use crate::domain::vehicle::{PickupPoint, Vehicle};
use crate::interfaces::http::common::ApiError;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PickupPointRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub description: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 5, max = 10))]
    pub plate: String,
    #[validate(length(min = 1, max = 60))]
    pub brand: String,
    #[validate(length(min = 1, max = 60))]
    pub model: String,
    pub capacity: i32,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub vehicle_photo_url: Option<String>,
    pub soat_photo_url: Option<String>,
    pub soat_expiration: DateTime<Utc>,
    #[validate(length(min = 1, max = 60))]
    pub license_number: String,
    pub license_expiration: DateTime<Utc>,
    pub license_photo_url: Option<String>,
    #[serde(default)]
    pub pickup_points: Vec<PickupPointRequest>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateVehicleRequest {
    pub plate: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub capacity: Option<i32>,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub vehicle_photo_url: Option<String>,
    pub soat_photo_url: Option<String>,
    pub soat_expiration: Option<DateTime<Utc>>,
    pub license_number: Option<String>,
    pub license_expiration: Option<DateTime<Utc>>,
    pub license_photo_url: Option<String>,
    pub pickup_points: Option<Vec<PickupPointRequest>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PickupPointResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

impl From<PickupPoint> for PickupPointResponse {
    fn from(p: PickupPoint) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            lat: p.lat,
            lng: p.lng,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VehicleResponse {
    pub id: String,
    pub owner: String,
    pub plate: String,
    pub brand: String,
    pub model: String,
    pub capacity: i32,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub vehicle_photo_url: Option<String>,
    pub soat_photo_url: Option<String>,
    pub license_photo_url: Option<String>,
    pub soat_expiration: DateTime<Utc>,
    pub license_number: String,
    pub license_expiration: DateTime<Utc>,
    pub status: String,
    pub status_updated_at: DateTime<Utc>,
    pub requested_review_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub verification_notes: Option<String>,
    pub pickup_points: Vec<PickupPointResponse>,
    /// Computed decoration: document statuses, warnings, abilities
    #[schema(value_type = Object)]
    pub meta: VehicleMeta,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Vehicle> for VehicleResponse {
    fn from(v: Vehicle) -> Self {
        let meta = decorate(&v, Utc::now());
        Self {
            id: v.id,
            owner: v.owner_id,
            plate: v.plate,
            brand: v.brand,
            model: v.model,
            capacity: v.capacity,
            year: v.year,
            color: v.color,
            vehicle_photo_url: v.vehicle_photo_url,
            soat_photo_url: v.soat_photo_url,
            license_photo_url: v.license_photo_url,
            soat_expiration: v.soat_expiration,
            license_number: v.license_number,
            license_expiration: v.license_expiration,
            status: v.status.as_str().to_string(),
            status_updated_at: v.status_updated_at,
            requested_review_at: v.requested_review_at,
            reviewed_at: v.reviewed_at,
            verification_notes: v.verification_notes,
            pickup_points: v.pickup_points.into_iter().map(Into::into).collect(),
            meta,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}

fn points_from_requests(points: Vec<PickupPointRequest>) -> Vec<PickupPointInput> {
    points
        .into_iter()
        .map(|p| PickupPointInput {
            name: p.name,
            description: p.description,
            lat: p.lat,
            lng: p.lng,
        })
        .collect()
}

/// Merge the JSON payload with uploaded document paths. `uploaded` maps
/// multipart field names (`soat_photo`, `license_photo`, `vehicle_photo`)
/// to blob-store relative paths; an uploaded file wins over a URL field.
pub fn vehicle_input_from_request(
    request: CreateVehicleRequest,
    uploaded: &[(String, String)],
) -> Result<VehicleInput, ApiError> {
    let find = |field: &str| {
        uploaded
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, path)| path.clone())
    };

    Ok(VehicleInput {
        plate: request.plate,
        brand: request.brand,
        model: request.model,
        capacity: request.capacity,
        year: request.year,
        color: request.color,
        vehicle_photo_url: find("vehicle_photo").or(request.vehicle_photo_url),
        soat_photo_url: find("soat_photo").or(request.soat_photo_url),
        soat_expiration: request.soat_expiration,
        license_number: request.license_number,
        license_expiration: request.license_expiration,
        license_photo_url: find("license_photo").or(request.license_photo_url),
        pickup_points: points_from_requests(request.pickup_points),
    })
}

/// Same merge for the partial update
pub fn vehicle_update_from_request(
    request: UpdateVehicleRequest,
    uploaded: &[(String, String)],
) -> VehicleUpdate {
    let find = |field: &str| {
        uploaded
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, path)| path.clone())
    };

    VehicleUpdate {
        plate: request.plate,
        brand: request.brand,
        model: request.model,
        capacity: request.capacity,
        year: request.year,
        color: request.color,
        vehicle_photo_url: find("vehicle_photo").or(request.vehicle_photo_url),
        soat_photo_url: find("soat_photo").or(request.soat_photo_url),
        soat_expiration: request.soat_expiration,
        license_number: request.license_number,
        license_expiration: request.license_expiration,
        license_photo_url: find("license_photo").or(request.license_photo_url),
        pickup_points: request.pickup_points.map(points_from_requests),
    }
}
