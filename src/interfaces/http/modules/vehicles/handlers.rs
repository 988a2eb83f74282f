//! Vehicle API handlers
//!
//! Create/update accept JSON or multipart; uploaded documents go to the
//! blob store first and every blob saved in a failed call is rolled
//! back.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use validator::Validate;

use super::dto::{
    vehicle_input_from_request, vehicle_update_from_request, CreateVehicleRequest,
    PickupPointRequest, PickupPointResponse, UpdateVehicleRequest, VehicleResponse,
};
use crate::application::vehicles::PickupPointInput;
use crate::domain::DomainError;
use crate::interfaces::http::common::{ApiError, JsonOrMultipart, UploadedFile, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::modules::ApiState;

/// MIME types accepted for document uploads
const ALLOWED_MIME: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/heic",
    "image/heif",
];

/// Push uploads to the blob store, enforcing the size cap and MIME
/// allowlist. Returns (field, relative path) pairs.
async fn store_uploads(
    state: &ApiState,
    files: &[UploadedFile],
) -> Result<Vec<(String, String)>, ApiError> {
    let max_bytes = state.uploads.max_size_mb * 1024 * 1024;
    let mut stored = Vec::new();
    for file in files {
        if file.bytes.len() as u64 > max_bytes {
            rollback_uploads(state, &stored).await;
            return Err(ApiError(DomainError::Validation(format!(
                "file {} exceeds the {} MiB limit",
                file.filename, state.uploads.max_size_mb
            ))));
        }
        if !ALLOWED_MIME.contains(&file.content_type.as_str()) {
            rollback_uploads(state, &stored).await;
            return Err(ApiError(DomainError::Validation(format!(
                "unsupported content type {}",
                file.content_type
            ))));
        }
        match state.blob_store.save(&file.filename, &file.bytes).await {
            Ok(path) => stored.push((file.field.clone(), path)),
            Err(e) => {
                rollback_uploads(state, &stored).await;
                return Err(ApiError(e));
            }
        }
    }
    Ok(stored)
}

async fn rollback_uploads(state: &ApiState, stored: &[(String, String)]) {
    for (_, path) in stored {
        let _ = state.blob_store.delete(path).await;
    }
}

#[utoipa::path(
    get,
    path = "/vehicles",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Caller's vehicles", body = Vec<VehicleResponse>))
)]
pub async fn list_vehicles(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<VehicleResponse>>, ApiError> {
    let vehicles = state.vehicles.list_for_owner(&user.user_id).await?;
    Ok(Json(vehicles.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/vehicles",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    request_body = CreateVehicleRequest,
    responses(
        (status = 201, description = "Vehicle created", body = VehicleResponse),
        (status = 400, description = "Validation error or expired documents"),
        (status = 409, description = "Duplicate plate")
    )
)]
pub async fn create_vehicle(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    body: JsonOrMultipart<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<VehicleResponse>), ApiError> {
    body.payload
        .validate()
        .map_err(|e| ApiError(DomainError::Validation(e.to_string())))?;

    let stored = store_uploads(&state, &body.files).await?;
    let input = match vehicle_input_from_request(body.payload, &stored) {
        Ok(input) => input,
        Err(e) => {
            rollback_uploads(&state, &stored).await;
            return Err(e);
        }
    };

    match state.vehicles.create(&user.user_id, input).await {
        Ok(vehicle) => Ok((StatusCode::CREATED, Json(vehicle.into()))),
        Err(e) => {
            rollback_uploads(&state, &stored).await;
            Err(ApiError(e))
        }
    }
}

#[utoipa::path(
    post,
    path = "/vehicles/validate",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    request_body = CreateVehicleRequest,
    responses(
        (status = 200, description = "Payload is valid"),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Duplicate plate")
    )
)]
pub async fn validate_vehicle(
    State(state): State<ApiState>,
    Extension(_user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateVehicleRequest>,
) -> Result<Json<Value>, ApiError> {
    let input = vehicle_input_from_request(request, &[])?;
    state.vehicles.validate_input(&input).await?;
    Ok(Json(json!({ "valid": true })))
}

#[utoipa::path(
    put,
    path = "/vehicles/{id}",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Vehicle ID")),
    request_body = UpdateVehicleRequest,
    responses(
        (status = 200, description = "Vehicle updated", body = VehicleResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_vehicle(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(vehicle_id): Path<String>,
    body: JsonOrMultipart<UpdateVehicleRequest>,
) -> Result<Json<VehicleResponse>, ApiError> {
    let stored = store_uploads(&state, &body.files).await?;
    let update = vehicle_update_from_request(body.payload, &stored);

    match state.vehicles.update(&user.user_id, &vehicle_id, update).await {
        Ok(vehicle) => Ok(Json(vehicle.into())),
        Err(e) => {
            rollback_uploads(&state, &stored).await;
            Err(ApiError(e))
        }
    }
}

#[utoipa::path(
    delete,
    path = "/vehicles/{id}",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Vehicle deleted; owner capability recomputed"),
        (status = 400, description = "Blocked by scheduled or full future trips"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_vehicle(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(vehicle_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let owner = state.vehicles.delete(&user.user_id, &vehicle_id).await?;
    Ok(Json(json!({
        "message": "vehicle deleted",
        "roles": owner.roles.to_vec().iter().map(|r| r.as_str()).collect::<Vec<_>>(),
        "active_vehicle": owner.active_vehicle_id,
    })))
}

#[utoipa::path(
    put,
    path = "/vehicles/{id}/activate",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Vehicle is now the caller's active vehicle"),
        (status = 400, description = "Not verified or documents expired")
    )
)]
pub async fn activate_vehicle(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(vehicle_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let owner = state.vehicles.activate(&user.user_id, &vehicle_id).await?;
    Ok(Json(json!({
        "message": "vehicle activated",
        "active_vehicle": owner.active_vehicle_id,
    })))
}

#[utoipa::path(
    post,
    path = "/vehicles/{id}/request-review",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Vehicle moved to under_review", body = VehicleResponse),
        (status = 400, description = "Documents expired"),
        (status = 409, description = "Not in a reviewable status")
    )
)]
pub async fn request_review(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(vehicle_id): Path<String>,
) -> Result<Json<VehicleResponse>, ApiError> {
    let vehicle = state
        .vehicles
        .request_review(&user.user_id, &vehicle_id)
        .await?;
    Ok(Json(vehicle.into()))
}

// ── Pickup points ───────────────────────────────────────────────

#[utoipa::path(
    post,
    path = "/vehicles/{id}/pickup-points",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Vehicle ID")),
    request_body = PickupPointRequest,
    responses(
        (status = 201, description = "Pickup point added", body = PickupPointResponse),
        (status = 400, description = "Out-of-range coordinates")
    )
)]
pub async fn add_pickup_point(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(vehicle_id): Path<String>,
    ValidatedJson(request): ValidatedJson<PickupPointRequest>,
) -> Result<(StatusCode, Json<PickupPointResponse>), ApiError> {
    let point = state
        .vehicles
        .add_pickup_point(
            &user.user_id,
            &vehicle_id,
            PickupPointInput {
                name: request.name,
                description: request.description,
                lat: request.lat,
                lng: request.lng,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(point.into())))
}

#[utoipa::path(
    put,
    path = "/vehicles/{id}/pickup-points/{point_id}",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Vehicle ID"),
        ("point_id" = String, Path, description = "Pickup point ID")
    ),
    request_body = PickupPointRequest,
    responses(
        (status = 200, description = "Pickup point updated", body = PickupPointResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_pickup_point(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((vehicle_id, point_id)): Path<(String, String)>,
    ValidatedJson(request): ValidatedJson<PickupPointRequest>,
) -> Result<Json<PickupPointResponse>, ApiError> {
    let point = state
        .vehicles
        .update_pickup_point(
            &user.user_id,
            &vehicle_id,
            &point_id,
            PickupPointInput {
                name: request.name,
                description: request.description,
                lat: request.lat,
                lng: request.lng,
            },
        )
        .await?;
    Ok(Json(point.into()))
}

#[utoipa::path(
    delete,
    path = "/vehicles/{id}/pickup-points/{point_id}",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Vehicle ID"),
        ("point_id" = String, Path, description = "Pickup point ID")
    ),
    responses(
        (status = 200, description = "Pickup point removed"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_pickup_point(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((vehicle_id, point_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    state
        .vehicles
        .delete_pickup_point(&user.user_id, &vehicle_id, &point_id)
        .await?;
    Ok(Json(json!({ "message": "pickup point removed" })))
}
