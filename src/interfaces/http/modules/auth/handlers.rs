//! Authentication API handlers

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};

use super::dto::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest, ResetPasswordRequest,
    SwitchRoleRequest, UpdateProfileRequest, UserResponse,
};
use crate::application::identity::{ProfileUpdate, RegisterInput};
use crate::domain::user::{PaymentMethod, Role};
use crate::domain::DomainError;
use crate::interfaces::http::common::{ApiError, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::modules::vehicles::dto::vehicle_input_from_request;
use crate::interfaces::http::modules::ApiState;

fn parse_role(raw: &str) -> Result<Role, ApiError> {
    Role::parse(raw)
        .ok_or_else(|| ApiError(DomainError::Validation(format!("unknown role {raw}"))))
}

#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error, invalid email domain, weak password or expired documents"),
        (status = 409, description = "Duplicate email or plate")
    )
)]
pub async fn register(
    State(state): State<ApiState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let role = request
        .role
        .as_deref()
        .map(parse_role)
        .transpose()?
        .unwrap_or(Role::Passenger);

    let vehicle = request
        .vehicle
        .map(|v| vehicle_input_from_request(v, &[]))
        .transpose()?;

    let (user, _vehicle) = state
        .identity
        .register(RegisterInput {
            email: request.email,
            password: request.password,
            first_name: request.first_name,
            last_name: request.last_name,
            university_id: request.university_id,
            phone: request.phone,
            photo_url: request.photo_url,
            role,
            vehicle,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<ApiState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let auth = state.identity.login(&request.email, &request.password).await?;
    Ok(Json(LoginResponse {
        token: auth.token,
        token_type: auth.token_type,
        expires_in: auth.expires_in,
        user: auth.user.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_current_user(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.identity.me(&user.user_id).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn update_profile(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let preferred_payment_method = request
        .preferred_payment_method
        .as_deref()
        .map(|raw| {
            PaymentMethod::parse(raw).ok_or_else(|| {
                ApiError(DomainError::Validation(format!(
                    "unknown payment method {raw}"
                )))
            })
        })
        .transpose()?;

    let updated = state
        .identity
        .update_profile(
            &user.user_id,
            ProfileUpdate {
                first_name: request.first_name,
                last_name: request.last_name,
                phone: request.phone,
                photo_url: request.photo_url,
                emergency_contact: request.emergency_contact,
                preferred_payment_method,
            },
        )
        .await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Token revoked"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn logout(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Value>, ApiError> {
    state.identity.logout(&user.token)?;
    Ok(Json(json!({ "message": "logged out" })))
}

#[utoipa::path(
    put,
    path = "/auth/role",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    request_body = SwitchRoleRequest,
    responses(
        (status = 200, description = "Role switched", body = UserResponse),
        (status = 400, description = "No eligible vehicle for the driver role"),
        (status = 403, description = "Role not enabled for this user")
    )
)]
pub async fn switch_role(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<SwitchRoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let role = parse_role(&request.role)?;
    let updated = state.identity.switch_role(&user.user_id, role).await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    tag = "Authentication",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Always succeeds; a reset token is mailed when the account exists")
    )
)]
pub async fn forgot_password(
    State(state): State<ApiState>,
    ValidatedJson(request): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    state.identity.forgot_password(&request.email).await?;
    Ok(Json(json!({
        "message": "if the account exists, a reset link was sent"
    })))
}

#[utoipa::path(
    post,
    path = "/auth/reset-password",
    tag = "Authentication",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password replaced"),
        (status = 400, description = "Token invalid, used or expired")
    )
)]
pub async fn reset_password(
    State(state): State<ApiState>,
    ValidatedJson(request): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    state
        .identity
        .reset_password(&request.token, &request.new_password)
        .await?;
    Ok(Json(json!({ "message": "password updated" })))
}
