//! Authentication API DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::user::User;
use crate::interfaces::http::modules::vehicles::dto::CreateVehicleRequest;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 80))]
    pub first_name: String,
    #[validate(length(min = 1, max = 80))]
    pub last_name: String,
    #[validate(length(min = 1, max = 40))]
    pub university_id: String,
    #[validate(length(min = 7, max = 20))]
    pub phone: String,
    pub photo_url: Option<String>,
    /// `passenger` (default) or `driver`
    pub role: Option<String>,
    /// Required when role is `driver`
    pub vehicle: Option<CreateVehicleRequest>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 80))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 80))]
    pub last_name: Option<String>,
    #[validate(length(min = 7, max = 20))]
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub emergency_contact: Option<String>,
    /// `cash` or `nequi`
    pub preferred_payment_method: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SwitchRoleRequest {
    /// `passenger` or `driver`
    #[validate(length(min = 1))]
    pub role: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub university_id: String,
    pub phone: String,
    pub photo_url: Option<String>,
    pub roles: Vec<String>,
    pub active_role: String,
    pub active_vehicle: Option<String>,
    pub emergency_contact: Option<String>,
    pub preferred_payment_method: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            university_id: u.university_id,
            phone: u.phone,
            photo_url: u.photo_url,
            roles: u.roles.to_vec().iter().map(|r| r.as_str().to_string()).collect(),
            active_role: u.active_role.as_str().to_string(),
            active_vehicle: u.active_vehicle_id,
            emergency_contact: u.emergency_contact,
            preferred_payment_method: u.preferred_payment_method.as_str().to_string(),
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}
