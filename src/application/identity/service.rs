//! Identity service — application-layer orchestration
//!
//! Registration, login, profile edits, role switching, logout and the
//! password-reset flow. HTTP handlers stay thin wrappers over this
//! service.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::vehicles::{VehicleInput, VehicleService};
use crate::domain::user::{PasswordReset, PaymentMethod, Role, RoleSet, User};
use crate::domain::vehicle::Vehicle;
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::infrastructure::crypto::jwt::{create_token, verify_token, JwtConfig};
use crate::infrastructure::crypto::password::{hash_password, verify_password};
use crate::infrastructure::crypto::reset_token::{generate_raw_token, hash_token};
use crate::infrastructure::email::EmailSender;
use crate::shared::validations::{is_institutional_email, normalize_email};

use super::revocation::TokenRevocationStore;

const MIN_PASSWORD_LEN: usize = 8;

/// Authentication result returned after a successful login
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

/// Registration payload, already validated for shape by the handler
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub university_id: String,
    pub phone: String,
    pub photo_url: Option<String>,
    pub role: Role,
    /// Required when role is driver
    pub vehicle: Option<VehicleInput>,
}

/// Field-wise profile update; email and university id are immutable
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub emergency_contact: Option<String>,
    pub preferred_payment_method: Option<PaymentMethod>,
}

pub struct IdentityService {
    repos: Arc<dyn RepositoryProvider>,
    vehicles: Arc<VehicleService>,
    jwt_config: JwtConfig,
    email_sender: Arc<dyn EmailSender>,
    revocation: Arc<dyn TokenRevocationStore>,
    reset_token_ttl_minutes: i64,
}

impl IdentityService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        vehicles: Arc<VehicleService>,
        jwt_config: JwtConfig,
        email_sender: Arc<dyn EmailSender>,
        revocation: Arc<dyn TokenRevocationStore>,
        reset_token_ttl_minutes: i64,
    ) -> Self {
        Self {
            repos,
            vehicles,
            jwt_config,
            email_sender,
            revocation,
            reset_token_ttl_minutes,
        }
    }

    // ── Registration ────────────────────────────────────────────

    /// Register a passenger, or a driver with their first vehicle. The
    /// vehicle payload is validated up front so a rejected vehicle never
    /// leaves a half-created account behind.
    pub async fn register(&self, input: RegisterInput) -> DomainResult<(User, Option<Vehicle>)> {
        let email = normalize_email(&input.email);
        if !is_institutional_email(&email) {
            return Err(DomainError::InvalidEmailDomain);
        }
        if input.password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::WeakPassword);
        }
        if input.role == Role::Driver && input.vehicle.is_none() {
            return Err(DomainError::Validation(
                "driver registration requires a vehicle".to_string(),
            ));
        }
        if let Some(vehicle) = &input.vehicle {
            self.vehicles.validate_input(vehicle).await?;
        }

        if self.repos.users().find_by_email(&email).await?.is_some() {
            return Err(DomainError::DuplicateEmail);
        }
        if self
            .repos
            .users()
            .find_by_university_id(&input.university_id)
            .await?
            .is_some()
        {
            return Err(DomainError::Conflict(
                "university id already registered".to_string(),
            ));
        }

        let password_hash =
            hash_password(&input.password).map_err(|e| DomainError::Database(e.to_string()))?;
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.clone(),
            password_hash,
            first_name: input.first_name,
            last_name: input.last_name,
            university_id: input.university_id,
            phone: input.phone,
            photo_url: input.photo_url,
            roles: RoleSet::passenger_only(),
            active_role: Role::Passenger,
            active_vehicle_id: None,
            emergency_contact: None,
            preferred_payment_method: PaymentMethod::Cash,
            created_at: now,
            updated_at: now,
        };
        self.repos.users().save(user.clone()).await?;

        let vehicle = if let Some(vehicle_input) = input.vehicle {
            match self.vehicles.create(&user.id, vehicle_input).await {
                Ok(v) => Some(v),
                Err(e) => {
                    // The account must not survive without the vehicle
                    // it was registered with
                    if let Err(cleanup) = self.repos.users().delete(&user.id).await {
                        warn!("registration rollback failed for {}: {}", user.id, cleanup);
                    }
                    return Err(e);
                }
            }
        } else {
            None
        };

        let mut user = self
            .repos
            .users()
            .find_by_id(&user.id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: user.id.clone(),
            })?;

        // The requested role becomes active once it is actually enabled
        if input.role == Role::Driver && user.roles.contains(Role::Driver) {
            user.active_role = Role::Driver;
            user.updated_at = Utc::now();
            self.repos.users().update(user.clone()).await?;
        }

        info!("User registered: {} ({})", user.email, user.id);

        // Welcome mail must never fail the registration
        if let Err(e) = self
            .email_sender
            .send(
                &user.email,
                "Bienvenido a Unirides",
                &format!(
                    "Hola {}, tu cuenta quedó registrada con el correo {}.",
                    user.first_name, user.email
                ),
            )
            .await
        {
            warn!("Welcome email failed for {}: {}", user.email, e);
        }

        Ok((user, vehicle))
    }

    // ── Authentication ──────────────────────────────────────────

    /// Verify credentials and mint a bearer token. Unknown user and
    /// wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthResult> {
        let email = normalize_email(email);
        let Some(user) = self.repos.users().find_by_email(&email).await? else {
            return Err(DomainError::InvalidCredentials);
        };

        let valid = verify_password(password, &user.password_hash).unwrap_or(false);
        if !valid {
            return Err(DomainError::InvalidCredentials);
        }

        let token = create_token(&user.id, &user.email, &self.jwt_config)
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(AuthResult {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_config.expiration_days * 24 * 3600,
            user,
        })
    }

    /// Server-side token invalidation. The token keeps its signature but
    /// every later request presenting it gets 401.
    pub fn logout(&self, token: &str) -> DomainResult<()> {
        let claims = verify_token(token, &self.jwt_config)
            .map_err(|_| DomainError::Unauthorized("invalid token".to_string()))?;
        self.revocation.revoke(token, claims.exp);
        Ok(())
    }

    pub async fn me(&self, user_id: &str) -> DomainResult<User> {
        self.repos
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: user_id.to_string(),
            })
    }

    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> DomainResult<User> {
        let mut user = self.me(user_id).await?;

        if let Some(first_name) = update.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            user.last_name = last_name;
        }
        if let Some(phone) = update.phone {
            user.phone = phone;
        }
        if let Some(photo_url) = update.photo_url {
            user.photo_url = Some(photo_url);
        }
        if let Some(emergency_contact) = update.emergency_contact {
            user.emergency_contact = Some(emergency_contact);
        }
        if let Some(method) = update.preferred_payment_method {
            user.preferred_payment_method = method;
        }
        user.updated_at = Utc::now();

        self.repos.users().update(user.clone()).await?;
        Ok(user)
    }

    // ── Role switching ──────────────────────────────────────────

    /// Switch the active role. Driver requires at least one verified
    /// vehicle with unexpired documents; the first eligible vehicle is
    /// adopted as active when none is set.
    pub async fn switch_role(&self, user_id: &str, role: Role) -> DomainResult<User> {
        let mut user = self.me(user_id).await?;

        if !user.roles.contains(role) {
            return Err(DomainError::RoleNotEnabled);
        }

        if role == Role::Driver {
            let now = Utc::now();
            let vehicles = self.repos.vehicles().find_by_owner(&user.id).await?;
            let eligible = vehicles.iter().find(|v| v.is_eligible(now));
            let Some(eligible) = eligible else {
                return Err(DomainError::DocumentsInvalid);
            };
            if user.active_vehicle_id.is_none() {
                user.active_vehicle_id = Some(eligible.id.clone());
            }
        }

        user.active_role = role;
        user.updated_at = Utc::now();
        self.repos.users().update(user.clone()).await?;
        Ok(user)
    }

    // ── Password reset ──────────────────────────────────────────

    /// Issue a reset token. Silently succeeds for unknown emails so the
    /// endpoint cannot be used for user enumeration.
    pub async fn forgot_password(&self, email: &str) -> DomainResult<()> {
        let email = normalize_email(email);
        let Some(user) = self.repos.users().find_by_email(&email).await? else {
            return Ok(());
        };

        let raw_token = generate_raw_token();
        let now = Utc::now();
        let reset = PasswordReset {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            token_hash: hash_token(&raw_token),
            expires_at: now + Duration::minutes(self.reset_token_ttl_minutes),
            used: false,
            created_at: now,
        };
        self.repos.password_resets().issue(reset).await?;

        if let Err(e) = self
            .email_sender
            .send(
                &user.email,
                "Restablecimiento de contraseña",
                &format!(
                    "Usa este código para restablecer tu contraseña (vence en {} minutos): {}",
                    self.reset_token_ttl_minutes, raw_token
                ),
            )
            .await
        {
            warn!("Password-reset email failed for {}: {}", user.email, e);
        }
        Ok(())
    }

    /// Redeem a reset token exactly once
    pub async fn reset_password(&self, raw_token: &str, new_password: &str) -> DomainResult<()> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::WeakPassword);
        }

        let token_hash = hash_token(raw_token);
        let record = self
            .repos
            .password_resets()
            .find_by_hash(&token_hash)
            .await?
            .ok_or(DomainError::TokenInvalidOrExpired)?;

        let now = Utc::now();
        if !record.is_redeemable(now) {
            return Err(DomainError::TokenInvalidOrExpired);
        }

        let new_hash =
            hash_password(new_password).map_err(|e| DomainError::Database(e.to_string()))?;
        self.repos
            .password_resets()
            .consume(&token_hash, &new_hash, now)
            .await?;

        info!("Password reset completed for user {}", record.user_id);
        Ok(())
    }
}
