//! User and password-reset repository interfaces

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{PasswordReset, User};
use crate::domain::DomainResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user
    async fn save(&self, user: User) -> DomainResult<()>;

    /// Find by id
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>>;

    /// Find by lowercased institutional email
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    /// Find by university id
    async fn find_by_university_id(&self, university_id: &str) -> DomainResult<Option<User>>;

    /// Update an existing user
    async fn update(&self, user: User) -> DomainResult<()>;

    /// Remove a user row. Not exposed through the API; used to unwind a
    /// half-finished driver registration.
    async fn delete(&self, id: &str) -> DomainResult<()>;
}

#[async_trait]
pub trait PasswordResetRepository: Send + Sync {
    /// Store a new token record and mark every prior unused token for the
    /// same user as used, in one transaction.
    async fn issue(&self, reset: PasswordReset) -> DomainResult<()>;

    /// Find a token record by its SHA-256 digest
    async fn find_by_hash(&self, token_hash: &str) -> DomainResult<Option<PasswordReset>>;

    /// Atomically mark the token used and store the new password hash on
    /// the owning user. Fails when the token was already consumed.
    async fn consume(
        &self,
        token_hash: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<()>;
}
