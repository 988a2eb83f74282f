//! Domain error taxonomy
//!
//! Business errors carry their stable wire code as the display string;
//! the HTTP layer maps each variant to a status in one place.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Error)]
pub enum DomainError {
    // ── Identity ───────────────────────────────────────────────
    #[error("INVALID_EMAIL_DOMAIN")]
    InvalidEmailDomain,

    #[error("WEAK_PASSWORD")]
    WeakPassword,

    #[error("DUPLICATE_EMAIL")]
    DuplicateEmail,

    #[error("INVALID_CREDENTIALS")]
    InvalidCredentials,

    #[error("TOKEN_INVALID_OR_EXPIRED")]
    TokenInvalidOrExpired,

    #[error("ROLE_NOT_ENABLED")]
    RoleNotEnabled,

    // ── Vehicles ───────────────────────────────────────────────
    #[error("DUPLICATE_PLATE")]
    DuplicatePlate,

    #[error("EXPIRED_DOCUMENT")]
    ExpiredDocument,

    #[error("DOCUMENTS_INVALID")]
    DocumentsInvalid,

    #[error("BLOCKED_BY_ACTIVE_TRIPS")]
    BlockedByActiveTrips,

    // ── Trips ──────────────────────────────────────────────────
    #[error("TRIP_NOT_FOUND")]
    TripNotFound,

    #[error("OWN_TRIP")]
    OwnTrip,

    #[error("TRIP_NOT_AVAILABLE")]
    TripNotAvailable,

    #[error("INSUFFICIENT_SEATS")]
    InsufficientSeats,

    #[error("DUPLICATE_RESERVATION")]
    DuplicateReservation,

    #[error("TOO_MANY_PENDING_SUGGESTIONS")]
    TooManyPendingSuggestions,

    // ── Tariff / routing ───────────────────────────────────────
    #[error("TARIFF_INVALID_INPUT")]
    TariffInvalidInput,

    #[error("ROUTE_PROVIDER_ERROR: {provider} ({status})")]
    RouteProvider {
        provider: &'static str,
        status: String,
    },

    // ── Generic ────────────────────────────────────────────────
    #[error("Validation: {0}")]
    Validation(String),

    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("SERVICE_UNAVAILABLE")]
    Unavailable,

    #[error("Email error: {0}")]
    Email(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    /// HTTP status this error maps to. Business preconditions are 400
    /// in this API, not 412.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidEmailDomain
            | Self::WeakPassword
            | Self::TokenInvalidOrExpired
            | Self::ExpiredDocument
            | Self::DocumentsInvalid
            | Self::BlockedByActiveTrips
            | Self::TripNotAvailable
            | Self::InsufficientSeats
            | Self::TariffInvalidInput
            | Self::Validation(_) => 400,
            Self::InvalidCredentials | Self::Unauthorized(_) => 401,
            Self::RoleNotEnabled | Self::OwnTrip | Self::Forbidden(_) => 403,
            Self::TripNotFound | Self::NotFound { .. } => 404,
            Self::DuplicateEmail
            | Self::DuplicatePlate
            | Self::DuplicateReservation
            | Self::Conflict(_) => 409,
            Self::TooManyPendingSuggestions => 429,
            Self::RouteProvider { .. } | Self::Email(_) => 502,
            Self::Unavailable => 503,
            Self::Database(_) | Self::Storage(_) => 500,
        }
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        Self::Database(e.to_string())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_codes_render_verbatim() {
        assert_eq!(
            DomainError::InsufficientSeats.to_string(),
            "INSUFFICIENT_SEATS"
        );
        assert_eq!(
            DomainError::DuplicateReservation.to_string(),
            "DUPLICATE_RESERVATION"
        );
        assert_eq!(
            DomainError::TokenInvalidOrExpired.to_string(),
            "TOKEN_INVALID_OR_EXPIRED"
        );
    }

    #[test]
    fn status_taxonomy() {
        assert_eq!(DomainError::Validation("x".into()).status_code(), 400);
        assert_eq!(DomainError::InvalidCredentials.status_code(), 401);
        assert_eq!(DomainError::RoleNotEnabled.status_code(), 403);
        assert_eq!(DomainError::TripNotFound.status_code(), 404);
        assert_eq!(DomainError::DuplicatePlate.status_code(), 409);
        assert_eq!(DomainError::TooManyPendingSuggestions.status_code(), 429);
        assert_eq!(
            DomainError::RouteProvider {
                provider: "osrm",
                status: "500".into()
            }
            .status_code(),
            502
        );
        assert_eq!(DomainError::Unavailable.status_code(), 503);
        assert_eq!(DomainError::Database("x".into()).status_code(), 500);
        // business preconditions are 400, not 412
        assert_eq!(DomainError::BlockedByActiveTrips.status_code(), 400);
        assert_eq!(DomainError::ExpiredDocument.status_code(), 400);
    }
}
