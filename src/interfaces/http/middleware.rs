//! Authentication middleware for Axum
//!
//! Bearer JWT only. A token that verifies but sits in the revocation
//! store is treated exactly like an invalid one: 401.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::application::identity::TokenRevocationStore;
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig, TokenClaims};

/// Authentication error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
    RevokedToken,
}

/// Authentication state shared by the middleware and the logout handler
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
    pub revocation: Arc<dyn TokenRevocationStore>,
}

/// Authenticated caller injected into request extensions
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
    /// The presented raw token (needed by logout)
    pub token: String,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: TokenClaims, token: &str) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            token: token.to_string(),
        }
    }
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// JWT authentication middleware
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(String::from);
    let Some(auth_header) = auth_header else {
        return auth_error_response(AuthError::MissingToken);
    };

    let Some(token) = extract_token(&auth_header) else {
        return auth_error_response(AuthError::InvalidToken);
    };

    match verify_token(token, &auth_state.jwt_config) {
        Ok(claims) => {
            if claims.is_expired() {
                return auth_error_response(AuthError::ExpiredToken);
            }
            if auth_state.revocation.is_revoked(token) {
                return auth_error_response(AuthError::RevokedToken);
            }
            let user = AuthenticatedUser::from_claims(claims, token);
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(_) => auth_error_response(AuthError::InvalidToken),
    }
}

fn auth_error_response(error: AuthError) -> Response {
    let message = match error {
        AuthError::MissingToken => "Missing authentication token",
        AuthError::InvalidToken => "Invalid authentication token",
        AuthError::ExpiredToken => "Token has expired",
        AuthError::RevokedToken => "Token has been revoked",
    };
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
}

// ── Tests ──────────────────────────────────────────────────────
