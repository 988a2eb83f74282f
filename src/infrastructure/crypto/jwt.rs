//! JWT Token handling
//!
//! Standard JWS, HS256, claims `{sub, email, iat, exp}`.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens. Required at startup.
    pub secret: String,
    /// Token expiration time in days
    pub expiration_days: i64,
}

/// JWT TokenClaims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// User email
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl TokenClaims {
    /// Create new claims for a user
    pub fn new(user_id: &str, email: &str, config: &JwtConfig) -> Self {
        let now = Utc::now();
        let exp = now + Duration::days(config.expiration_days);

        Self {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Create a JWT token for a user
pub fn create_token(
    user_id: &str,
    email: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = TokenClaims::new(user_id, email, config);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify and decode a JWT token
pub fn verify_token(
    token: &str,
    config: &JwtConfig,
) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let validation = Validation::default();
    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            expiration_days: 7,
        }
    }

    #[test]
    fn roundtrip_preserves_claims() {
        let cfg = config();
        let token = create_token("u1", "laura@unisabana.edu.co", &cfg).unwrap();
        let claims = verify_token(&token, &cfg).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.email, "laura@unisabana.edu.co");
        assert!(!claims.is_expired());
        // seven-day lifetime
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
    }

    #[test]
    fn wrong_secret_rejected() {
        let cfg = config();
        let token = create_token("u1", "laura@unisabana.edu.co", &cfg).unwrap();
        let other = JwtConfig {
            secret: "other-secret".to_string(),
            expiration_days: 7,
        };
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn garbage_rejected() {
        assert!(verify_token("not.a.token", &config()).is_err());
    }
}
