//! Password hashing utilities

use bcrypt::{hash, verify};

/// bcrypt work factor
const COST: u32 = 10;

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, COST)
}

/// Verify a password against a hash (constant-time comparison inside)
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, hash)
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_and_wrong_password_fails() {
        let h = hash_password("SecurePass123").unwrap();
        assert!(verify_password("SecurePass123", &h).unwrap());
        assert!(!verify_password("WrongPass123", &h).unwrap());
    }

    #[test]
    fn plaintext_never_in_hash() {
        let h = hash_password("SecurePass123").unwrap();
        assert!(!h.contains("SecurePass123"));
    }
}
