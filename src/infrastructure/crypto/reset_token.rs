//! Password-reset token generation and digesting
//!
//! The raw secret (32 random bytes, hex) is delivered out-of-band; only
//! its SHA-256 digest is ever stored or compared.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Generate a fresh raw token: 32 random bytes, hex-encoded
pub fn generate_raw_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 hex digest of a raw token
pub fn hash_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_token_is_64_hex_chars() {
        let raw = generate_raw_token();
        assert_eq!(raw.len(), 64);
        assert!(raw.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate_raw_token(), generate_raw_token());
    }

    #[test]
    fn digest_is_deterministic_and_differs_from_raw() {
        let raw = generate_raw_token();
        let d1 = hash_token(&raw);
        let d2 = hash_token(&raw);
        assert_eq!(d1, d2);
        assert_ne!(d1, raw);
        assert_eq!(d1.len(), 64);
    }

    #[test]
    fn known_digest() {
        // sha256("abc")
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
