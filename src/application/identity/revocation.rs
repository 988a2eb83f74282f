//! Server-side bearer-token revocation
//!
//! Process-local by design: a single-replica deployment needs nothing
//! more, and a scale-out swaps in a shared TTL store behind the same
//! trait.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;

/// Pluggable revocation capability
pub trait TokenRevocationStore: Send + Sync {
    /// Blacklist a token until its natural expiry (Unix seconds)
    fn revoke(&self, token: &str, exp: i64);

    /// Whether the token was revoked and has not yet expired
    fn is_revoked(&self, token: &str) -> bool;
}

/// Mutex-guarded map from opaque token to expiry; reads purge expired
/// entries lazily so the map never outgrows the live token set.
#[derive(Default)]
pub struct InMemoryRevocationStore {
    entries: Mutex<HashMap<String, i64>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenRevocationStore for InMemoryRevocationStore {
    fn revoke(&self, token: &str, exp: i64) {
        let mut entries = self.entries.lock().expect("revocation store poisoned");
        entries.insert(token.to_string(), exp);
    }

    fn is_revoked(&self, token: &str) -> bool {
        let now = Utc::now().timestamp();
        let mut entries = self.entries.lock().expect("revocation store poisoned");
        entries.retain(|_, exp| *exp > now);
        entries.contains_key(token)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revoked_token_is_reported() {
        let store = InMemoryRevocationStore::new();
        let exp = Utc::now().timestamp() + 3600;
        assert!(!store.is_revoked("tok-a"));
        store.revoke("tok-a", exp);
        assert!(store.is_revoked("tok-a"));
        assert!(!store.is_revoked("tok-b"));
    }

    #[test]
    fn expired_entries_are_purged_on_read() {
        let store = InMemoryRevocationStore::new();
        store.revoke("old", Utc::now().timestamp() - 10);
        store.revoke("live", Utc::now().timestamp() + 3600);
        assert!(!store.is_revoked("old"));
        assert!(store.is_revoked("live"));
        // the expired entry is gone from the map, not just filtered
        assert_eq!(store.entries.lock().unwrap().len(), 1);
    }
}
