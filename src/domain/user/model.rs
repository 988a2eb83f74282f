//! User domain entity

use chrono::{DateTime, Utc};

/// Capability a user may act under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Passenger,
    Driver,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passenger => "passenger",
            Self::Driver => "driver",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "passenger" => Some(Self::Passenger),
            "driver" => Some(Self::Driver),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Set of enabled roles. Passenger is always a member; driver is the only
/// optional capability, so the set collapses to one flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoleSet {
    driver: bool,
}

impl RoleSet {
    pub fn passenger_only() -> Self {
        Self { driver: false }
    }

    pub fn with_driver() -> Self {
        Self { driver: true }
    }

    pub fn contains(&self, role: Role) -> bool {
        match role {
            Role::Passenger => true,
            Role::Driver => self.driver,
        }
    }

    pub fn grant_driver(&mut self) {
        self.driver = true;
    }

    pub fn revoke_driver(&mut self) {
        self.driver = false;
    }

    pub fn to_vec(&self) -> Vec<Role> {
        if self.driver {
            vec![Role::Passenger, Role::Driver]
        } else {
            vec![Role::Passenger]
        }
    }

    /// Comma-joined persistence form, e.g. `"passenger,driver"`
    pub fn as_csv(&self) -> String {
        self.to_vec()
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Parse the persistence form; unknown tokens are ignored and the
    /// passenger role is always restored.
    pub fn from_csv(s: &str) -> Self {
        let driver = s
            .split(',')
            .filter_map(Role::parse)
            .any(|r| r == Role::Driver);
        Self { driver }
    }
}

/// Payment method recorded on reservations (never charged by this system)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Cash,
    Nequi,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Nequi => "nequi",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(Self::Cash),
            "nequi" => Some(Self::Nequi),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Registered user
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    /// Institutional email, stored lowercased
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub university_id: String,
    pub phone: String,
    pub photo_url: Option<String>,
    pub roles: RoleSet,
    /// Must be a member of `roles`
    pub active_role: Role,
    /// Only set while the user owns at least one vehicle
    pub active_vehicle_id: Option<String>,
    pub emergency_contact: Option<String>,
    pub preferred_payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_driver(&self) -> bool {
        self.roles.contains(Role::Driver)
    }
}

/// Single-use password-reset token (digest only; the raw secret is
/// delivered out-of-band and never persisted)
#[derive(Debug, Clone)]
pub struct PasswordReset {
    pub id: String,
    pub user_id: String,
    /// SHA-256 hex digest of the raw token
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl PasswordReset {
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        !self.used && now < self.expires_at
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn passenger_always_present() {
        let set = RoleSet::passenger_only();
        assert!(set.contains(Role::Passenger));
        assert!(!set.contains(Role::Driver));

        let set = RoleSet::from_csv("");
        assert!(set.contains(Role::Passenger));
    }

    #[test]
    fn role_csv_roundtrip() {
        let mut set = RoleSet::passenger_only();
        assert_eq!(set.as_csv(), "passenger");

        set.grant_driver();
        assert_eq!(set.as_csv(), "passenger,driver");
        assert_eq!(RoleSet::from_csv("passenger,driver"), set);
        assert_eq!(set, RoleSet::with_driver());

        set.revoke_driver();
        assert_eq!(RoleSet::from_csv(&set.as_csv()), RoleSet::passenger_only());
    }

    #[test]
    fn unknown_role_tokens_ignored() {
        let set = RoleSet::from_csv("passenger,admin,driver");
        assert!(set.contains(Role::Driver));
    }

    #[test]
    fn role_parse_roundtrip() {
        for role in [Role::Passenger, Role::Driver] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("admin"), None);
    }

    #[test]
    fn payment_method_parse() {
        assert_eq!(PaymentMethod::parse("cash"), Some(PaymentMethod::Cash));
        assert_eq!(PaymentMethod::parse("nequi"), Some(PaymentMethod::Nequi));
        assert_eq!(PaymentMethod::parse("card"), None);
    }

    #[test]
    fn full_name_joins_both_names() {
        let now = Utc::now();
        let user = User {
            id: "u1".into(),
            email: "laura@unisabana.edu.co".into(),
            password_hash: "hash".into(),
            first_name: "Laura".into(),
            last_name: "Gonzalez".into(),
            university_id: "A00012345".into(),
            phone: "3001234567".into(),
            photo_url: None,
            roles: RoleSet::passenger_only(),
            active_role: Role::Passenger,
            active_vehicle_id: None,
            emergency_contact: None,
            preferred_payment_method: PaymentMethod::Cash,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(user.full_name(), "Laura Gonzalez");
        assert!(!user.is_driver());
    }

    #[test]
    fn reset_token_redeemable_window() {
        let now = Utc::now();
        let fresh = PasswordReset {
            id: "r1".into(),
            user_id: "u1".into(),
            token_hash: "h".into(),
            expires_at: now + Duration::minutes(15),
            used: false,
            created_at: now,
        };
        assert!(fresh.is_redeemable(now));

        let used = PasswordReset {
            used: true,
            ..fresh.clone()
        };
        assert!(!used.is_redeemable(now));

        let expired = PasswordReset {
            expires_at: now - Duration::minutes(1),
            ..fresh
        };
        assert!(!expired.is_redeemable(now));
    }
}
