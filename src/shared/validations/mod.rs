//! Pure input validators shared across layers

use once_cell::sync::Lazy;
use regex::Regex;

/// Colombian private plates: `ABC123` (cars) or `ABC12D` (motorbikes)
static PLATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[A-Z]{3}[0-9]{3}|[A-Z]{3}[0-9]{2}[A-Z])$").unwrap());

/// The sole accepted identity domain, subdomains included
const INSTITUTIONAL_DOMAIN: &str = "unisabana.edu.co";

/// Strip whitespace and uppercase — the canonical plate form
pub fn normalize_plate(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Whether an already-normalized plate matches either accepted shape
pub fn is_valid_plate(plate: &str) -> bool {
    PLATE_RE.is_match(plate)
}

/// Lowercased canonical email form
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Whether a normalized email belongs to the institutional domain
/// (exact domain or any subdomain of it)
pub fn is_institutional_email(email: &str) -> bool {
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    domain == INSTITUTIONAL_DOMAIN || domain.ends_with(&format!(".{INSTITUTIONAL_DOMAIN}"))
}

/// Latitude within [-90, 90] and longitude within [-180, 180]
pub fn in_coordinate_bounds(lat: f64, lng: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plate_accepts_both_shapes() {
        assert!(is_valid_plate("ABC123"));
        assert!(is_valid_plate("ABC12D"));
    }

    #[test]
    fn plate_rejects_wrong_shapes() {
        assert!(!is_valid_plate("AB1234"));
        assert!(!is_valid_plate("A1C123"));
        assert!(!is_valid_plate("ABCD12"));
        assert!(!is_valid_plate("ABC1234"));
        assert!(!is_valid_plate(""));
    }

    #[test]
    fn plate_normalization_strips_whitespace_and_uppercases() {
        assert_eq!(normalize_plate("abc 123"), "ABC123");
        assert_eq!(normalize_plate(" aBc12d "), "ABC12D");
        // only the normalized form passes the regex
        assert!(is_valid_plate(&normalize_plate("abc 123")));
        assert!(!is_valid_plate("abc 123"));
    }

    #[test]
    fn institutional_email_gate() {
        assert!(is_institutional_email("laura@unisabana.edu.co"));
        assert!(is_institutional_email("laura@alumnos.unisabana.edu.co"));
        assert!(!is_institutional_email("laura@gmail.com"));
        assert!(!is_institutional_email("laura@unisabana.edu.com"));
        assert!(!is_institutional_email("laura@notunisabana.edu.co"));
        assert!(!is_institutional_email("@unisabana.edu.co"));
        assert!(!is_institutional_email("laura"));
    }

    #[test]
    fn email_normalization_lowercases() {
        assert_eq!(
            normalize_email(" Laura@UniSabana.edu.CO "),
            "laura@unisabana.edu.co"
        );
        assert!(is_institutional_email(&normalize_email(
            "Laura@UniSabana.edu.CO"
        )));
    }

    #[test]
    fn coordinate_bounds() {
        assert!(in_coordinate_bounds(4.86, -74.03));
        assert!(in_coordinate_bounds(-90.0, 180.0));
        assert!(!in_coordinate_bounds(90.1, 0.0));
        assert!(!in_coordinate_bounds(0.0, -180.5));
    }
}
