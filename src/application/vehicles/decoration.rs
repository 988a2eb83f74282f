//! Vehicle read decoration
//!
//! Pure and deterministic given the vehicle and the current time: the
//! `meta` block every vehicle read is enriched with.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::domain::vehicle::{Vehicle, VehicleStatus};

/// Days before expiry at which a document starts warning
const EXPIRY_WARNING_DAYS: i64 = 30;

/// Per-document verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Valid,
    /// Expires within the warning window
    Expiring,
    Expired,
    /// No document photo on file
    Missing,
    /// Reviewed and found wanting
    Invalid,
}

/// One document's decorated state
#[derive(Debug, Clone, Serialize)]
pub struct DocumentMeta {
    pub status: DocumentStatus,
    pub expires_at: DateTime<Utc>,
}

/// Computed meta block attached to every vehicle read
#[derive(Debug, Clone, Serialize)]
pub struct VehicleMeta {
    pub soat: DocumentMeta,
    pub license: DocumentMeta,
    pub documents_ok: bool,
    pub can_request_review: bool,
    pub can_activate: bool,
    pub status_label: String,
    pub severity: String,
    pub warnings: Vec<String>,
}

fn document_status(
    photo_url: Option<&str>,
    expires_at: DateTime<Utc>,
    vehicle_status: VehicleStatus,
    now: DateTime<Utc>,
) -> DocumentStatus {
    if photo_url.is_none() {
        return DocumentStatus::Missing;
    }
    if expires_at < now {
        return DocumentStatus::Expired;
    }
    if matches!(
        vehicle_status,
        VehicleStatus::Rejected | VehicleStatus::NeedsUpdate
    ) {
        return DocumentStatus::Invalid;
    }
    if expires_at <= now + Duration::days(EXPIRY_WARNING_DAYS) {
        return DocumentStatus::Expiring;
    }
    DocumentStatus::Valid
}

fn status_label(status: VehicleStatus) -> (&'static str, &'static str) {
    match status {
        VehicleStatus::Pending => ("Pendiente de verificación", "info"),
        VehicleStatus::UnderReview => ("En revisión", "info"),
        VehicleStatus::Verified => ("Verificado", "success"),
        VehicleStatus::Rejected => ("Rechazado", "error"),
        VehicleStatus::NeedsUpdate => ("Requiere actualización", "warning"),
    }
}

/// Build the meta block
pub fn decorate(vehicle: &Vehicle, now: DateTime<Utc>) -> VehicleMeta {
    let soat = DocumentMeta {
        status: document_status(
            vehicle.soat_photo_url.as_deref(),
            vehicle.soat_expiration,
            vehicle.status,
            now,
        ),
        expires_at: vehicle.soat_expiration,
    };
    let license = DocumentMeta {
        status: document_status(
            vehicle.license_photo_url.as_deref(),
            vehicle.license_expiration,
            vehicle.status,
            now,
        ),
        expires_at: vehicle.license_expiration,
    };

    let mut warnings = Vec::new();
    for (doc, meta) in [("SOAT", &soat), ("licencia", &license)] {
        match meta.status {
            DocumentStatus::Expired => {
                warnings.push(format!("El documento {doc} está vencido"));
            }
            DocumentStatus::Expiring => {
                let days = (meta.expires_at - now).num_days();
                warnings.push(format!("El documento {doc} vence en {days} días"));
            }
            DocumentStatus::Missing => {
                warnings.push(format!("Falta el documento {doc}"));
            }
            _ => {}
        }
    }

    let documents_ok = matches!(soat.status, DocumentStatus::Valid | DocumentStatus::Expiring)
        && matches!(
            license.status,
            DocumentStatus::Valid | DocumentStatus::Expiring
        );
    let documents_unexpired = vehicle.documents_valid(now);
    let (label, severity) = status_label(vehicle.status);

    VehicleMeta {
        soat,
        license,
        documents_ok,
        can_request_review: documents_unexpired
            && matches!(
                vehicle.status,
                VehicleStatus::Pending | VehicleStatus::Rejected | VehicleStatus::NeedsUpdate
            ),
        can_activate: vehicle.status == VehicleStatus::Verified && documents_unexpired,
        status_label: label.to_string(),
        severity: severity.to_string(),
        warnings,
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle(status: VehicleStatus, soat_days: i64, license_days: i64) -> Vehicle {
        let now = Utc::now();
        Vehicle {
            id: "v1".into(),
            owner_id: "u1".into(),
            plate: "ABC123".into(),
            brand: "Toyota".into(),
            model: "Corolla".into(),
            capacity: 4,
            year: None,
            color: None,
            vehicle_photo_url: None,
            soat_photo_url: Some("docs/soat.pdf".into()),
            license_photo_url: Some("docs/license.pdf".into()),
            soat_expiration: now + Duration::days(soat_days),
            license_number: "LIC-1".into(),
            license_expiration: now + Duration::days(license_days),
            status,
            status_updated_at: now,
            requested_review_at: None,
            reviewed_at: None,
            reviewed_by: None,
            verification_notes: None,
            pickup_points: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn healthy_verified_vehicle() {
        let v = vehicle(VehicleStatus::Verified, 90, 200);
        let meta = decorate(&v, Utc::now());
        assert_eq!(meta.soat.status, DocumentStatus::Valid);
        assert_eq!(meta.license.status, DocumentStatus::Valid);
        assert!(meta.documents_ok);
        assert!(meta.can_activate);
        assert!(!meta.can_request_review);
        assert_eq!(meta.severity, "success");
        assert!(meta.warnings.is_empty());
    }

    #[test]
    fn expiring_document_warns_but_still_ok() {
        let v = vehicle(VehicleStatus::Verified, 10, 200);
        let meta = decorate(&v, Utc::now());
        assert_eq!(meta.soat.status, DocumentStatus::Expiring);
        assert!(meta.documents_ok);
        assert!(meta.can_activate);
        assert_eq!(meta.warnings.len(), 1);
        assert!(meta.warnings[0].contains("SOAT"));
    }

    #[test]
    fn expired_document_blocks_everything() {
        let v = vehicle(VehicleStatus::Verified, -1, 200);
        let meta = decorate(&v, Utc::now());
        assert_eq!(meta.soat.status, DocumentStatus::Expired);
        assert!(!meta.documents_ok);
        assert!(!meta.can_activate);
        assert!(meta.warnings[0].contains("vencido"));
    }

    #[test]
    fn missing_photo_is_missing() {
        let mut v = vehicle(VehicleStatus::Pending, 90, 200);
        v.soat_photo_url = None;
        let meta = decorate(&v, Utc::now());
        assert_eq!(meta.soat.status, DocumentStatus::Missing);
        assert!(!meta.documents_ok);
    }

    #[test]
    fn rejected_vehicle_marks_documents_invalid() {
        let v = vehicle(VehicleStatus::Rejected, 90, 200);
        let meta = decorate(&v, Utc::now());
        assert_eq!(meta.soat.status, DocumentStatus::Invalid);
        assert_eq!(meta.severity, "error");
        // documents unexpired, so a new review may be requested
        assert!(meta.can_request_review);
    }

    #[test]
    fn pending_with_valid_documents_can_request_review() {
        let v = vehicle(VehicleStatus::Pending, 90, 200);
        let meta = decorate(&v, Utc::now());
        assert!(meta.can_request_review);
        assert!(!meta.can_activate);
    }

    #[test]
    fn under_review_cannot_request_again() {
        let v = vehicle(VehicleStatus::UnderReview, 90, 200);
        let meta = decorate(&v, Utc::now());
        assert!(!meta.can_request_review);
    }

    #[test]
    fn deterministic_given_same_inputs() {
        let v = vehicle(VehicleStatus::Verified, 90, 200);
        let now = Utc::now();
        let a = decorate(&v, now);
        let b = decorate(&v, now);
        assert_eq!(a.soat.status, b.soat.status);
        assert_eq!(a.warnings, b.warnings);
        assert_eq!(a.status_label, b.status_label);
    }
}
