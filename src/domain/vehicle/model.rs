//! Vehicle domain entity and verification state machine

use chrono::{DateTime, Utc};

use crate::domain::{DomainError, DomainResult};

/// Verification status of a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleStatus {
    /// Freshly created or materially edited; not yet submitted
    Pending,
    /// Owner requested review, waiting for an admin verdict
    UnderReview,
    /// Admin approved the documents
    Verified,
    /// Admin rejected the documents
    Rejected,
    /// Admin asked for corrections
    NeedsUpdate,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::UnderReview => "under_review",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
            Self::NeedsUpdate => "needs_update",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "under_review" => Self::UnderReview,
            "verified" => Self::Verified,
            "rejected" => Self::Rejected,
            "needs_update" => Self::NeedsUpdate,
            _ => Self::Pending,
        }
    }
}

impl std::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Named boarding coordinate offered by the driver for this vehicle
#[derive(Debug, Clone, PartialEq)]
pub struct PickupPoint {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

/// Vehicle owned by a driver
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: String,
    pub owner_id: String,
    /// Uppercased, unique; `[A-Z]{3}[0-9]{3}` or `[A-Z]{3}[0-9]{2}[A-Z]`
    pub plate: String,
    pub brand: String,
    pub model: String,
    pub capacity: i32,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub vehicle_photo_url: Option<String>,
    pub soat_photo_url: Option<String>,
    pub license_photo_url: Option<String>,
    pub soat_expiration: DateTime<Utc>,
    pub license_number: String,
    pub license_expiration: DateTime<Utc>,
    pub status: VehicleStatus,
    pub status_updated_at: DateTime<Utc>,
    pub requested_review_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<String>,
    pub verification_notes: Option<String>,
    pub pickup_points: Vec<PickupPoint>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// Both documents carry an expiration at or after `now`
    pub fn documents_valid(&self, now: DateTime<Utc>) -> bool {
        self.soat_expiration >= now && self.license_expiration >= now
    }

    /// Eligible to be a driver's default vehicle and to publish trips
    pub fn is_eligible(&self, now: DateTime<Utc>) -> bool {
        self.status == VehicleStatus::Verified && self.documents_valid(now)
    }

    /// Owner submits the vehicle for review.
    /// Valid from `pending`, `rejected` and `needs_update` with unexpired
    /// documents.
    pub fn request_review(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        match self.status {
            VehicleStatus::Pending | VehicleStatus::Rejected | VehicleStatus::NeedsUpdate => {
                if !self.documents_valid(now) {
                    return Err(DomainError::ExpiredDocument);
                }
                self.set_status(VehicleStatus::UnderReview, now);
                self.requested_review_at = Some(now);
                Ok(())
            }
            VehicleStatus::UnderReview => Err(DomainError::Conflict(
                "vehicle is already under review".to_string(),
            )),
            VehicleStatus::Verified => Err(DomainError::Conflict(
                "vehicle is already verified".to_string(),
            )),
        }
    }

    /// Admin verdict. Valid only from `under_review`; the target must be
    /// one of `verified`, `rejected`, `needs_update`.
    pub fn apply_review(
        &mut self,
        verdict: VehicleStatus,
        reviewer: &str,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if self.status != VehicleStatus::UnderReview {
            return Err(DomainError::Conflict(format!(
                "cannot review a vehicle in status {}",
                self.status
            )));
        }
        match verdict {
            VehicleStatus::Verified | VehicleStatus::Rejected | VehicleStatus::NeedsUpdate => {
                self.set_status(verdict, now);
                self.reviewed_at = Some(now);
                self.reviewed_by = Some(reviewer.to_string());
                self.verification_notes = notes;
                Ok(())
            }
            _ => Err(DomainError::Validation(format!(
                "{} is not a review verdict",
                verdict
            ))),
        }
    }

    /// Any material mutation (identity or document fields) drops the
    /// vehicle back to `pending` and clears review metadata.
    pub fn reset_verification(&mut self, now: DateTime<Utc>) {
        self.set_status(VehicleStatus::Pending, now);
        self.requested_review_at = None;
        self.reviewed_at = None;
        self.reviewed_by = None;
        self.verification_notes = None;
    }

    fn set_status(&mut self, status: VehicleStatus, now: DateTime<Utc>) {
        self.status = status;
        self.status_updated_at = now;
        self.updated_at = now;
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_vehicle(status: VehicleStatus) -> Vehicle {
        let now = Utc::now();
        Vehicle {
            id: "v1".into(),
            owner_id: "u1".into(),
            plate: "ABC123".into(),
            brand: "Toyota".into(),
            model: "Corolla".into(),
            capacity: 4,
            year: Some(2021),
            color: Some("gray".into()),
            vehicle_photo_url: None,
            soat_photo_url: Some("docs/soat.pdf".into()),
            license_photo_url: Some("docs/license.pdf".into()),
            soat_expiration: now + Duration::days(90),
            license_number: "LIC-1".into(),
            license_expiration: now + Duration::days(200),
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
    fn request_review_from_pending() {
        let mut v = sample_vehicle(VehicleStatus::Pending);
        v.request_review(Utc::now()).unwrap();
        assert_eq!(v.status, VehicleStatus::UnderReview);
        assert!(v.requested_review_at.is_some());
    }

    #[test]
    fn request_review_from_rejected_and_needs_update() {
        for from in [VehicleStatus::Rejected, VehicleStatus::NeedsUpdate] {
            let mut v = sample_vehicle(from);
            v.request_review(Utc::now()).unwrap();
            assert_eq!(v.status, VehicleStatus::UnderReview);
        }
    }

    #[test]
    fn request_review_rejects_expired_documents() {
        let mut v = sample_vehicle(VehicleStatus::Pending);
        v.soat_expiration = Utc::now() - Duration::days(1);
        let err = v.request_review(Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::ExpiredDocument));
        assert_eq!(v.status, VehicleStatus::Pending);
    }

    #[test]
    fn request_review_refused_while_under_review_or_verified() {
        for from in [VehicleStatus::UnderReview, VehicleStatus::Verified] {
            let mut v = sample_vehicle(from);
            assert!(v.request_review(Utc::now()).is_err());
            assert_eq!(v.status, from);
        }
    }

    #[test]
    fn review_verdicts_apply_from_under_review() {
        for verdict in [
            VehicleStatus::Verified,
            VehicleStatus::Rejected,
            VehicleStatus::NeedsUpdate,
        ] {
            let mut v = sample_vehicle(VehicleStatus::UnderReview);
            v.apply_review(verdict, "admin", Some("ok".into()), Utc::now())
                .unwrap();
            assert_eq!(v.status, verdict);
            assert_eq!(v.reviewed_by.as_deref(), Some("admin"));
            assert!(v.reviewed_at.is_some());
        }
    }

    #[test]
    fn review_refused_outside_under_review() {
        let mut v = sample_vehicle(VehicleStatus::Pending);
        assert!(v
            .apply_review(VehicleStatus::Verified, "admin", None, Utc::now())
            .is_err());
    }

    #[test]
    fn pending_is_not_a_review_verdict() {
        let mut v = sample_vehicle(VehicleStatus::UnderReview);
        assert!(v
            .apply_review(VehicleStatus::Pending, "admin", None, Utc::now())
            .is_err());
    }

    #[test]
    fn material_edit_resets_verification() {
        let mut v = sample_vehicle(VehicleStatus::UnderReview);
        v.apply_review(VehicleStatus::Verified, "admin", None, Utc::now())
            .unwrap();

        v.reset_verification(Utc::now());
        assert_eq!(v.status, VehicleStatus::Pending);
        assert!(v.requested_review_at.is_none());
        assert!(v.reviewed_at.is_none());
        assert!(v.reviewed_by.is_none());
        assert!(v.verification_notes.is_none());
    }

    #[test]
    fn eligibility_needs_verified_and_valid_documents() {
        let now = Utc::now();
        let mut v = sample_vehicle(VehicleStatus::Verified);
        assert!(v.is_eligible(now));

        v.license_expiration = now - Duration::days(1);
        assert!(!v.is_eligible(now));

        let v = sample_vehicle(VehicleStatus::Pending);
        assert!(!v.is_eligible(now));
    }

    #[test]
    fn status_parse_roundtrip() {
        for s in [
            VehicleStatus::Pending,
            VehicleStatus::UnderReview,
            VehicleStatus::Verified,
            VehicleStatus::Rejected,
            VehicleStatus::NeedsUpdate,
        ] {
            assert_eq!(VehicleStatus::parse(s.as_str()), s);
        }
        assert_eq!(VehicleStatus::parse("garbage"), VehicleStatus::Pending);
    }
}
