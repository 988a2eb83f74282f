//! Service-level flow tests over an in-memory SQLite database
//!
//! Covers the end-to-end scenarios (registration, driver onboarding,
//! the reservation race, seat returns, delete safety, password reset)
//! and the seat-accounting invariants.

use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;

use crate::application::identity::{
    IdentityService, InMemoryRevocationStore, RegisterInput, TokenRevocationStore,
};
use crate::application::tariff::TariffCalculator;
use crate::application::trips::{CreateTripInput, ReserveInput, SuggestPickupInput, TripService, TripShape};
use crate::application::vehicles::{PickupPointInput, VehicleInput, VehicleService, VehicleUpdate};
use crate::config::{TariffConfig, VehicleConfig};
use crate::domain::trip::{ReservationAction, ReservationStatus, TripStatus};
use crate::domain::user::{PaymentMethod, Role};
use crate::domain::vehicle::VehicleStatus;
use crate::domain::{DomainError, RepositoryProvider};
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;
use crate::infrastructure::email::EmailSender;

/// Email sender that records every message for assertions
#[derive(Default)]
struct CapturingSender {
    messages: std::sync::Mutex<Vec<(String, String, String)>>,
}

#[async_trait::async_trait]
impl EmailSender for CapturingSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> crate::domain::DomainResult<()> {
        self.messages
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

struct TestContext {
    repos: Arc<dyn RepositoryProvider>,
    identity: Arc<IdentityService>,
    vehicles: Arc<VehicleService>,
    trips: Arc<TripService>,
    sender: Arc<CapturingSender>,
    revocation: Arc<InMemoryRevocationStore>,
    jwt: JwtConfig,
}

async fn setup() -> TestContext {
    // One pooled connection: sqlite::memory: spawns a fresh database per
    // connection, so the pool must not fan out.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db));
    let sender = Arc::new(CapturingSender::default());
    let revocation = Arc::new(InMemoryRevocationStore::new());
    let jwt = JwtConfig {
        secret: "flow-test-secret".to_string(),
        expiration_days: 7,
    };
    let tariff = TariffCalculator::new(TariffConfig::default());
    let vehicles = Arc::new(VehicleService::new(
        repos.clone(),
        repos.trips(),
        VehicleConfig::default(),
    ));
    let identity = Arc::new(IdentityService::new(
        repos.clone(),
        vehicles.clone(),
        jwt.clone(),
        sender.clone(),
        revocation.clone(),
        15,
    ));
    let trips = Arc::new(TripService::new(repos.clone(), sender.clone(), tariff));

    TestContext {
        repos,
        identity,
        vehicles,
        trips,
        sender,
        revocation,
        jwt,
    }
}

fn register_input(email: &str, university_id: &str) -> RegisterInput {
    RegisterInput {
        email: email.to_string(),
        password: "SecurePass123".to_string(),
        first_name: "Laura".to_string(),
        last_name: "Gonzalez".to_string(),
        university_id: university_id.to_string(),
        phone: "3001234567".to_string(),
        photo_url: None,
        role: Role::Passenger,
        vehicle: None,
    }
}

fn vehicle_input(plate: &str) -> VehicleInput {
    let now = Utc::now();
    VehicleInput {
        plate: plate.to_string(),
        brand: "Toyota".to_string(),
        model: "Corolla".to_string(),
        capacity: 4,
        year: Some(2021),
        color: None,
        vehicle_photo_url: None,
        soat_photo_url: Some("docs/soat.pdf".to_string()),
        soat_expiration: now + Duration::days(90),
        license_number: "LIC-1".to_string(),
        license_expiration: now + Duration::days(200),
        license_photo_url: Some("docs/license.pdf".to_string()),
        pickup_points: vec![],
    }
}

async fn register_passenger(ctx: &TestContext, email: &str, university_id: &str) -> String {
    let (user, _) = ctx
        .identity
        .register(register_input(email, university_id))
        .await
        .unwrap();
    user.id
}

async fn register_driver(
    ctx: &TestContext,
    email: &str,
    university_id: &str,
    plate: &str,
) -> (String, String) {
    let mut input = register_input(email, university_id);
    input.role = Role::Driver;
    input.vehicle = Some(vehicle_input(plate));
    let (user, vehicle) = ctx.identity.register(input).await.unwrap();
    (user.id, vehicle.unwrap().id)
}

fn trip_input() -> CreateTripInput {
    CreateTripInput {
        shape: TripShape::Legacy {
            origin: "Universidad de La Sabana".to_string(),
            destination: "Portal Norte".to_string(),
        },
        vehicle_id: None,
        route_description: None,
        departure_at: Utc::now() + Duration::hours(6),
        seats_total: 3,
        price_per_seat: 5000.0,
        distance_km: Some(12.0),
        duration_minutes: Some(30.0),
        pickup_points: vec![PickupPointInput {
            name: "Puente peatonal".to_string(),
            description: None,
            lat: 4.86,
            lng: -74.03,
        }],
        tariff: None,
    }
}

/// seats_available must equal seats_total minus the seats of active
/// reservations, and `full` must mirror zero seats, after every
/// operation.
async fn assert_seat_invariants(ctx: &TestContext, trip_id: &str) {
    let trip = ctx.repos.trips().find_by_id(trip_id).await.unwrap().unwrap();
    let reservations = ctx.repos.trips().reservations_for_trip(trip_id).await.unwrap();
    let held: i32 = reservations
        .iter()
        .filter(|r| r.status.is_active())
        .map(|r| r.seats)
        .sum();
    if trip.status != TripStatus::Cancelled {
        assert_eq!(
            trip.seats_available,
            trip.seats_total - held,
            "seat conservation violated on trip {trip_id}"
        );
    }
    match trip.status {
        TripStatus::Full => assert_eq!(trip.seats_available, 0),
        TripStatus::Scheduled => assert!(trip.seats_available > 0),
        _ => {}
    }
}

// ── Identity flows ──────────────────────────────────────────────

#[tokio::test]
async fn register_login_me_logout_flow() {
    let ctx = setup().await;
    let user_id = register_passenger(&ctx, "laura@unisabana.edu.co", "A00012345").await;

    let auth = ctx
        .identity
        .login("laura@unisabana.edu.co", "SecurePass123")
        .await
        .unwrap();
    assert_eq!(auth.user.id, user_id);
    assert_eq!(auth.token_type, "Bearer");

    let me = ctx.identity.me(&user_id).await.unwrap();
    assert_eq!(me.email, "laura@unisabana.edu.co");

    ctx.identity.logout(&auth.token).unwrap();
    assert!(ctx.revocation.is_revoked(&auth.token));

    // A fresh login produces a distinct, working token
    let again = ctx
        .identity
        .login("laura@unisabana.edu.co", "SecurePass123")
        .await
        .unwrap();
    assert!(!ctx.revocation.is_revoked(&again.token));

    // welcome email went out
    assert!(!ctx.sender.messages.lock().unwrap().is_empty());
    let _ = &ctx.jwt;
}

#[tokio::test]
async fn register_rejects_foreign_domain_and_weak_password() {
    let ctx = setup().await;

    let err = ctx
        .identity
        .register(register_input("laura@gmail.com", "A1"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidEmailDomain));

    let mut weak = register_input("laura@unisabana.edu.co", "A2");
    weak.password = "short".to_string();
    let err = ctx.identity.register(weak).await.unwrap_err();
    assert!(matches!(err, DomainError::WeakPassword));
}

#[tokio::test]
async fn duplicate_email_and_plate_conflict() {
    let ctx = setup().await;
    register_passenger(&ctx, "laura@unisabana.edu.co", "A00012345").await;

    let err = ctx
        .identity
        .register(register_input("laura@unisabana.edu.co", "A0009"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::DuplicateEmail));

    register_driver(&ctx, "d1@unisabana.edu.co", "D1", "ABC123").await;
    let mut dup_plate = register_input("d2@unisabana.edu.co", "D2");
    dup_plate.role = Role::Driver;
    dup_plate.vehicle = Some(vehicle_input("abc 123"));
    let err = ctx.identity.register(dup_plate).await.unwrap_err();
    assert!(matches!(err, DomainError::DuplicatePlate));
    // the rejected driver account did not survive
    assert!(ctx
        .repos
        .users()
        .find_by_email("d2@unisabana.edu.co")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn login_is_generic_about_failures() {
    let ctx = setup().await;
    register_passenger(&ctx, "laura@unisabana.edu.co", "A00012345").await;

    let unknown = ctx
        .identity
        .login("nobody@unisabana.edu.co", "SecurePass123")
        .await
        .unwrap_err();
    let wrong = ctx
        .identity
        .login("laura@unisabana.edu.co", "WrongPass999")
        .await
        .unwrap_err();
    assert!(matches!(unknown, DomainError::InvalidCredentials));
    assert!(matches!(wrong, DomainError::InvalidCredentials));
}

#[tokio::test]
async fn driver_registration_creates_active_vehicle() {
    let ctx = setup().await;
    let (user_id, vehicle_id) =
        register_driver(&ctx, "carlos@unisabana.edu.co", "B0007", "ABC123").await;

    let user = ctx.identity.me(&user_id).await.unwrap();
    assert!(user.roles.contains(Role::Passenger));
    assert!(user.roles.contains(Role::Driver));
    assert_eq!(user.active_role, Role::Driver);
    assert_eq!(user.active_vehicle_id.as_deref(), Some(vehicle_id.as_str()));

    let vehicle = ctx
        .repos
        .vehicles()
        .find_by_id(&vehicle_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(vehicle.plate, "ABC123");
    assert_eq!(vehicle.status, VehicleStatus::Pending);
}

#[tokio::test]
async fn password_reset_roundtrip_and_single_use() {
    let ctx = setup().await;
    register_passenger(&ctx, "reset@unisabana.edu.co", "R0001").await;

    ctx.identity
        .forgot_password("reset@unisabana.edu.co")
        .await
        .unwrap();
    let raw_token = {
        let messages = ctx.sender.messages.lock().unwrap();
        let body = &messages.last().unwrap().2;
        body.split_whitespace().last().unwrap().to_string()
    };

    ctx.identity
        .reset_password(&raw_token, "NuevoPass123")
        .await
        .unwrap();

    let old = ctx
        .identity
        .login("reset@unisabana.edu.co", "SecurePass123")
        .await
        .unwrap_err();
    assert!(matches!(old, DomainError::InvalidCredentials));
    ctx.identity
        .login("reset@unisabana.edu.co", "NuevoPass123")
        .await
        .unwrap();

    // exactly-once redemption
    let reuse = ctx
        .identity
        .reset_password(&raw_token, "OtraClave123")
        .await
        .unwrap_err();
    assert!(matches!(reuse, DomainError::TokenInvalidOrExpired));
}

#[tokio::test]
async fn forgot_password_is_silent_for_unknown_accounts() {
    let ctx = setup().await;
    ctx.identity
        .forgot_password("ghost@unisabana.edu.co")
        .await
        .unwrap();
    assert!(ctx.sender.messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn issuing_a_new_token_retires_the_previous_one() {
    let ctx = setup().await;
    register_passenger(&ctx, "reset@unisabana.edu.co", "R0001").await;

    ctx.identity
        .forgot_password("reset@unisabana.edu.co")
        .await
        .unwrap();
    let first = {
        let messages = ctx.sender.messages.lock().unwrap();
        messages.last().unwrap().2.split_whitespace().last().unwrap().to_string()
    };
    ctx.identity
        .forgot_password("reset@unisabana.edu.co")
        .await
        .unwrap();

    let err = ctx
        .identity
        .reset_password(&first, "NuevoPass123")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::TokenInvalidOrExpired));
}

#[tokio::test]
async fn role_switch_gates() {
    let ctx = setup().await;
    let passenger = register_passenger(&ctx, "p@unisabana.edu.co", "P0001").await;
    let err = ctx
        .identity
        .switch_role(&passenger, Role::Driver)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::RoleNotEnabled));

    let (driver, vehicle_id) = register_driver(&ctx, "d@unisabana.edu.co", "D0001", "XYZ987").await;
    // switch back to passenger always works
    ctx.identity
        .switch_role(&driver, Role::Passenger)
        .await
        .unwrap();
    // pending vehicle: not eligible for the driver role
    let err = ctx
        .identity
        .switch_role(&driver, Role::Driver)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::DocumentsInvalid));

    // verify the vehicle through the review machine, then switch works
    ctx.vehicles.request_review(&driver, &vehicle_id).await.unwrap();
    ctx.vehicles
        .apply_review(&vehicle_id, VehicleStatus::Verified, "admin", None)
        .await
        .unwrap();
    let user = ctx.identity.switch_role(&driver, Role::Driver).await.unwrap();
    assert_eq!(user.active_role, Role::Driver);
}

// ── Vehicle flows ───────────────────────────────────────────────

#[tokio::test]
async fn expired_documents_rejected_at_creation() {
    let ctx = setup().await;
    let user = register_passenger(&ctx, "v@unisabana.edu.co", "V0001").await;

    let mut expired = vehicle_input("AAA111");
    expired.soat_expiration = Utc::now() - Duration::days(1);
    let err = ctx.vehicles.create(&user, expired).await.unwrap_err();
    assert!(matches!(err, DomainError::ExpiredDocument));
}

#[tokio::test]
async fn plate_validation_accepts_normalized_forms_only() {
    let ctx = setup().await;
    let user = register_passenger(&ctx, "v@unisabana.edu.co", "V0001").await;

    // normalization uppercases and strips whitespace
    let vehicle = ctx
        .vehicles
        .create(&user, vehicle_input("abc 123"))
        .await
        .unwrap();
    assert_eq!(vehicle.plate, "ABC123");

    for bad in ["AB1234", "A1C123", "ABCD12"] {
        let err = ctx
            .vehicles
            .create(&user, vehicle_input(bad))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)), "{bad} accepted");
    }
}

#[tokio::test]
async fn material_edit_resets_verification() {
    let ctx = setup().await;
    let (driver, vehicle_id) = register_driver(&ctx, "d@unisabana.edu.co", "D0001", "ABC123").await;
    ctx.vehicles.request_review(&driver, &vehicle_id).await.unwrap();
    ctx.vehicles
        .apply_review(&vehicle_id, VehicleStatus::Verified, "admin", Some("ok".into()))
        .await
        .unwrap();

    // non-material edit keeps the verification
    let vehicle = ctx
        .vehicles
        .update(
            &driver,
            &vehicle_id,
            VehicleUpdate {
                color: Some("rojo".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(vehicle.status, VehicleStatus::Verified);

    // material edit drops back to pending and clears review metadata
    let vehicle = ctx
        .vehicles
        .update(
            &driver,
            &vehicle_id,
            VehicleUpdate {
                brand: Some("Mazda".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(vehicle.status, VehicleStatus::Pending);
    assert!(vehicle.reviewed_at.is_none());
    assert!(vehicle.reviewed_by.is_none());
    assert!(vehicle.verification_notes.is_none());
}

#[tokio::test]
async fn activate_requires_verified_and_valid_documents() {
    let ctx = setup().await;
    let (driver, vehicle_id) = register_driver(&ctx, "d@unisabana.edu.co", "D0001", "ABC123").await;

    let err = ctx.vehicles.activate(&driver, &vehicle_id).await.unwrap_err();
    assert!(matches!(err, DomainError::DocumentsInvalid));

    ctx.vehicles.request_review(&driver, &vehicle_id).await.unwrap();
    ctx.vehicles
        .apply_review(&vehicle_id, VehicleStatus::Verified, "admin", None)
        .await
        .unwrap();
    let owner = ctx.vehicles.activate(&driver, &vehicle_id).await.unwrap();
    assert_eq!(owner.active_vehicle_id.as_deref(), Some(vehicle_id.as_str()));
}

#[tokio::test]
async fn delete_blocked_by_future_trip_then_released() {
    let ctx = setup().await;
    let (driver, vehicle_id) = register_driver(&ctx, "d@unisabana.edu.co", "D0001", "ABC123").await;
    let trip = ctx.trips.create_trip(&driver, trip_input()).await.unwrap();

    let err = ctx.vehicles.delete(&driver, &vehicle_id).await.unwrap_err();
    assert!(matches!(err, DomainError::BlockedByActiveTrips));

    ctx.trips.cancel_trip(&driver, &trip.id).await.unwrap();
    let owner = ctx.vehicles.delete(&driver, &vehicle_id).await.unwrap();

    // last vehicle gone: driver capability stripped
    assert!(!owner.roles.contains(Role::Driver));
    assert_eq!(owner.active_role, Role::Passenger);
    assert!(owner.active_vehicle_id.is_none());
}

// ── Trip and reservation flows ──────────────────────────────────

#[tokio::test]
async fn trip_creation_gates() {
    let ctx = setup().await;
    let passenger = register_passenger(&ctx, "p@unisabana.edu.co", "P0001").await;
    let err = ctx.trips.create_trip(&passenger, trip_input()).await.unwrap_err();
    assert!(matches!(err, DomainError::RoleNotEnabled));

    let (driver, vehicle_id) = register_driver(&ctx, "d@unisabana.edu.co", "D0001", "ABC123").await;

    // departure in the past
    let mut past = trip_input();
    past.departure_at = Utc::now() - Duration::hours(1);
    assert!(matches!(
        ctx.trips.create_trip(&driver, past).await.unwrap_err(),
        DomainError::Validation(_)
    ));

    // seats beyond vehicle capacity
    let mut oversized = trip_input();
    oversized.seats_total = 9;
    assert!(matches!(
        ctx.trips.create_trip(&driver, oversized).await.unwrap_err(),
        DomainError::Validation(_)
    ));

    // expired documents close the gate
    ctx.vehicles
        .update(
            &driver,
            &vehicle_id,
            VehicleUpdate {
                soat_expiration: Some(Utc::now() - Duration::days(1)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(matches!(
        ctx.trips.create_trip(&driver, trip_input()).await.unwrap_err(),
        DomainError::ExpiredDocument
    ));
}

#[tokio::test]
async fn stops_shape_materializes_system_pickup_points() {
    let ctx = setup().await;
    let (driver, _) = register_driver(&ctx, "d@unisabana.edu.co", "D0001", "ABC123").await;

    let mut input = trip_input();
    input.shape = TripShape::Stops {
        origin_stop_id: "portal_norte".to_string(),
        destination_stop_id: "calle_100".to_string(),
        route: vec![
            crate::domain::route::GeoPoint::new(4.7546, -74.0459),
            crate::domain::route::GeoPoint::new(4.7268, -74.0510),
            crate::domain::route::GeoPoint::new(4.6826, -74.0599),
        ],
    };
    input.pickup_points = vec![];
    let trip = ctx.trips.create_trip(&driver, input).await.unwrap();

    assert_eq!(trip.origin, "Portal Norte");
    assert_eq!(trip.destination, "Calle 100");
    assert_eq!(trip.pickup_points.len(), 3);
    assert!(trip
        .pickup_points
        .iter()
        .all(|p| p.source == crate::domain::trip::PickupSource::System));
}

fn reserve_input(seats: i32) -> ReserveInput {
    ReserveInput {
        seats,
        pickup_points: (0..seats).map(|_| "Puente peatonal".to_string()).collect(),
        payment_method: PaymentMethod::Cash,
    }
}

#[tokio::test]
async fn concurrent_reservations_cannot_oversell() {
    let ctx = setup().await;
    let (driver, _) = register_driver(&ctx, "d@unisabana.edu.co", "D0001", "ABC123").await;
    let trip = ctx.trips.create_trip(&driver, trip_input()).await.unwrap();

    let p1 = register_passenger(&ctx, "p1@unisabana.edu.co", "P0001").await;
    let p2 = register_passenger(&ctx, "p2@unisabana.edu.co", "P0002").await;
    let p3 = register_passenger(&ctx, "p3@unisabana.edu.co", "P0003").await;

    // Three passengers race for 2 of the 3 seats each
    let (r1, r2, r3) = tokio::join!(
        ctx.trips.reserve(&p1, &trip.id, reserve_input(2)),
        ctx.trips.reserve(&p2, &trip.id, reserve_input(2)),
        ctx.trips.reserve(&p3, &trip.id, reserve_input(2)),
    );
    let results = [r1, r2, r3];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one racer wins");
    for result in &results {
        if let Err(e) = result {
            assert!(matches!(*e, DomainError::InsufficientSeats), "got {e}");
        }
    }
    assert_seat_invariants(&ctx, &trip.id).await;

    let current = ctx.trips.get(&trip.id).await.unwrap();
    assert_eq!(current.seats_available, 1);
    assert_eq!(current.status, TripStatus::Scheduled);

    // The last seat fills the trip
    let p4 = register_passenger(&ctx, "p4@unisabana.edu.co", "P0004").await;
    let (trip_after, _) = ctx.trips.reserve(&p4, &trip.id, reserve_input(1)).await.unwrap();
    assert_eq!(trip_after.seats_available, 0);
    assert_eq!(trip_after.status, TripStatus::Full);
    assert_seat_invariants(&ctx, &trip.id).await;
}

#[tokio::test]
async fn duplicate_active_reservation_rejected_rebooking_after_reject_allowed() {
    let ctx = setup().await;
    let (driver, _) = register_driver(&ctx, "d@unisabana.edu.co", "D0001", "ABC123").await;
    let trip = ctx.trips.create_trip(&driver, trip_input()).await.unwrap();
    let passenger = register_passenger(&ctx, "p@unisabana.edu.co", "P0001").await;

    let (_, reservation) = ctx
        .trips
        .reserve(&passenger, &trip.id, reserve_input(1))
        .await
        .unwrap();

    let err = ctx
        .trips
        .reserve(&passenger, &trip.id, reserve_input(1))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::DuplicateReservation));

    // rejection frees the passenger to book again
    ctx.trips
        .transition_reservation(&driver, &trip.id, &reservation.id, ReservationAction::Reject)
        .await
        .unwrap();
    ctx.trips
        .reserve(&passenger, &trip.id, reserve_input(1))
        .await
        .unwrap();
    assert_seat_invariants(&ctx, &trip.id).await;
}

#[tokio::test]
async fn driver_cannot_book_own_trip() {
    let ctx = setup().await;
    let (driver, _) = register_driver(&ctx, "d@unisabana.edu.co", "D0001", "ABC123").await;
    let trip = ctx.trips.create_trip(&driver, trip_input()).await.unwrap();

    let err = ctx
        .trips
        .reserve(&driver, &trip.id, reserve_input(1))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::OwnTrip));
}

#[tokio::test]
async fn reservation_shape_is_validated_locally() {
    let ctx = setup().await;
    let (driver, _) = register_driver(&ctx, "d@unisabana.edu.co", "D0001", "ABC123").await;
    let trip = ctx.trips.create_trip(&driver, trip_input()).await.unwrap();
    let passenger = register_passenger(&ctx, "p@unisabana.edu.co", "P0001").await;

    // pickup point count must equal seats
    let mut mismatched = reserve_input(2);
    mismatched.pickup_points.pop();
    assert!(matches!(
        ctx.trips
            .reserve(&passenger, &trip.id, mismatched)
            .await
            .unwrap_err(),
        DomainError::Validation(_)
    ));

    assert!(matches!(
        ctx.trips
            .reserve(&passenger, &trip.id, reserve_input(0))
            .await
            .unwrap_err(),
        DomainError::Validation(_)
    ));
}

#[tokio::test]
async fn reject_returns_seats_and_reopens_full_trip() {
    let ctx = setup().await;
    let (driver, _) = register_driver(&ctx, "d@unisabana.edu.co", "D0001", "ABC123").await;
    let trip = ctx.trips.create_trip(&driver, trip_input()).await.unwrap();
    let passenger = register_passenger(&ctx, "p@unisabana.edu.co", "P0001").await;

    let (after_reserve, reservation) = ctx
        .trips
        .reserve(&passenger, &trip.id, reserve_input(3))
        .await
        .unwrap();
    assert_eq!(after_reserve.status, TripStatus::Full);

    let rejected = ctx
        .trips
        .transition_reservation(&driver, &trip.id, &reservation.id, ReservationAction::Reject)
        .await
        .unwrap();
    assert_eq!(rejected.status, ReservationStatus::Rejected);
    assert!(rejected.decision_at.is_some());

    let current = ctx.trips.get(&trip.id).await.unwrap();
    assert_eq!(current.seats_available, 3);
    assert_eq!(current.status, TripStatus::Scheduled);
    assert_seat_invariants(&ctx, &trip.id).await;
}

#[tokio::test]
async fn confirm_holds_seats_and_terminal_states_are_idempotent() {
    let ctx = setup().await;
    let (driver, _) = register_driver(&ctx, "d@unisabana.edu.co", "D0001", "ABC123").await;
    let trip = ctx.trips.create_trip(&driver, trip_input()).await.unwrap();
    let passenger = register_passenger(&ctx, "p@unisabana.edu.co", "P0001").await;

    let (_, reservation) = ctx
        .trips
        .reserve(&passenger, &trip.id, reserve_input(2))
        .await
        .unwrap();

    let confirmed = ctx
        .trips
        .transition_reservation(&driver, &trip.id, &reservation.id, ReservationAction::Confirm)
        .await
        .unwrap();
    assert_eq!(confirmed.status, ReservationStatus::Confirmed);
    let current = ctx.trips.get(&trip.id).await.unwrap();
    assert_eq!(current.seats_available, 1);

    // confirm again: unchanged body, no error
    let again = ctx
        .trips
        .transition_reservation(&driver, &trip.id, &reservation.id, ReservationAction::Confirm)
        .await
        .unwrap();
    assert_eq!(again.status, ReservationStatus::Confirmed);

    // passenger cancels the confirmed reservation, seats return
    let cancelled = ctx
        .trips
        .transition_reservation(&passenger, &trip.id, &reservation.id, ReservationAction::Cancel)
        .await
        .unwrap();
    assert_eq!(cancelled.status, ReservationStatus::Cancelled);
    let current = ctx.trips.get(&trip.id).await.unwrap();
    assert_eq!(current.seats_available, 3);

    // cancel again: idempotent
    let again = ctx
        .trips
        .transition_reservation(&passenger, &trip.id, &reservation.id, ReservationAction::Cancel)
        .await
        .unwrap();
    assert_eq!(again.status, ReservationStatus::Cancelled);
    assert_seat_invariants(&ctx, &trip.id).await;
}

#[tokio::test]
async fn reservation_authorization() {
    let ctx = setup().await;
    let (driver, _) = register_driver(&ctx, "d@unisabana.edu.co", "D0001", "ABC123").await;
    let trip = ctx.trips.create_trip(&driver, trip_input()).await.unwrap();
    let passenger = register_passenger(&ctx, "p@unisabana.edu.co", "P0001").await;
    let stranger = register_passenger(&ctx, "s@unisabana.edu.co", "S0001").await;

    let (_, reservation) = ctx
        .trips
        .reserve(&passenger, &trip.id, reserve_input(1))
        .await
        .unwrap();

    // only the driver confirms
    assert!(matches!(
        ctx.trips
            .transition_reservation(&passenger, &trip.id, &reservation.id, ReservationAction::Confirm)
            .await
            .unwrap_err(),
        DomainError::Forbidden(_)
    ));
    // a stranger cannot cancel
    assert!(matches!(
        ctx.trips
            .transition_reservation(&stranger, &trip.id, &reservation.id, ReservationAction::Cancel)
            .await
            .unwrap_err(),
        DomainError::Forbidden(_)
    ));
}

#[tokio::test]
async fn trip_cancellation_fans_out_emails_and_zeroes_seats() {
    let ctx = setup().await;
    let (driver, _) = register_driver(&ctx, "d@unisabana.edu.co", "D0001", "ABC123").await;
    let trip = ctx.trips.create_trip(&driver, trip_input()).await.unwrap();

    let p1 = register_passenger(&ctx, "p1@unisabana.edu.co", "P0001").await;
    let p2 = register_passenger(&ctx, "p2@unisabana.edu.co", "P0002").await;
    ctx.trips.reserve(&p1, &trip.id, reserve_input(1)).await.unwrap();
    ctx.trips.reserve(&p2, &trip.id, reserve_input(1)).await.unwrap();

    let baseline = ctx.sender.messages.lock().unwrap().len();
    let cancelled = ctx.trips.cancel_trip(&driver, &trip.id).await.unwrap();
    assert_eq!(cancelled.status, TripStatus::Cancelled);
    assert_eq!(cancelled.seats_available, 0);

    for reservation in ctx.repos.trips().reservations_for_trip(&trip.id).await.unwrap() {
        assert_eq!(reservation.status, ReservationStatus::Cancelled);
    }

    let messages = ctx.sender.messages.lock().unwrap();
    let cancellation_mails: Vec<_> = messages[baseline..]
        .iter()
        .filter(|(_, subject, _)| subject == "Viaje cancelado")
        .collect();
    assert_eq!(cancellation_mails.len(), 2);
}

#[tokio::test]
async fn pickup_suggestions_capped_and_resolved() {
    let ctx = setup().await;
    let (driver, _) = register_driver(&ctx, "d@unisabana.edu.co", "D0001", "ABC123").await;
    let trip = ctx.trips.create_trip(&driver, trip_input()).await.unwrap();
    let passenger = register_passenger(&ctx, "p@unisabana.edu.co", "P0001").await;

    let suggest = |name: &str| SuggestPickupInput {
        name: name.to_string(),
        description: None,
        lat: 4.73,
        lng: -74.05,
    };

    // the driver cannot suggest on their own trip
    assert!(matches!(
        ctx.trips.suggest_pickup(&driver, &trip.id, suggest("X")).await.unwrap_err(),
        DomainError::Forbidden(_)
    ));

    let first = ctx
        .trips
        .suggest_pickup(&passenger, &trip.id, suggest("Mazurén"))
        .await
        .unwrap();
    ctx.trips
        .suggest_pickup(&passenger, &trip.id, suggest("Alcalá"))
        .await
        .unwrap();
    ctx.trips
        .suggest_pickup(&passenger, &trip.id, suggest("Prado"))
        .await
        .unwrap();

    // fourth pending suggestion is throttled
    let err = ctx
        .trips
        .suggest_pickup(&passenger, &trip.id, suggest("Calle 146"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::TooManyPendingSuggestions));

    // the mirrored point is active until the driver decides
    let current = ctx.trips.get(&trip.id).await.unwrap();
    let mirror = current
        .pickup_points
        .iter()
        .find(|p| p.id == first.mirror_point_id)
        .unwrap();
    assert_eq!(mirror.source, crate::domain::trip::PickupSource::Passenger);
    assert_eq!(mirror.status, crate::domain::trip::TripPointStatus::Active);

    // rejection withdraws the mirrored point and unblocks the passenger
    let resolved = ctx
        .trips
        .resolve_suggestion(&driver, &trip.id, &first.id, false)
        .await
        .unwrap();
    assert_eq!(resolved.status, crate::domain::trip::SuggestionStatus::Rejected);
    let current = ctx.trips.get(&trip.id).await.unwrap();
    let mirror = current
        .pickup_points
        .iter()
        .find(|p| p.id == first.mirror_point_id)
        .unwrap();
    assert_eq!(mirror.status, crate::domain::trip::TripPointStatus::Rejected);

    ctx.trips
        .suggest_pickup(&passenger, &trip.id, suggest("Calle 146"))
        .await
        .unwrap();
}

#[tokio::test]
async fn listing_filters_and_rating_enrichment() {
    let ctx = setup().await;
    let (driver, _) = register_driver(&ctx, "d@unisabana.edu.co", "D0001", "ABC123").await;

    let mut cheap = trip_input();
    cheap.price_per_seat = 4000.0;
    let mut pricey = trip_input();
    pricey.shape = TripShape::Legacy {
        origin: "Chía centro".to_string(),
        destination: "Calle 100".to_string(),
    };
    pricey.price_per_seat = 9000.0;
    pricey.departure_at = Utc::now() + Duration::hours(2);
    ctx.trips.create_trip(&driver, cheap).await.unwrap();
    ctx.trips.create_trip(&driver, pricey).await.unwrap();

    // departure ascending
    let all = ctx.trips.list(Default::default()).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all[0].trip.departure_at <= all[1].trip.departure_at);
    assert_eq!(all[0].driver_stats.rating_count, 0);

    // price ceiling
    let filtered = ctx
        .trips
        .list(crate::domain::trip::TripFilter {
            max_price: Some(5000.0),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].trip.price_per_seat, 4000.0);

    // origin substring
    let filtered = ctx
        .trips
        .list(crate::domain::trip::TripFilter {
            departure_point: Some("Chía".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].trip.origin, "Chía centro");
}

#[tokio::test]
async fn passenger_manifest_is_driver_only() {
    let ctx = setup().await;
    let (driver, _) = register_driver(&ctx, "d@unisabana.edu.co", "D0001", "ABC123").await;
    let trip = ctx.trips.create_trip(&driver, trip_input()).await.unwrap();
    let passenger = register_passenger(&ctx, "p@unisabana.edu.co", "P0001").await;
    ctx.trips.reserve(&passenger, &trip.id, reserve_input(2)).await.unwrap();

    assert!(matches!(
        ctx.trips.passengers(&passenger, &trip.id).await.unwrap_err(),
        DomainError::Forbidden(_)
    ));

    let manifest = ctx.trips.passengers(&driver, &trip.id).await.unwrap();
    assert_eq!(manifest.len(), 1);
    assert_eq!(manifest[0].passenger_email, "p@unisabana.edu.co");
    assert_eq!(manifest[0].reservation.seats, 2);
    assert_eq!(manifest[0].reservation.pickup_points.len(), 2);
}
