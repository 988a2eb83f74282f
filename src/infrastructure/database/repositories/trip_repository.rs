//! SeaORM implementation of TripRepository
//!
//! Seat accounting is done with conditional multi-row updates inside one
//! transaction: the decrement carries every precondition (seat count,
//! bookable status, caller is not the driver, no active duplicate), so
//! concurrent reservations serialize on the trip row and can never
//! oversell or double-book. The read-then-write shape is deliberately
//! absent from this path.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use sea_orm::sea_query::{Expr, ExprTrait, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::domain::trip::{
    NewReservation, PickupSource, PickupSuggestion, Reservation, ReservationStatus,
    SuggestionStatus, Trip, TripFilter, TripPickupPoint, TripPointStatus, TripRepository,
    TripStatus,
};
use crate::domain::user::PaymentMethod;
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{
    reservation, trip, trip_pickup_point, trip_pickup_suggestion,
};

const ACTIVE_RESERVATION: [&str; 2] = ["pending", "confirmed"];
const BOOKABLE_TRIP: [&str; 2] = ["scheduled", "full"];

pub struct SeaOrmTripRepository {
    db: DatabaseConnection,
}

impl SeaOrmTripRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load_points<C: ConnectionTrait>(
        &self,
        conn: &C,
        trip_id: &str,
    ) -> DomainResult<Vec<TripPickupPoint>> {
        let models = trip_pickup_point::Entity::find()
            .filter(trip_pickup_point::Column::TripId.eq(trip_id))
            .all(conn)
            .await?;
        Ok(models.into_iter().map(point_to_domain).collect())
    }

    async fn load_trip<C: ConnectionTrait>(
        &self,
        conn: &C,
        trip_id: &str,
    ) -> DomainResult<Option<Trip>> {
        let Some(model) = trip::Entity::find_by_id(trip_id).one(conn).await? else {
            return Ok(None);
        };
        let points = self.load_points(conn, trip_id).await?;
        Ok(Some(model_to_domain(model, points)))
    }

    /// Re-derive `scheduled` ⇄ `full` after a seat change, never touching
    /// terminal statuses.
    async fn normalize_status<C: ConnectionTrait>(
        &self,
        conn: &C,
        trip_id: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        trip::Entity::update_many()
            .col_expr(trip::Column::Status, Expr::value("full"))
            .col_expr(trip::Column::UpdatedAt, Expr::value(now))
            .filter(trip::Column::Id.eq(trip_id))
            .filter(trip::Column::Status.eq("scheduled"))
            .filter(trip::Column::SeatsAvailable.eq(0))
            .exec(conn)
            .await?;
        trip::Entity::update_many()
            .col_expr(trip::Column::Status, Expr::value("scheduled"))
            .col_expr(trip::Column::UpdatedAt, Expr::value(now))
            .filter(trip::Column::Id.eq(trip_id))
            .filter(trip::Column::Status.eq("full"))
            .filter(trip::Column::SeatsAvailable.gt(0))
            .exec(conn)
            .await?;
        Ok(())
    }

    /// The conditional update failed: read fresh state and name the
    /// root cause for the caller.
    async fn classify_reserve_failure(
        &self,
        trip_id: &str,
        passenger_id: &str,
        seats: i32,
    ) -> DomainError {
        let trip = match trip::Entity::find_by_id(trip_id).one(&self.db).await {
            Ok(Some(t)) => t,
            Ok(None) => return DomainError::TripNotFound,
            Err(e) => return e.into(),
        };

        if trip.driver_id == passenger_id {
            return DomainError::OwnTrip;
        }
        if !BOOKABLE_TRIP.contains(&trip.status.as_str()) {
            return DomainError::TripNotAvailable;
        }

        let duplicate = reservation::Entity::find()
            .filter(reservation::Column::TripId.eq(trip_id))
            .filter(reservation::Column::PassengerId.eq(passenger_id))
            .filter(reservation::Column::Status.is_in(ACTIVE_RESERVATION))
            .one(&self.db)
            .await;
        match duplicate {
            Ok(Some(_)) => return DomainError::DuplicateReservation,
            Err(e) => return e.into(),
            Ok(None) => {}
        }

        if trip.seats_available < seats {
            return DomainError::InsufficientSeats;
        }
        // Lost a race that has since resolved; the caller may retry
        DomainError::TripNotAvailable
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn point_to_domain(m: trip_pickup_point::Model) -> TripPickupPoint {
    TripPickupPoint {
        id: m.id,
        name: m.name,
        description: m.description,
        lat: m.lat,
        lng: m.lng,
        source: PickupSource::parse(&m.source),
        status: TripPointStatus::parse(&m.status),
    }
}

fn point_to_active(trip_id: &str, p: &TripPickupPoint) -> trip_pickup_point::ActiveModel {
    trip_pickup_point::ActiveModel {
        id: Set(p.id.clone()),
        trip_id: Set(trip_id.to_string()),
        name: Set(p.name.clone()),
        description: Set(p.description.clone()),
        lat: Set(p.lat),
        lng: Set(p.lng),
        source: Set(p.source.as_str().to_string()),
        status: Set(p.status.as_str().to_string()),
    }
}

fn model_to_domain(m: trip::Model, points: Vec<TripPickupPoint>) -> Trip {
    Trip {
        id: m.id,
        driver_id: m.driver_id,
        vehicle_id: m.vehicle_id,
        origin: m.origin,
        destination: m.destination,
        route_description: m.route_description,
        departure_at: m.departure_at,
        seats_total: m.seats_total,
        seats_available: m.seats_available,
        price_per_seat: m.price_per_seat,
        distance_km: m.distance_km,
        duration_minutes: m.duration_minutes,
        status: TripStatus::parse(&m.status),
        pickup_points: points,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn reservation_to_domain(m: reservation::Model) -> Reservation {
    Reservation {
        id: m.id,
        trip_id: m.trip_id,
        passenger_id: m.passenger_id,
        seats: m.seats,
        pickup_points: serde_json::from_str(&m.pickup_points).unwrap_or_default(),
        payment_method: PaymentMethod::parse(&m.payment_method).unwrap_or(PaymentMethod::Cash),
        status: ReservationStatus::parse(&m.status),
        created_at: m.created_at,
        decision_at: m.decision_at,
    }
}

fn suggestion_to_domain(m: trip_pickup_suggestion::Model) -> PickupSuggestion {
    PickupSuggestion {
        id: m.id,
        trip_id: m.trip_id,
        passenger_id: m.passenger_id,
        name: m.name,
        description: m.description,
        lat: m.lat,
        lng: m.lng,
        status: SuggestionStatus::parse(&m.status),
        mirror_point_id: m.mirror_point_id,
        created_at: m.created_at,
    }
}

// ── TripRepository impl ─────────────────────────────────────────

#[async_trait]
impl TripRepository for SeaOrmTripRepository {
    async fn save(&self, t: Trip) -> DomainResult<()> {
        debug!("Saving trip: {} ({} -> {})", t.id, t.origin, t.destination);
        let txn = self.db.begin().await?;
        trip::ActiveModel {
            id: Set(t.id.clone()),
            driver_id: Set(t.driver_id.clone()),
            vehicle_id: Set(t.vehicle_id.clone()),
            origin: Set(t.origin.clone()),
            destination: Set(t.destination.clone()),
            route_description: Set(t.route_description.clone()),
            departure_at: Set(t.departure_at),
            seats_total: Set(t.seats_total),
            seats_available: Set(t.seats_available),
            price_per_seat: Set(t.price_per_seat),
            distance_km: Set(t.distance_km),
            duration_minutes: Set(t.duration_minutes),
            status: Set(t.status.as_str().to_string()),
            created_at: Set(t.created_at),
            updated_at: Set(t.updated_at),
        }
        .insert(&txn)
        .await?;
        for point in &t.pickup_points {
            point_to_active(&t.id, point).insert(&txn).await?;
        }
        txn.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Trip>> {
        self.load_trip(&self.db, id).await
    }

    async fn list(&self, filter: &TripFilter) -> DomainResult<Vec<Trip>> {
        let mut query = trip::Entity::find()
            .filter(trip::Column::Status.is_in(BOOKABLE_TRIP))
            .order_by_asc(trip::Column::DepartureAt);

        if let Some(needle) = &filter.departure_point {
            query = query.filter(trip::Column::Origin.contains(needle));
        }
        if let Some(min_seats) = filter.min_seats {
            query = query.filter(trip::Column::SeatsAvailable.gte(min_seats));
        }
        if let Some(max_price) = filter.max_price {
            query = query.filter(trip::Column::PricePerSeat.lte(max_price));
        }
        if let Some(start) = filter.start_time {
            query = query.filter(trip::Column::DepartureAt.gte(start));
        }
        if let Some(end) = filter.end_time {
            query = query.filter(trip::Column::DepartureAt.lte(end));
        }

        let models = query.all(&self.db).await?;
        let mut trips = Vec::with_capacity(models.len());
        for model in models {
            let points = self.load_points(&self.db, &model.id.clone()).await?;
            trips.push(model_to_domain(model, points));
        }
        Ok(trips)
    }

    async fn reserve(&self, trip_id: &str, res: NewReservation) -> DomainResult<Trip> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        // Single conditional update: seat decrement plus every
        // precondition, including the NOT EXISTS duplicate guard.
        let duplicate_exists = Query::select()
            .expr(Expr::val(1))
            .from(reservation::Entity)
            .and_where(reservation::Column::TripId.eq(trip_id))
            .and_where(reservation::Column::PassengerId.eq(&res.passenger_id))
            .and_where(reservation::Column::Status.is_in(ACTIVE_RESERVATION))
            .to_owned();

        let result = trip::Entity::update_many()
            .col_expr(
                trip::Column::SeatsAvailable,
                Expr::col(trip::Column::SeatsAvailable).sub(res.seats),
            )
            .col_expr(trip::Column::UpdatedAt, Expr::value(now))
            .filter(trip::Column::Id.eq(trip_id))
            .filter(trip::Column::SeatsAvailable.gte(res.seats))
            .filter(trip::Column::Status.is_in(BOOKABLE_TRIP))
            .filter(trip::Column::DriverId.ne(&res.passenger_id))
            .filter(Condition::all().add(Expr::exists(duplicate_exists)).not())
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            drop(txn);
            return Err(
                self.classify_reserve_failure(trip_id, &res.passenger_id, res.seats)
                    .await,
            );
        }

        reservation::ActiveModel {
            id: Set(res.id.clone()),
            trip_id: Set(trip_id.to_string()),
            passenger_id: Set(res.passenger_id.clone()),
            seats: Set(res.seats),
            pickup_points: Set(serde_json::to_string(&res.pickup_points)
                .map_err(|e| DomainError::Database(e.to_string()))?),
            payment_method: Set(res.payment_method.as_str().to_string()),
            status: Set("pending".to_string()),
            created_at: Set(now),
            decision_at: Set(None),
        }
        .insert(&txn)
        .await?;

        self.normalize_status(&txn, trip_id, now).await?;

        let trip = self
            .load_trip(&txn, trip_id)
            .await?
            .ok_or(DomainError::TripNotFound)?;
        txn.commit().await?;
        Ok(trip)
    }

    async fn find_reservation(
        &self,
        trip_id: &str,
        reservation_id: &str,
    ) -> DomainResult<Option<Reservation>> {
        let model = reservation::Entity::find_by_id(reservation_id)
            .filter(reservation::Column::TripId.eq(trip_id))
            .one(&self.db)
            .await?;
        Ok(model.map(reservation_to_domain))
    }

    async fn reservations_for_trip(&self, trip_id: &str) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .filter(reservation::Column::TripId.eq(trip_id))
            .order_by_asc(reservation::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(reservation_to_domain).collect())
    }

    async fn transition_reservation(
        &self,
        trip_id: &str,
        reservation_id: &str,
        from: ReservationStatus,
        to: ReservationStatus,
        return_seats: bool,
    ) -> DomainResult<Reservation> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        // Guarded flip: loses against any concurrent transition
        let result = reservation::Entity::update_many()
            .col_expr(reservation::Column::Status, Expr::value(to.as_str()))
            .col_expr(reservation::Column::DecisionAt, Expr::value(Some(now)))
            .filter(reservation::Column::Id.eq(reservation_id))
            .filter(reservation::Column::TripId.eq(trip_id))
            .filter(reservation::Column::Status.eq(from.as_str()))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            drop(txn);
            return Err(DomainError::Conflict(
                "reservation changed concurrently".to_string(),
            ));
        }

        if return_seats {
            let record = reservation::Entity::find_by_id(reservation_id)
                .one(&txn)
                .await?
                .ok_or(DomainError::NotFound {
                    entity: "Reservation",
                    field: "id",
                    value: reservation_id.to_string(),
                })?;

            // Seats go back only while the trip itself is alive, and
            // never past seats_total.
            trip::Entity::update_many()
                .col_expr(
                    trip::Column::SeatsAvailable,
                    Expr::col(trip::Column::SeatsAvailable).add(record.seats),
                )
                .col_expr(trip::Column::UpdatedAt, Expr::value(now))
                .filter(trip::Column::Id.eq(trip_id))
                .filter(trip::Column::Status.is_in(BOOKABLE_TRIP))
                .filter(
                    Expr::col(trip::Column::SeatsAvailable)
                        .add(record.seats)
                        .lte(Expr::col(trip::Column::SeatsTotal)),
                )
                .exec(&txn)
                .await?;

            self.normalize_status(&txn, trip_id, now).await?;
        }

        let model = reservation::Entity::find_by_id(reservation_id)
            .one(&txn)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "Reservation",
                field: "id",
                value: reservation_id.to_string(),
            })?;
        txn.commit().await?;
        Ok(reservation_to_domain(model))
    }

    async fn cancel_trip(&self, trip_id: &str) -> DomainResult<Vec<Reservation>> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let trip = trip::Entity::find_by_id(trip_id)
            .one(&txn)
            .await?
            .ok_or(DomainError::TripNotFound)?;
        if trip.status == "cancelled" {
            return Ok(vec![]);
        }

        // Capture who loses a seat before the sweep
        let active = reservation::Entity::find()
            .filter(reservation::Column::TripId.eq(trip_id))
            .filter(reservation::Column::Status.is_in(ACTIVE_RESERVATION))
            .all(&txn)
            .await?;

        trip::Entity::update_many()
            .col_expr(trip::Column::Status, Expr::value("cancelled"))
            .col_expr(trip::Column::SeatsAvailable, Expr::value(0))
            .col_expr(trip::Column::UpdatedAt, Expr::value(now))
            .filter(trip::Column::Id.eq(trip_id))
            .exec(&txn)
            .await?;

        reservation::Entity::update_many()
            .col_expr(reservation::Column::Status, Expr::value("cancelled"))
            .col_expr(reservation::Column::DecisionAt, Expr::value(Some(now)))
            .filter(reservation::Column::TripId.eq(trip_id))
            .filter(reservation::Column::Status.is_in(ACTIVE_RESERVATION))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(active.into_iter().map(reservation_to_domain).collect())
    }

    async fn count_pending_suggestions(
        &self,
        trip_id: &str,
        passenger_id: &str,
    ) -> DomainResult<u64> {
        use sea_orm::PaginatorTrait;
        let count = trip_pickup_suggestion::Entity::find()
            .filter(trip_pickup_suggestion::Column::TripId.eq(trip_id))
            .filter(trip_pickup_suggestion::Column::PassengerId.eq(passenger_id))
            .filter(trip_pickup_suggestion::Column::Status.eq("pending"))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn add_suggestion(
        &self,
        s: PickupSuggestion,
        mirror: TripPickupPoint,
    ) -> DomainResult<()> {
        let txn = self.db.begin().await?;
        point_to_active(&s.trip_id, &mirror).insert(&txn).await?;
        trip_pickup_suggestion::ActiveModel {
            id: Set(s.id),
            trip_id: Set(s.trip_id),
            passenger_id: Set(s.passenger_id),
            name: Set(s.name),
            description: Set(s.description),
            lat: Set(s.lat),
            lng: Set(s.lng),
            status: Set(s.status.as_str().to_string()),
            mirror_point_id: Set(s.mirror_point_id),
            created_at: Set(s.created_at),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;
        Ok(())
    }

    async fn find_suggestion(
        &self,
        trip_id: &str,
        suggestion_id: &str,
    ) -> DomainResult<Option<PickupSuggestion>> {
        let model = trip_pickup_suggestion::Entity::find_by_id(suggestion_id)
            .filter(trip_pickup_suggestion::Column::TripId.eq(trip_id))
            .one(&self.db)
            .await?;
        Ok(model.map(suggestion_to_domain))
    }

    async fn suggestions_for_trip(&self, trip_id: &str) -> DomainResult<Vec<PickupSuggestion>> {
        let models = trip_pickup_suggestion::Entity::find()
            .filter(trip_pickup_suggestion::Column::TripId.eq(trip_id))
            .order_by_asc(trip_pickup_suggestion::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(suggestion_to_domain).collect())
    }

    async fn resolve_suggestion(
        &self,
        trip_id: &str,
        suggestion_id: &str,
        verdict: SuggestionStatus,
    ) -> DomainResult<PickupSuggestion> {
        let txn = self.db.begin().await?;

        // Only a pending suggestion can be settled
        let result = trip_pickup_suggestion::Entity::update_many()
            .col_expr(
                trip_pickup_suggestion::Column::Status,
                Expr::value(verdict.as_str()),
            )
            .filter(trip_pickup_suggestion::Column::Id.eq(suggestion_id))
            .filter(trip_pickup_suggestion::Column::TripId.eq(trip_id))
            .filter(trip_pickup_suggestion::Column::Status.eq("pending"))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            drop(txn);
            return Err(DomainError::Conflict(
                "suggestion is not pending".to_string(),
            ));
        }

        let record = trip_pickup_suggestion::Entity::find_by_id(suggestion_id)
            .one(&txn)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "PickupSuggestion",
                field: "id",
                value: suggestion_id.to_string(),
            })?;

        // The mirrored point follows the verdict
        let point_status = match verdict {
            SuggestionStatus::Accepted => "active",
            _ => "rejected",
        };
        trip_pickup_point::Entity::update_many()
            .col_expr(trip_pickup_point::Column::Status, Expr::value(point_status))
            .filter(trip_pickup_point::Column::Id.eq(&record.mirror_point_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(suggestion_to_domain(record))
    }

    async fn vehicle_has_blocking_trips(
        &self,
        vehicle_id: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<bool> {
        use sea_orm::PaginatorTrait;
        let count = trip::Entity::find()
            .filter(trip::Column::VehicleId.eq(vehicle_id))
            .filter(trip::Column::Status.is_in(BOOKABLE_TRIP))
            .filter(trip::Column::DepartureAt.gte(now))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }
}
