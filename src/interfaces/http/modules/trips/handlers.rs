//! Trip API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{
    CreateTripRequest, ManifestEntryResponse, PickupSuggestionRequest, PickupSuggestionResponse,
    ReservationCreatedResponse, ReservationRequest, ReservationResponse, TariffSuggestRequest,
    TripResponse, TripsQuery,
};
use crate::application::trips::{ReserveInput, SuggestPickupInput};
use crate::domain::trip::ReservationAction;
use crate::domain::user::PaymentMethod;
use crate::domain::DomainError;
use crate::interfaces::http::common::{ApiError, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::modules::ApiState;

#[utoipa::path(
    post,
    path = "/trips",
    tag = "Trips",
    security(("bearer_auth" = [])),
    request_body = CreateTripRequest,
    responses(
        (status = 201, description = "Trip published", body = TripResponse),
        (status = 400, description = "Validation error or expired documents"),
        (status = 403, description = "Caller lacks the driver role")
    )
)]
pub async fn create_trip(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateTripRequest>,
) -> Result<(StatusCode, Json<TripResponse>), ApiError> {
    let input = request.into_input()?;
    let trip = state.trips.create_trip(&user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(trip.into())))
}

#[utoipa::path(
    get,
    path = "/trips",
    tag = "Trips",
    security(("bearer_auth" = [])),
    params(TripsQuery),
    responses((status = 200, description = "Open trips, departure ascending", body = Vec<TripResponse>))
)]
pub async fn list_trips(
    State(state): State<ApiState>,
    Query(query): Query<TripsQuery>,
) -> Result<Json<Vec<TripResponse>>, ApiError> {
    let listings = state.trips.list(query.into()).await?;
    Ok(Json(listings.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/trips/{trip_id}/reservations",
    tag = "Trips",
    security(("bearer_auth" = [])),
    params(("trip_id" = String, Path, description = "Trip ID")),
    request_body = ReservationRequest,
    responses(
        (status = 201, description = "Reservation created", body = ReservationCreatedResponse),
        (status = 400, description = "Insufficient seats or trip not available"),
        (status = 403, description = "Drivers cannot book their own trip"),
        (status = 404, description = "Trip not found"),
        (status = 409, description = "Caller already holds an active reservation")
    )
)]
pub async fn create_reservation(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(trip_id): Path<String>,
    ValidatedJson(request): ValidatedJson<ReservationRequest>,
) -> Result<(StatusCode, Json<ReservationCreatedResponse>), ApiError> {
    let payment_method = PaymentMethod::parse(&request.payment_method).ok_or_else(|| {
        ApiError(DomainError::Validation(format!(
            "unknown payment method {}",
            request.payment_method
        )))
    })?;

    let (trip, reservation) = state
        .trips
        .reserve(
            &user.user_id,
            &trip_id,
            ReserveInput {
                seats: request.seats,
                pickup_points: request.pickup_points,
                payment_method,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ReservationCreatedResponse {
            reservation: reservation.into(),
            trip: trip.into(),
        }),
    ))
}

async fn transition(
    state: ApiState,
    user: AuthenticatedUser,
    trip_id: String,
    reservation_id: String,
    action: ReservationAction,
) -> Result<Json<ReservationResponse>, ApiError> {
    let reservation = state
        .trips
        .transition_reservation(&user.user_id, &trip_id, &reservation_id, action)
        .await?;
    Ok(Json(reservation.into()))
}

#[utoipa::path(
    put,
    path = "/trips/{trip_id}/reservations/{reservation_id}/confirm",
    tag = "Trips",
    security(("bearer_auth" = [])),
    params(
        ("trip_id" = String, Path, description = "Trip ID"),
        ("reservation_id" = String, Path, description = "Reservation ID")
    ),
    responses(
        (status = 200, description = "Reservation confirmed (idempotent on terminal states)", body = ReservationResponse),
        (status = 403, description = "Only the driver decides")
    )
)]
pub async fn confirm_reservation(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((trip_id, reservation_id)): Path<(String, String)>,
) -> Result<Json<ReservationResponse>, ApiError> {
    transition(state, user, trip_id, reservation_id, ReservationAction::Confirm).await
}

#[utoipa::path(
    put,
    path = "/trips/{trip_id}/reservations/{reservation_id}/reject",
    tag = "Trips",
    security(("bearer_auth" = [])),
    params(
        ("trip_id" = String, Path, description = "Trip ID"),
        ("reservation_id" = String, Path, description = "Reservation ID")
    ),
    responses(
        (status = 200, description = "Reservation rejected, seats returned", body = ReservationResponse),
        (status = 403, description = "Only the driver decides")
    )
)]
pub async fn reject_reservation(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((trip_id, reservation_id)): Path<(String, String)>,
) -> Result<Json<ReservationResponse>, ApiError> {
    transition(state, user, trip_id, reservation_id, ReservationAction::Reject).await
}

#[utoipa::path(
    put,
    path = "/trips/{trip_id}/reservations/{reservation_id}/cancel",
    tag = "Trips",
    security(("bearer_auth" = [])),
    params(
        ("trip_id" = String, Path, description = "Trip ID"),
        ("reservation_id" = String, Path, description = "Reservation ID")
    ),
    responses(
        (status = 200, description = "Reservation cancelled, seats returned", body = ReservationResponse),
        (status = 403, description = "Only the driver or the passenger may cancel")
    )
)]
pub async fn cancel_reservation(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((trip_id, reservation_id)): Path<(String, String)>,
) -> Result<Json<ReservationResponse>, ApiError> {
    transition(state, user, trip_id, reservation_id, ReservationAction::Cancel).await
}

#[utoipa::path(
    put,
    path = "/trips/{trip_id}/cancel",
    tag = "Trips",
    security(("bearer_auth" = [])),
    params(("trip_id" = String, Path, description = "Trip ID")),
    responses(
        (status = 200, description = "Trip cancelled; passengers notified", body = TripResponse),
        (status = 403, description = "Only the driver may cancel"),
        (status = 404, description = "Trip not found")
    )
)]
pub async fn cancel_trip(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(trip_id): Path<String>,
) -> Result<Json<TripResponse>, ApiError> {
    let trip = state.trips.cancel_trip(&user.user_id, &trip_id).await?;
    Ok(Json(trip.into()))
}

#[utoipa::path(
    post,
    path = "/trips/{trip_id}/pickup-suggestions",
    tag = "Trips",
    security(("bearer_auth" = [])),
    params(("trip_id" = String, Path, description = "Trip ID")),
    request_body = PickupSuggestionRequest,
    responses(
        (status = 201, description = "Suggestion queued", body = PickupSuggestionResponse),
        (status = 403, description = "Drivers manage pickup points directly"),
        (status = 429, description = "Too many pending suggestions")
    )
)]
pub async fn suggest_pickup(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(trip_id): Path<String>,
    ValidatedJson(request): ValidatedJson<PickupSuggestionRequest>,
) -> Result<(StatusCode, Json<PickupSuggestionResponse>), ApiError> {
    let suggestion = state
        .trips
        .suggest_pickup(
            &user.user_id,
            &trip_id,
            SuggestPickupInput {
                name: request.name,
                description: request.description,
                lat: request.lat,
                lng: request.lng,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(suggestion.into())))
}

#[utoipa::path(
    put,
    path = "/trips/{trip_id}/pickup-suggestions/{suggestion_id}/accept",
    tag = "Trips",
    security(("bearer_auth" = [])),
    params(
        ("trip_id" = String, Path, description = "Trip ID"),
        ("suggestion_id" = String, Path, description = "Suggestion ID")
    ),
    responses(
        (status = 200, description = "Suggestion accepted; point stays active", body = PickupSuggestionResponse),
        (status = 403, description = "Only the driver resolves suggestions")
    )
)]
pub async fn accept_suggestion(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((trip_id, suggestion_id)): Path<(String, String)>,
) -> Result<Json<PickupSuggestionResponse>, ApiError> {
    let suggestion = state
        .trips
        .resolve_suggestion(&user.user_id, &trip_id, &suggestion_id, true)
        .await?;
    Ok(Json(suggestion.into()))
}

#[utoipa::path(
    put,
    path = "/trips/{trip_id}/pickup-suggestions/{suggestion_id}/reject",
    tag = "Trips",
    security(("bearer_auth" = [])),
    params(
        ("trip_id" = String, Path, description = "Trip ID"),
        ("suggestion_id" = String, Path, description = "Suggestion ID")
    ),
    responses(
        (status = 200, description = "Suggestion rejected; point withdrawn", body = PickupSuggestionResponse),
        (status = 403, description = "Only the driver resolves suggestions")
    )
)]
pub async fn reject_suggestion(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((trip_id, suggestion_id)): Path<(String, String)>,
) -> Result<Json<PickupSuggestionResponse>, ApiError> {
    let suggestion = state
        .trips
        .resolve_suggestion(&user.user_id, &trip_id, &suggestion_id, false)
        .await?;
    Ok(Json(suggestion.into()))
}

#[utoipa::path(
    get,
    path = "/trips/{trip_id}/passengers",
    tag = "Trips",
    security(("bearer_auth" = [])),
    params(("trip_id" = String, Path, description = "Trip ID")),
    responses(
        (status = 200, description = "Passenger manifest", body = Vec<ManifestEntryResponse>),
        (status = 403, description = "Only the driver reads the manifest")
    )
)]
pub async fn list_passengers(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(trip_id): Path<String>,
) -> Result<Json<Vec<ManifestEntryResponse>>, ApiError> {
    let manifest = state.trips.passengers(&user.user_id, &trip_id).await?;
    Ok(Json(manifest.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/trips/tariff/suggest",
    tag = "Trips",
    security(("bearer_auth" = [])),
    request_body = TariffSuggestRequest,
    responses(
        (status = 200, description = "Suggested tariff with breakdown and range"),
        (status = 400, description = "Invalid tariff inputs")
    )
)]
pub async fn suggest_tariff(
    State(state): State<ApiState>,
    Json(request): Json<TariffSuggestRequest>,
) -> Result<Json<crate::application::tariff::TariffSuggestion>, ApiError> {
    let suggestion = state.tariff.suggest(
        request.distance_km,
        request.duration_minutes,
        request.demand_factor,
        request.occupancy,
    )?;
    Ok(Json(suggestion))
}
