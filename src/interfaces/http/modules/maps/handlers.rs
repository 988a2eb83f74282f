//! Maps API handlers: cached route lookups and the Transmilenio catalog

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};

use super::dto::{
    parse_coord, parse_mode, CalculateRequest, RouteQuery, RouteResponse, RouteSuggestResponse,
};
use crate::domain::route::GeoPoint;
use crate::infrastructure::routing::catalog;
use crate::interfaces::http::common::ApiError;
use crate::interfaces::http::modules::ApiState;

#[utoipa::path(
    get,
    path = "/maps/distance",
    tag = "Maps",
    security(("bearer_auth" = [])),
    params(RouteQuery),
    responses(
        (status = 200, description = "Cached route metrics", body = RouteResponse),
        (status = 502, description = "Route provider failure")
    )
)]
pub async fn distance(
    State(state): State<ApiState>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<RouteResponse>, ApiError> {
    let origin = parse_coord(&query.origin)?;
    let destination = parse_coord(&query.destination)?;
    let mode = parse_mode(query.mode.as_deref())?;
    let entry = state.route_cache.lookup(origin, destination, mode).await?;
    Ok(Json(entry.into()))
}

#[utoipa::path(
    post,
    path = "/maps/calculate",
    tag = "Maps",
    security(("bearer_auth" = [])),
    request_body = CalculateRequest,
    responses(
        (status = 200, description = "Route metrics with polyline", body = RouteResponse),
        (status = 502, description = "Route provider failure")
    )
)]
pub async fn calculate(
    State(state): State<ApiState>,
    Json(request): Json<CalculateRequest>,
) -> Result<Json<RouteResponse>, ApiError> {
    let origin = GeoPoint::new(request.origin.lat, request.origin.lng);
    let destination = GeoPoint::new(request.destination.lat, request.destination.lng);
    let mode = parse_mode(request.mode.as_deref())?;
    let entry = state.route_cache.lookup(origin, destination, mode).await?;
    Ok(Json(entry.into()))
}

#[utoipa::path(
    get,
    path = "/maps/route-suggest",
    tag = "Maps",
    params(RouteQuery),
    responses(
        (status = 200, description = "Route metrics plus the suggested tariff", body = RouteSuggestResponse),
        (status = 502, description = "Route provider failure")
    )
)]
pub async fn route_suggest(
    State(state): State<ApiState>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<RouteSuggestResponse>, ApiError> {
    let origin = parse_coord(&query.origin)?;
    let destination = parse_coord(&query.destination)?;
    let mode = parse_mode(query.mode.as_deref())?;
    let entry = state.route_cache.lookup(origin, destination, mode).await?;

    let tariff = state.tariff.suggest(
        entry.summary.distance_meters / 1000.0,
        entry.summary.duration_seconds / 60.0,
        None,
        None,
    )?;
    Ok(Json(RouteSuggestResponse {
        route: entry.into(),
        tariff,
    }))
}

#[utoipa::path(
    get,
    path = "/maps/transmilenio/routes",
    tag = "Maps",
    responses((status = 200, description = "Known trunk routes"))
)]
pub async fn transmilenio_routes() -> Json<Value> {
    Json(json!(catalog::ROUTES))
}

#[utoipa::path(
    get,
    path = "/maps/transmilenio/stations",
    tag = "Maps",
    responses((status = 200, description = "Known stations"))
)]
pub async fn transmilenio_stations() -> Json<Value> {
    Json(json!(catalog::stations()))
}

#[utoipa::path(
    get,
    path = "/maps/transmilenio/stops",
    tag = "Maps",
    responses((status = 200, description = "Snap-target stops"))
)]
pub async fn transmilenio_stops() -> Json<Value> {
    Json(json!(catalog::STOPS))
}
