//! API Router with Swagger UI

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{middleware, Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::middleware::{auth_middleware, AuthState};
use super::modules::metrics::middleware::http_metrics_middleware;
use super::modules::{auth, health, maps, metrics, trips, vehicles, ApiState};

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::handlers::health_check,
        // Auth
        auth::handlers::register,
        auth::handlers::login,
        auth::handlers::get_current_user,
        auth::handlers::update_profile,
        auth::handlers::logout,
        auth::handlers::switch_role,
        auth::handlers::forgot_password,
        auth::handlers::reset_password,
        // Vehicles
        vehicles::handlers::list_vehicles,
        vehicles::handlers::create_vehicle,
        vehicles::handlers::validate_vehicle,
        vehicles::handlers::update_vehicle,
        vehicles::handlers::delete_vehicle,
        vehicles::handlers::activate_vehicle,
        vehicles::handlers::request_review,
        vehicles::handlers::add_pickup_point,
        vehicles::handlers::update_pickup_point,
        vehicles::handlers::delete_pickup_point,
        // Trips
        trips::handlers::create_trip,
        trips::handlers::list_trips,
        trips::handlers::create_reservation,
        trips::handlers::confirm_reservation,
        trips::handlers::reject_reservation,
        trips::handlers::cancel_reservation,
        trips::handlers::cancel_trip,
        trips::handlers::suggest_pickup,
        trips::handlers::accept_suggestion,
        trips::handlers::reject_suggestion,
        trips::handlers::list_passengers,
        trips::handlers::suggest_tariff,
        // Maps
        maps::handlers::distance,
        maps::handlers::calculate,
        maps::handlers::route_suggest,
        maps::handlers::transmilenio_routes,
        maps::handlers::transmilenio_stations,
        maps::handlers::transmilenio_stops,
        // Monitoring
        metrics::handlers::render_metrics,
    ),
    components(
        schemas(
            // Auth
            auth::dto::RegisterRequest,
            auth::dto::LoginRequest,
            auth::dto::LoginResponse,
            auth::dto::UpdateProfileRequest,
            auth::dto::SwitchRoleRequest,
            auth::dto::ForgotPasswordRequest,
            auth::dto::ResetPasswordRequest,
            auth::dto::UserResponse,
            // Vehicles
            vehicles::dto::CreateVehicleRequest,
            vehicles::dto::UpdateVehicleRequest,
            vehicles::dto::PickupPointRequest,
            vehicles::dto::PickupPointResponse,
            vehicles::dto::VehicleResponse,
            // Trips
            trips::dto::CreateTripRequest,
            trips::dto::GeoPointRequest,
            trips::dto::TariffAttachmentRequest,
            trips::dto::ReservationRequest,
            trips::dto::ReservationResponse,
            trips::dto::ReservationCreatedResponse,
            trips::dto::PickupSuggestionRequest,
            trips::dto::PickupSuggestionResponse,
            trips::dto::TripResponse,
            trips::dto::TripPickupPointResponse,
            trips::dto::DriverStatsResponse,
            trips::dto::ManifestEntryResponse,
            trips::dto::TariffSuggestRequest,
            // Maps
            maps::dto::CalculateRequest,
            maps::dto::CoordinateBody,
            maps::dto::RouteResponse,
            maps::dto::RouteSuggestResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Authentication", description = "Registration, login, profile, role switching, password reset"),
        (name = "Vehicles", description = "Vehicle registry, document verification, pickup points"),
        (name = "Trips", description = "Trip publication, seat reservations, pickup suggestions"),
        (name = "Maps", description = "Route metrics, tariff suggestion, Transmilenio catalog"),
        (name = "Monitoring", description = "Prometheus metrics"),
    ),
    info(
        title = "Unirides API",
        version = "1.0.0",
        description = "Campus ride-sharing backend: trips, seat reservations, vehicle verification",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(
    state: ApiState,
    auth_state: AuthState,
    prometheus_handle: PrometheusHandle,
) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public auth endpoints
    let auth_public = Router::new()
        .route("/register", post(auth::handlers::register))
        .route("/login", post(auth::handlers::login))
        .route("/forgot-password", post(auth::handlers::forgot_password))
        .route("/reset-password", post(auth::handlers::reset_password))
        .with_state(state.clone());

    // Protected auth endpoints
    let auth_protected = Router::new()
        .route(
            "/me",
            get(auth::handlers::get_current_user).put(auth::handlers::update_profile),
        )
        .route("/logout", post(auth::handlers::logout))
        .route("/role", put(auth::handlers::switch_role))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(state.clone());

    // Vehicles (all protected; multipart allowed on create/update)
    let upload_limit = (state.uploads.max_size_mb as usize) * 1024 * 1024 * 4;
    let vehicle_routes = Router::new()
        .route(
            "/",
            get(vehicles::handlers::list_vehicles).post(vehicles::handlers::create_vehicle),
        )
        .route("/validate", post(vehicles::handlers::validate_vehicle))
        .route(
            "/{id}",
            put(vehicles::handlers::update_vehicle).delete(vehicles::handlers::delete_vehicle),
        )
        .route("/{id}/activate", put(vehicles::handlers::activate_vehicle))
        .route(
            "/{id}/request-review",
            post(vehicles::handlers::request_review),
        )
        .route(
            "/{id}/pickup-points",
            post(vehicles::handlers::add_pickup_point),
        )
        .route(
            "/{id}/pickup-points/{point_id}",
            put(vehicles::handlers::update_pickup_point)
                .delete(vehicles::handlers::delete_pickup_point),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(state.clone());

    // Trips (all protected)
    let trip_routes = Router::new()
        .route(
            "/",
            get(trips::handlers::list_trips).post(trips::handlers::create_trip),
        )
        .route("/tariff/suggest", post(trips::handlers::suggest_tariff))
        .route(
            "/{trip_id}/reservations",
            post(trips::handlers::create_reservation),
        )
        .route(
            "/{trip_id}/reservations/{reservation_id}/confirm",
            put(trips::handlers::confirm_reservation),
        )
        .route(
            "/{trip_id}/reservations/{reservation_id}/reject",
            put(trips::handlers::reject_reservation),
        )
        .route(
            "/{trip_id}/reservations/{reservation_id}/cancel",
            put(trips::handlers::cancel_reservation),
        )
        .route("/{trip_id}/cancel", put(trips::handlers::cancel_trip))
        .route(
            "/{trip_id}/pickup-suggestions",
            post(trips::handlers::suggest_pickup),
        )
        .route(
            "/{trip_id}/pickup-suggestions/{suggestion_id}/accept",
            put(trips::handlers::accept_suggestion),
        )
        .route(
            "/{trip_id}/pickup-suggestions/{suggestion_id}/reject",
            put(trips::handlers::reject_suggestion),
        )
        .route("/{trip_id}/passengers", get(trips::handlers::list_passengers))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(state.clone());

    // Maps: catalog and route-suggest are public, metrics lookups need auth
    let maps_public = Router::new()
        .route("/route-suggest", get(maps::handlers::route_suggest))
        .route(
            "/transmilenio/routes",
            get(maps::handlers::transmilenio_routes),
        )
        .route(
            "/transmilenio/stations",
            get(maps::handlers::transmilenio_stations),
        )
        .route(
            "/transmilenio/stops",
            get(maps::handlers::transmilenio_stops),
        )
        .with_state(state.clone());

    let maps_protected = Router::new()
        .route("/distance", get(maps::handlers::distance))
        .route("/calculate", post(maps::handlers::calculate))
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .with_state(state);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(swagger_routes)
        .route("/health", get(health::handlers::health_check))
        .route("/metrics", get(metrics::handlers::render_metrics))
        .with_state(prometheus_handle)
        .nest("/auth", auth_public)
        .nest("/auth", auth_protected)
        .nest("/vehicles", vehicle_routes)
        .nest("/trips", trip_routes)
        .nest("/maps", maps_public)
        .nest("/maps", maps_protected)
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Minimal router served when the database is not configured: health
/// and documentation stay up, everything else answers 503.
pub fn create_degraded_router() -> Router {
    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(swagger_routes)
        .route("/health", get(health::handlers::health_check))
        .fallback(|| async {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "SERVICE_UNAVAILABLE" })),
            )
        })
        .layer(TraceLayer::new_for_http())
}
