//! Unirides server
//!
//! Campus ride-sharing backend. Reads configuration from a TOML file
//! (~/.config/unirides/config.toml by default, `UNIRIDES_CONFIG` to
//! override) and serves the REST API with Swagger UI at /docs.

use std::sync::Arc;
use std::time::Duration;

use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use unirides::application::identity::{IdentityService, InMemoryRevocationStore};
use unirides::application::routing::RouteCache;
use unirides::application::tariff::TariffCalculator;
use unirides::application::trips::TripService;
use unirides::application::vehicles::VehicleService;
use unirides::config::AppConfig;
use unirides::domain::RepositoryProvider;
use unirides::infrastructure::crypto::jwt::JwtConfig;
use unirides::infrastructure::database::migrator::Migrator;
use unirides::infrastructure::email::{EmailSender, NoopEmailSender, SmtpEmailSender};
use unirides::infrastructure::routing::make_provider;
use unirides::infrastructure::storage::LocalBlobStore;
use unirides::interfaces::http::middleware::AuthState;
use unirides::interfaces::http::modules::ApiState;
use unirides::interfaces::http::{create_api_router, create_degraded_router};
use unirides::{default_config_path, init_database, DatabaseConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("UNIRIDES_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level)),
                )
                .init();
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    info!("Starting Unirides backend...");

    // JWT secret is mandatory
    let Some(jwt_secret) = app_cfg.resolved_jwt_secret() else {
        error!("JWT_SECRET is not set (config [security].jwt_secret or env). Refusing to start.");
        std::process::exit(1);
    };
    let jwt_config = JwtConfig {
        secret: jwt_secret,
        expiration_days: app_cfg.security.jwt_expiration_days,
    };

    // ── Prometheus metrics recorder ────────────────────────────
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");

    // ── Database (optional: health and docs survive without it) ─
    let db_config = DatabaseConfig {
        url: app_cfg.database.connection_url(),
    };
    let db = match init_database(&db_config).await {
        Ok(db) => Some(db),
        Err(e) => {
            warn!(
                "Database unavailable ({}). Serving health and docs only.",
                e
            );
            None
        }
    };

    let router = match db {
        Some(db) => {
            info!("Running database migrations...");
            Migrator::up(&db, None).await?;
            info!("Migrations completed");

            // ── Facades ────────────────────────────────────────
            let email_sender: Arc<dyn EmailSender> = if app_cfg.email.enabled {
                Arc::new(SmtpEmailSender::new(&app_cfg.email)?)
            } else {
                info!("Email disabled; using the no-op sender");
                Arc::new(NoopEmailSender)
            };
            let blob_store = Arc::new(LocalBlobStore::new(app_cfg.uploads.dir.clone()));
            let route_provider = make_provider(&app_cfg.routing)?;
            let route_cache = Arc::new(RouteCache::new(
                route_provider,
                Duration::from_secs(app_cfg.routing.cache_ttl_minutes.max(10) * 60),
            ));

            // ── Services ───────────────────────────────────────
            let repos: Arc<dyn RepositoryProvider> =
                Arc::new(unirides::infrastructure::SeaOrmRepositoryProvider::new(db));
            let tariff = TariffCalculator::new(app_cfg.tariff.clone());
            let vehicles = Arc::new(VehicleService::new(
                repos.clone(),
                repos.trips(),
                app_cfg.vehicles.clone(),
            ));
            let revocation = Arc::new(InMemoryRevocationStore::new());
            let identity = Arc::new(IdentityService::new(
                repos.clone(),
                vehicles.clone(),
                jwt_config.clone(),
                email_sender.clone(),
                revocation.clone(),
                app_cfg.security.reset_token_ttl_minutes,
            ));
            let trips = Arc::new(TripService::new(
                repos.clone(),
                email_sender.clone(),
                tariff.clone(),
            ));

            let api_state = ApiState {
                identity,
                vehicles,
                trips,
                tariff,
                route_cache,
                blob_store,
                uploads: app_cfg.uploads.clone(),
            };
            let auth_state = AuthState {
                jwt_config,
                revocation,
            };

            create_api_router(api_state, auth_state, prometheus_handle)
        }
        None => create_degraded_router(),
    };

    // ── Serve ──────────────────────────────────────────────────
    let addr = format!("{}:{}", app_cfg.server.host, app_cfg.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("REST API server listening on http://{}", addr);
    info!("Swagger UI available at http://{}/docs/", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    info!("Unirides backend shutdown complete");
    Ok(())
}
