//! Configuration module
//!
//! TOML-based persistent configuration with auto-creation and defaults.
//! Every section is optional in the file; missing fields fall back to the
//! defaults below. `JWT_SECRET` may also come from the environment and is
//! required at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Database settings
    #[serde(default)]
    pub database: DatabaseSettings,

    /// JWT / security settings
    #[serde(default)]
    pub security: SecurityConfig,

    /// Outbound email (SMTP)
    #[serde(default)]
    pub email: EmailConfig,

    /// Route provider selection and cache
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Vehicle document uploads
    #[serde(default)]
    pub uploads: UploadConfig,

    /// Vehicle constraints
    #[serde(default)]
    pub vehicles: VehicleConfig,

    /// Tariff suggestion coefficients
    #[serde(default)]
    pub tariff: TariffConfig,

    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Graceful shutdown timeout (seconds)
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64,
}

/// Database type selector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    Sqlite,
    Postgres,
}

/// Database settings with driver selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Which database backend to use
    #[serde(default = "default_db_type")]
    pub driver: DbType,

    /// SQLite settings (used when driver = "sqlite")
    #[serde(default)]
    pub sqlite: SqliteConfig,

    /// PostgreSQL settings (used when driver = "postgres")
    #[serde(default)]
    pub postgres: PostgresConfig,
}

/// SQLite-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Path to the database file
    #[serde(default = "default_sqlite_path")]
    pub path: String,
}

/// PostgreSQL-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    #[serde(default = "default_pg_host")]
    pub host: String,
    #[serde(default = "default_pg_port")]
    pub port: u16,
    #[serde(default = "default_pg_user")]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_pg_database")]
    pub database: String,
}

/// JWT / password-reset security settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// JWT signing secret. Empty means "take from JWT_SECRET env var".
    #[serde(default)]
    pub jwt_secret: String,

    /// Bearer token lifetime in days
    #[serde(default = "default_jwt_expiration_days")]
    pub jwt_expiration_days: i64,

    /// Password-reset token lifetime in minutes
    #[serde(default = "default_reset_token_ttl")]
    pub reset_token_ttl_minutes: i64,
}

/// SMTP sender settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// When false the no-op sender is used and nothing leaves the process
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,

    /// From address on outgoing mail
    #[serde(default = "default_mail_from")]
    pub mail_from: String,
}

/// Route provider selector
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RouteProviderKind {
    Ors,
    Osrm,
    Google,
}

/// Route provider and cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    #[serde(default = "default_route_provider")]
    pub provider: RouteProviderKind,

    /// API key for providers that need one (ORS, Google)
    #[serde(default)]
    pub api_key: String,

    /// Override the provider base URL (self-hosted OSRM etc.)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Route cache TTL in minutes. Must be at least the provider
    /// rate-limit window; 10 is the floor.
    #[serde(default = "default_route_cache_ttl")]
    pub cache_ttl_minutes: u64,
}

/// Upload limits for vehicle documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Directory where document blobs are stored
    #[serde(default = "default_uploads_dir")]
    pub dir: String,

    /// Per-file size cap in MiB
    #[serde(default = "default_upload_max_mb")]
    pub max_size_mb: u64,
}

/// Vehicle capacity bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleConfig {
    #[serde(default = "default_min_capacity")]
    pub min_capacity: i32,
    #[serde(default = "default_max_capacity")]
    pub max_capacity: i32,
}

/// Tariff suggestion coefficients (COP)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffConfig {
    /// Flat boarding component
    #[serde(default = "default_base_boarding")]
    pub base_boarding: f64,

    /// Per-kilometer component
    #[serde(default = "default_per_km")]
    pub per_km: f64,

    /// Per-minute component
    #[serde(default = "default_per_minute")]
    pub per_minute: f64,

    /// Tolerance band around the suggestion, in percent
    #[serde(default = "default_tolerance_pct")]
    pub tolerance_pct: f64,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Defaults ───────────────────────────────────────────────────

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_db_type() -> DbType {
    DbType::Sqlite
}

fn default_sqlite_path() -> String {
    "unirides.db".to_string()
}

fn default_pg_host() -> String {
    "localhost".to_string()
}

fn default_pg_port() -> u16 {
    5432
}

fn default_pg_user() -> String {
    "unirides".to_string()
}

fn default_pg_database() -> String {
    "unirides".to_string()
}

fn default_jwt_expiration_days() -> i64 {
    7
}

fn default_reset_token_ttl() -> i64 {
    15
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_mail_from() -> String {
    "rides@unisabana.edu.co".to_string()
}

fn default_route_provider() -> RouteProviderKind {
    RouteProviderKind::Ors
}

fn default_route_cache_ttl() -> u64 {
    10
}

fn default_uploads_dir() -> String {
    "uploads".to_string()
}

fn default_upload_max_mb() -> u64 {
    5
}

fn default_min_capacity() -> i32 {
    1
}

fn default_max_capacity() -> i32 {
    8
}

fn default_base_boarding() -> f64 {
    1500.0
}

fn default_per_km() -> f64 {
    450.0
}

fn default_per_minute() -> f64 {
    60.0
}

fn default_tolerance_pct() -> f64 {
    20.0
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            driver: default_db_type(),
            sqlite: SqliteConfig::default(),
            postgres: PostgresConfig::default(),
        }
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: default_sqlite_path(),
        }
    }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: default_pg_host(),
            port: default_pg_port(),
            user: default_pg_user(),
            password: String::new(),
            database: default_pg_database(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_expiration_days: default_jwt_expiration_days(),
            reset_token_ttl_minutes: default_reset_token_ttl(),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            mail_from: default_mail_from(),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            provider: default_route_provider(),
            api_key: String::new(),
            base_url: None,
            cache_ttl_minutes: default_route_cache_ttl(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: default_uploads_dir(),
            max_size_mb: default_upload_max_mb(),
        }
    }
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            min_capacity: default_min_capacity(),
            max_capacity: default_max_capacity(),
        }
    }
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            base_boarding: default_base_boarding(),
            per_km: default_per_km(),
            per_minute: default_per_minute(),
            tolerance_pct: default_tolerance_pct(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ── Loading ────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from a TOML file. Missing file yields defaults;
    /// a malformed file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&raw).map_err(ConfigError::Parse)
    }

    /// Resolve the JWT secret: config value first, `JWT_SECRET` env second.
    /// The secret is mandatory; startup must abort without one.
    pub fn resolved_jwt_secret(&self) -> Option<String> {
        if !self.security.jwt_secret.is_empty() {
            return Some(self.security.jwt_secret.clone());
        }
        std::env::var("JWT_SECRET").ok().filter(|s| !s.is_empty())
    }
}

impl DatabaseSettings {
    /// Build the connection URL for the selected driver
    pub fn connection_url(&self) -> String {
        match self.driver {
            DbType::Sqlite => format!("sqlite://{}?mode=rwc", self.sqlite.path),
            DbType::Postgres => format!(
                "postgres://{}:{}@{}:{}/{}",
                self.postgres.user,
                self.postgres.password,
                self.postgres.host,
                self.postgres.port,
                self.postgres.database
            ),
        }
    }
}

/// Configuration loading failure
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Default config location: `~/.config/unirides/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("unirides")
        .join("config.toml")
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.security.jwt_expiration_days, 7);
        assert_eq!(cfg.security.reset_token_ttl_minutes, 15);
        assert_eq!(cfg.vehicles.min_capacity, 1);
        assert_eq!(cfg.vehicles.max_capacity, 8);
        assert_eq!(cfg.uploads.max_size_mb, 5);
        assert_eq!(cfg.routing.cache_ttl_minutes, 10);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            port = 9000

            [vehicles]
            max_capacity = 6
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.vehicles.max_capacity, 6);
        assert_eq!(cfg.vehicles.min_capacity, 1);
    }

    #[test]
    fn sqlite_connection_url() {
        let db = DatabaseSettings::default();
        assert_eq!(db.connection_url(), "sqlite://unirides.db?mode=rwc");
    }

    #[test]
    fn postgres_connection_url() {
        let db = DatabaseSettings {
            driver: DbType::Postgres,
            sqlite: SqliteConfig::default(),
            postgres: PostgresConfig {
                host: "db".into(),
                port: 5433,
                user: "u".into(),
                password: "p".into(),
                database: "rides".into(),
            },
        };
        assert_eq!(db.connection_url(), "postgres://u:p@db:5433/rides");
    }

    #[test]
    fn provider_kind_parses_lowercase() {
        let cfg: AppConfig = toml::from_str("[routing]\nprovider = \"osrm\"\n").unwrap();
        assert_eq!(cfg.routing.provider, RouteProviderKind::Osrm);
    }
}
