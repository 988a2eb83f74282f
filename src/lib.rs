//! # Unirides
//!
//! Campus ride-sharing backend: drivers publish scheduled trips from a
//! vehicle they own, passengers discover trips and reserve seats, the
//! driver confirms or rejects, either side may cancel.
//!
//! ## Architecture (Clean / SOLID)
//!
//! - **shared**: Cross-cutting pure validators (plate, email domain, coordinates)
//! - **domain**: Core business entities, repository traits, and value objects
//! - **application**: Use-case orchestration (identity, vehicles, trips, tariff, routing)
//! - **infrastructure**: External concerns (database, crypto, email, blob storage, route providers)
//! - **interfaces**: Delivery mechanism (HTTP REST with Swagger docs)
//! - **config**: Application configuration (TOML-based)

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;

// Re-export commonly used types at crate root
pub use config::{default_config_path, AppConfig};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::database::{init_database, DatabaseConfig};
pub use interfaces::http::create_api_router;
