//! External concerns: database, crypto, email, blob storage and route
//! providers.

pub mod crypto;
pub mod database;
pub mod email;
pub mod routing;
pub mod storage;

pub use database::repositories::SeaOrmRepositoryProvider;
pub use database::{init_database, DatabaseConfig};
