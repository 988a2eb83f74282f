//! Database infrastructure: connection, entities, migrations and SeaORM
//! repository implementations.

pub mod entities;
pub mod migrator;
pub mod repositories;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;
use tracing::info;

/// Database connection settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Open the connection pool
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(&config.url);
    options
        .max_connections(20)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    info!("Database connection established");
    Ok(db)
}
