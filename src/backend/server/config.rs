//! Server Configuration
//!
//! Configuration comes from environment variables. The database is
//! optional: without `DATABASE_URL` the ledger runs memory-only and the
//! server still starts, so configuration errors are logged rather than
//! fatal.

use sqlx::PgPool;

use crate::backend::ledger::db;

/// Database connection pool, or `None` when the ledger is memory-only.
pub type DatabaseConfig = Option<PgPool>;

/// Load the PostgreSQL pool from `DATABASE_URL` and make sure the ledger
/// schema exists.
///
/// Returns `None` when the variable is unset or the connection fails;
/// either way the server runs, with durability disabled.
pub async fn load_database() -> DatabaseConfig {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; ledger persistence disabled");
            return None;
        }
    };

    tracing::info!("Connecting to database...");
    let pool = match PgPool::connect(&database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Ledger persistence disabled");
            return None;
        }
    };

    if let Err(e) = db::ensure_schema(&pool).await {
        tracing::error!("Failed to create ledger schema: {:?}", e);
        tracing::warn!("Ledger persistence disabled");
        return None;
    }

    tracing::info!("Database connection pool ready");
    Some(pool)
}

/// Port the server listens on (`SERVER_PORT`, default 3000).
pub fn server_port() -> u16 {
    std::env::var("SERVER_PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(3000)
}
