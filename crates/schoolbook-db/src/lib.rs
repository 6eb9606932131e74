//! # Schoolbook DB
//!
//! PostgreSQL pool construction and embedded schema migrations.
//!
//! # Example
//!
//! ```ignore
//! let pool = schoolbook_db::init_db_pool(&database_url).await?;
//! schoolbook_db::run_migrations(&pool).await?;
//! ```

use std::time::Duration;

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPoolOptions;

pub use sqlx::PgPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

const MAX_CONNECTIONS: u32 = 10;

/// Connects to `database_url` and returns a shared pool.
pub async fn init_db_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;

    tracing::info!(max_connections = MAX_CONNECTIONS, "database pool ready");
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await?;
    tracing::info!("database migrations applied");
    Ok(())
}

/// Cheap liveness probe used by the health endpoint.
pub async fn ping(pool: &PgPool) -> bool {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .is_ok()
}
