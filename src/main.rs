use std::net::SocketAddr;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use schoolbook::logging::init_tracing;
use schoolbook::metrics::init_metrics;
use schoolbook::router::init_router;
use schoolbook::state::AppState;
use schoolbook_config::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let settings = Settings::from_env();
    let _log_guard = init_tracing(&settings.app)?;

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let db = schoolbook_db::init_db_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    schoolbook_db::run_migrations(&db)
        .await
        .context("Failed to run migrations")?;

    std::fs::create_dir_all(&settings.upload.upload_dir)
        .with_context(|| format!("Failed to create {}", settings.upload.upload_dir.display()))?;

    let metrics_handle = init_metrics(settings.app.metrics_enabled)?;
    let address = settings.app.bind_address();
    let state = AppState::new(db, settings);
    let app = init_router(state, metrics_handle);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!(address = %address, "Server running");
    info!("Swagger UI available at http://{}/swagger-ui", address);
    info!("Scalar UI available at http://{}/scalar", address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
