use axum::Json;
use axum::extract::State;
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct WelcomeResponse {
    pub message: String,
    pub version: String,
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub app: String,
    pub version: String,
    /// `up` or `down`
    pub database: String,
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service information", body = WelcomeResponse)),
    tag = "System"
)]
pub async fn root(State(state): State<AppState>) -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: format!("Welcome to {}", state.app_config.name),
        version: state.app_config.version.clone(),
        status: "running".to_string(),
    })
}

/// Liveness check. Always `200`; the database state is reported in the body.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service health", body = HealthResponse)),
    tag = "System"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = if schoolbook_db::ping(&state.db).await {
        "up"
    } else {
        "down"
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        app: state.app_config.name.clone(),
        version: state.app_config.version.clone(),
        database: database.to_string(),
    })
}
