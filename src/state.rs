use std::sync::Arc;

use schoolbook_config::{AppConfig, CorsConfig, JwtConfig, RateLimitConfig, Settings, UploadConfig};
use schoolbook_core::file_storage::{FileStorage, LocalFileStorage};
use sqlx::PgPool;

/// URL prefix the upload directory is served under.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub app_config: AppConfig,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub upload_config: UploadConfig,
    pub rate_limit_config: RateLimitConfig,
    pub storage: Arc<dyn FileStorage>,
}

impl AppState {
    pub fn new(db: PgPool, settings: Settings) -> Self {
        let storage = LocalFileStorage::with_max_size(
            settings.upload.upload_dir.clone(),
            UPLOADS_URL_PREFIX.to_string(),
            settings.upload.max_file_size,
        );

        Self {
            db,
            app_config: settings.app,
            jwt_config: settings.jwt,
            cors_config: settings.cors,
            upload_config: settings.upload,
            rate_limit_config: settings.rate_limit,
            storage: Arc::new(storage),
        }
    }
}
