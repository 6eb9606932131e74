//! # Schoolbook Config
//!
//! Configuration loaded once from environment variables at process start.
//!
//! [`Settings`] aggregates every sub-config and is stored in the application
//! state; nothing below `main` reads the environment directly.
//!
//! - [`app`]: application name, version, debug flag, bind address, logging
//! - [`jwt`]: token signing secret, algorithm and lifetime
//! - [`cors`]: allowed cross-origin sources
//! - [`upload`]: photo size limit and storage directory
//! - [`rate_limit`]: request rate limits
//!
//! # Example
//!
//! ```ignore
//! dotenvy::dotenv().ok();
//! let settings = schoolbook_config::Settings::from_env();
//! println!("{} v{}", settings.app.name, settings.app.version);
//! ```

pub mod app;
pub mod cors;
pub mod jwt;
pub mod rate_limit;
pub mod upload;

pub use app::AppConfig;
pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use rate_limit::RateLimitConfig;
pub use upload::UploadConfig;

/// Reads `key` and parses it, falling back to `default` when unset or invalid.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

#[derive(Clone, Debug, Default)]
pub struct Settings {
    pub app: AppConfig,
    pub jwt: JwtConfig,
    pub cors: CorsConfig,
    pub upload: UploadConfig,
    pub rate_limit: RateLimitConfig,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            app: AppConfig::from_env(),
            jwt: JwtConfig::from_env(),
            cors: CorsConfig::from_env(),
            upload: UploadConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
        }
    }
}
