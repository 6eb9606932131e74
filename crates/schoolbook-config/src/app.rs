use crate::env_or;
use std::env;

pub const DEFAULT_APP_NAME: &str = "School Management System";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub name: String,
    pub version: String,
    pub debug: bool,
    pub host: String,
    pub port: u16,
    /// Default filter directive when `RUST_LOG` is unset.
    pub log_level: String,
    pub log_file: String,
    pub metrics_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_APP_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            debug: true,
            host: "0.0.0.0".to_string(),
            port: 8000,
            log_level: "info".to_string(),
            log_file: "logs/app.log".to_string(),
            metrics_enabled: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            name: env::var("APP_NAME").unwrap_or(defaults.name),
            version: env::var("APP_VERSION").unwrap_or(defaults.version),
            debug: env_or("DEBUG", defaults.debug),
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env_or("PORT", defaults.port),
            log_level: env::var("LOG_LEVEL")
                .map(|s| s.to_lowercase())
                .unwrap_or(defaults.log_level),
            log_file: env::var("LOG_FILE").unwrap_or(defaults.log_file),
            metrics_enabled: env_or("METRICS_ENABLED", defaults.metrics_enabled),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.name, "School Management System");
        assert!(config.debug);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
    }
}
