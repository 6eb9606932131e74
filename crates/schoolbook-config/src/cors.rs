use std::env;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: parse_origins("http://localhost:3000,http://localhost:8000"),
        }
    }
}

impl CorsConfig {
    pub fn from_env() -> Self {
        match env::var("ALLOWED_ORIGINS") {
            Ok(raw) => Self {
                allowed_origins: parse_origins(&raw),
            },
            Err(_) => Self::default(),
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
