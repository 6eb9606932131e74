use std::env;

use crate::env_or;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JwtConfig {
    pub secret: String,
    /// One of `HS256`, `HS384`, `HS512`.
    pub algorithm: String,
    pub access_token_expire_minutes: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "your-secret-key-change-in-production".to_string(),
            algorithm: "HS256".to_string(),
            access_token_expire_minutes: 30,
        }
    }
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret: env::var("SECRET_KEY")
                .or_else(|_| env::var("JWT_SECRET"))
                .unwrap_or(defaults.secret),
            algorithm: env::var("ALGORITHM")
                .map(|s| s.to_uppercase())
                .unwrap_or(defaults.algorithm),
            access_token_expire_minutes: env_or(
                "ACCESS_TOKEN_EXPIRE_MINUTES",
                defaults.access_token_expire_minutes,
            ),
        }
    }

    pub fn access_token_expiry_seconds(&self) -> i64 {
        self.access_token_expire_minutes * 60
    }
}
