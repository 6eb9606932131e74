//! Rate limiting configuration for the register and login endpoints.
//!
//! Limits are token buckets keyed by client IP, to slow down password guessing.
//!
//! # Environment Variables
//!
//! - `RATE_LIMIT_ENABLED`: Turn rate limiting on or off (default: true)
//! - `RATE_LIMIT_AUTH_PER_SECOND`: Token refill rate for auth endpoints (default: 10)
//! - `RATE_LIMIT_AUTH_BURST_SIZE`: Bucket size for auth endpoints (default: 5)

use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::SmartIpKeyExtractor;

use crate::env_or;

pub type IpGovernorConfig = GovernorConfig<SmartIpKeyExtractor, ::governor::middleware::NoOpMiddleware>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub auth_per_second: u64,
    pub auth_burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auth_per_second: 10,
            auth_burst_size: 5,
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_or("RATE_LIMIT_ENABLED", defaults.enabled),
            auth_per_second: env_or("RATE_LIMIT_AUTH_PER_SECOND", defaults.auth_per_second),
            auth_burst_size: env_or("RATE_LIMIT_AUTH_BURST_SIZE", defaults.auth_burst_size),
        }
    }

    /// Governor config for the register and login endpoints.
    #[must_use]
    pub fn auth_governor_config(&self) -> IpGovernorConfig {
        build_governor(self.auth_per_second, self.auth_burst_size)
    }
}

fn build_governor(per_second: u64, burst_size: u32) -> IpGovernorConfig {
    // The builder only refuses a zero period or a zero burst.
    GovernorConfigBuilder::default()
        .per_second(per_second.max(1))
        .burst_size(burst_size.max(1))
        .key_extractor(SmartIpKeyExtractor)
        .finish()
        .expect("non-zero rate limit config is always valid")
}
