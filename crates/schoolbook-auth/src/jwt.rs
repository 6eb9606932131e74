//! Access token issuing and verification.
//!
//! Tokens are signed with the configured HMAC algorithm (`HS256` unless
//! `ALGORITHM` says otherwise) and expire `ACCESS_TOKEN_EXPIRE_MINUTES`
//! after issuance. Verification allows no clock leeway.

use std::str::FromStr;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use schoolbook_config::JwtConfig;
use schoolbook_core::AppError;

use crate::claims::Claims;

pub const INVALID_TOKEN: &str = "Could not validate credentials";

fn algorithm(jwt_config: &JwtConfig) -> Result<Algorithm, AppError> {
    match Algorithm::from_str(&jwt_config.algorithm) {
        Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => Ok(alg),
        _ => Err(AppError::internal_error(format!(
            "Unsupported token algorithm: {}",
            jwt_config.algorithm
        ))),
    }
}

/// Issues a signed access token for `user_id`.
pub fn create_access_token(user_id: i64, jwt_config: &JwtConfig) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let exp = now + jwt_config.access_token_expiry_seconds();

    let claims = Claims {
        sub: user_id.to_string(),
        exp: exp.max(0) as usize,
        iat: now as usize,
    };

    encode(
        &Header::new(algorithm(jwt_config)?),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

/// Checks signature and expiry and returns the claims.
///
/// Every failure (malformed token, bad signature, expired, missing or empty
/// subject) yields the same `unauthenticated` error.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    let mut validation = Validation::new(algorithm(jwt_config)?);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized(INVALID_TOKEN))?;

    if claims.sub.trim().is_empty() {
        return Err(AppError::unauthorized(INVALID_TOKEN));
    }

    Ok(claims)
}
