use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use tracing::debug;

use schoolbook_auth::jwt::{INVALID_TOKEN, verify_token};
use schoolbook_core::AppError;
use schoolbook_models::User;

use crate::modules::auth::service::AuthService;
use crate::state::AppState;

/// Extractor that resolves the bearer token to an active [`User`].
///
/// Fails with `401` when the header is missing or malformed, the token does
/// not verify, or its subject names no user; `403` when the account is
/// deactivated.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn id(&self) -> i64 {
        self.0.id
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| AppError::unauthorized(INVALID_TOKEN))?;

        let claims = verify_token(&token, &state.jwt_config)?;
        let user_id = claims
            .user_id()
            .ok_or_else(|| AppError::unauthorized(INVALID_TOKEN))?;

        let user = AuthService::find_user_by_id(&state.db, user_id)
            .await?
            .ok_or_else(|| {
                debug!(user.id = user_id, "Token subject does not exist");
                AppError::unauthorized(INVALID_TOKEN)
            })?;

        if !user.is_active {
            return Err(AppError::forbidden("User account is deactivated"));
        }

        Ok(AuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, header};

    fn parts_with(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_extracts_token() {
        assert_eq!(
            bearer_token(&parts_with(Some("Bearer abc.def"))).as_deref(),
            Some("abc.def")
        );
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        assert_eq!(bearer_token(&parts_with(Some("Basic dXNlcjpwYXNz"))), None);
        assert_eq!(bearer_token(&parts_with(Some("abc"))), None);
        assert_eq!(bearer_token(&parts_with(None)), None);
    }
}
