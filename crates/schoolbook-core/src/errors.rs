//! Application error type shared by every layer of the API.
//!
//! An [`AppError`] pairs an HTTP status and a machine-readable category code
//! with an `anyhow::Error` carrying the human-readable reason. Services return
//! `Result<T, AppError>` and handlers propagate them with `?`.
//!
//! The response body is always:
//!
//! ```json
//! { "error": "Class with id 7 not found", "code": "not_found" }
//! ```
//!
//! `401` responses additionally carry `WWW-Authenticate: Bearer`.

use anyhow::Error;
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

pub const UNAUTHENTICATED: &str = "unauthenticated";
pub const FORBIDDEN: &str = "forbidden";
pub const NOT_FOUND: &str = "not_found";
pub const CONFLICT: &str = "conflict";
pub const VALIDATION_ERROR: &str = "validation_error";
pub const UNSUPPORTED_MEDIA_TYPE: &str = "unsupported_media_type";
pub const INTERNAL_ERROR: &str = "internal_error";

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub code: &'static str,
    pub error: Error,
}

impl AppError {
    /// Builds an error whose category is inferred from the status.
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            code: code_for_status(status),
            error: err.into(),
        }
    }

    pub fn with_code<E>(status: StatusCode, code: &'static str, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            code,
            error: err.into(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    /// Uniqueness and capacity violations. Reported as `400` on the wire.
    pub fn conflict<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::with_code(StatusCode::BAD_REQUEST, CONFLICT, err)
    }

    pub fn unsupported_media_type<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, err)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, anyhow::anyhow!(message.into()))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, anyhow::anyhow!(message.into()))
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::internal(anyhow::anyhow!(message.into()))
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }
}

fn code_for_status(status: StatusCode) -> &'static str {
    match status {
        StatusCode::UNAUTHORIZED => UNAUTHENTICATED,
        StatusCode::FORBIDDEN => FORBIDDEN,
        StatusCode::NOT_FOUND => NOT_FOUND,
        StatusCode::CONFLICT => CONFLICT,
        StatusCode::UNSUPPORTED_MEDIA_TYPE => UNSUPPORTED_MEDIA_TYPE,
        s if s.is_client_error() => VALIDATION_ERROR,
        _ => INTERNAL_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(error = %self.error, code = self.code, "request failed");
        }

        let body = Json(json!({
            "error": self.error.to_string(),
            "code": self.code,
        }));

        let mut response = (self.status, body).into_response();
        if self.status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_is_bad_request_with_conflict_code() {
        let err = AppError::conflict(anyhow::anyhow!("Email already registered"));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, CONFLICT);
    }

    #[test]
    fn test_bad_request_is_validation_error() {
        let err = AppError::bad_request(anyhow::anyhow!("name is required"));
        assert_eq!(err.code, VALIDATION_ERROR);
    }

    #[test]
    fn test_status_codes_map_to_categories() {
        assert_eq!(AppError::unauthorized("x").code, UNAUTHENTICATED);
        assert_eq!(AppError::forbidden("x").code, FORBIDDEN);
        assert_eq!(AppError::not_found(anyhow::anyhow!("x")).code, NOT_FOUND);
        assert_eq!(
            AppError::unsupported_media_type(anyhow::anyhow!("x")).code,
            UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(AppError::internal_error("x").code, INTERNAL_ERROR);
    }

    #[test]
    fn test_unauthorized_response_carries_challenge() {
        let response = AppError::unauthorized("Could not validate credentials").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn test_forbidden_response_has_no_challenge() {
        let response = AppError::forbidden("User account is deactivated").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn test_foreign_errors_become_internal() {
        let io = std::io::Error::other("disk gone");
        let err: AppError = io.into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, INTERNAL_ERROR);
    }
}
