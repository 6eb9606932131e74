use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::instrument;

use schoolbook_core::AppError;
use schoolbook_models::{CreateUserDto, LoginForm, MessageResponse, TokenResponse, UserResponse};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::{ValidatedForm, ValidatedJson};

use super::service::AuthService;

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Username or email already registered"),
        (status = 422, description = "Validation error")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn register_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = AuthService::register_user(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Login with a form-encoded username (or email) and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Incorrect username or password"),
        (status = 403, description = "User account is deactivated")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, form))]
pub async fn login_user(
    State(state): State<AppState>,
    ValidatedForm(form): ValidatedForm<LoginForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = AuthService::login_user(&state.db, form, &state.jwt_config).await?;
    Ok(Json(token))
}

/// Current user profile
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Could not validate credentials")
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
pub async fn get_current_user(auth_user: AuthUser) -> Json<UserResponse> {
    Json(auth_user.0.into())
}

/// Logout. Tokens are stateless; the client discards its token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Could not validate credentials")
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
pub async fn logout_user(_auth_user: AuthUser) -> Json<MessageResponse> {
    Json(MessageResponse::new("Successfully logged out"))
}
