use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use tracing::instrument;

use schoolbook_core::AppError;
use schoolbook_models::{ClassDto, ClassFilterParams, ClassResponse, MessageResponse};

use crate::middleware::auth::AuthUser;
use crate::middleware::role::RequireAdmin;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::ClassService;

/// Create a class
#[utoipa::path(
    post,
    path = "/api/v1/classes/",
    request_body = ClassDto,
    responses(
        (status = 201, description = "Class created", body = ClassResponse),
        (status = 400, description = "Class already exists for the academic year"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _admin, dto))]
pub async fn create_class(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ValidatedJson(dto): ValidatedJson<ClassDto>,
) -> Result<(StatusCode, Json<ClassResponse>), AppError> {
    let class = ClassService::create_class(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(class.into())))
}

/// List classes
#[utoipa::path(
    get,
    path = "/api/v1/classes/",
    params(ClassFilterParams),
    responses(
        (status = 200, description = "Classes ordered by grade level and name", body = Vec<ClassResponse>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user, filters))]
pub async fn list_classes(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    filters: Result<Query<ClassFilterParams>, QueryRejection>,
) -> Result<Json<Vec<ClassResponse>>, AppError> {
    let Query(filters) = filters
        .map_err(|e| AppError::unprocessable(anyhow::anyhow!("Invalid query parameters: {}", e)))?;
    let classes = ClassService::list_classes(&state.db, filters).await?;
    Ok(Json(classes.into_iter().map(ClassResponse::from).collect()))
}

/// Get a class by id
#[utoipa::path(
    get,
    path = "/api/v1/classes/{id}",
    params(("id" = i64, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class details", body = ClassResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Class not found")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_class(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ClassResponse>, AppError> {
    let class = ClassService::get_class(&state.db, id).await?;
    Ok(Json(class.into()))
}

/// Replace a class
#[utoipa::path(
    put,
    path = "/api/v1/classes/{id}",
    params(("id" = i64, Path, description = "Class ID")),
    request_body = ClassDto,
    responses(
        (status = 200, description = "Class updated", body = ClassResponse),
        (status = 400, description = "Class already exists for the academic year"),
        (status = 403, description = "Forbidden - admin only"),
        (status = 404, description = "Class not found")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _admin, dto))]
pub async fn update_class(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<ClassDto>,
) -> Result<Json<ClassResponse>, AppError> {
    let class = ClassService::update_class(&state.db, id, dto).await?;
    Ok(Json(class.into()))
}

/// Delete an empty class
#[utoipa::path(
    delete,
    path = "/api/v1/classes/{id}",
    params(("id" = i64, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class deleted", body = MessageResponse),
        (status = 400, description = "Class still has students"),
        (status = 403, description = "Forbidden - admin only"),
        (status = 404, description = "Class not found")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _admin))]
pub async fn delete_class(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    let name = ClassService::delete_class(&state.db, id).await?;
    Ok(Json(MessageResponse::new(format!(
        "Class {} deleted successfully",
        name
    ))))
}
