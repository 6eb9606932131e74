use anyhow::anyhow;
use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use tracing::instrument;

use schoolbook_core::AppError;
use schoolbook_models::{
    CreateStudentDto, MessageResponse, PhotoUploadResponse, StudentFilterParams,
    StudentListResponse, StudentResponse, UpdateStudentDto,
};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::{PhotoUpload, StudentService};

fn respond(student: schoolbook_models::Student) -> Json<StudentResponse> {
    Json(StudentResponse::from_student(student, Utc::now().date_naive()))
}

/// Create a student
#[utoipa::path(
    post,
    path = "/api/v1/students/",
    request_body = CreateStudentDto,
    responses(
        (status = 201, description = "Student created", body = StudentResponse),
        (status = 400, description = "Class full or email already registered"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Class not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user, dto))]
pub async fn create_student(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateStudentDto>,
) -> Result<(StatusCode, Json<StudentResponse>), AppError> {
    let student = StudentService::create_student(&state.db, dto).await?;
    Ok((StatusCode::CREATED, respond(student)))
}

/// List students with search, filters and pagination
#[utoipa::path(
    get,
    path = "/api/v1/students/",
    params(StudentFilterParams),
    responses(
        (status = 200, description = "Page of students", body = StudentListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Invalid page or page_size")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user, filters))]
pub async fn list_students(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    filters: Result<Query<StudentFilterParams>, QueryRejection>,
) -> Result<Json<StudentListResponse>, AppError> {
    let Query(filters) = filters
        .map_err(|e| AppError::unprocessable(anyhow!("Invalid query parameters: {}", e)))?;
    let page = StudentService::list_students(&state.db, filters).await?;
    Ok(Json(page))
}

/// Get a student by id
#[utoipa::path(
    get,
    path = "/api/v1/students/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student details", body = StudentResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Student not found")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_student(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<StudentResponse>, AppError> {
    let student = StudentService::get_student(&state.db, id).await?;
    Ok(respond(student))
}

/// Partially update a student
#[utoipa::path(
    put,
    path = "/api/v1/students/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    request_body = UpdateStudentDto,
    responses(
        (status = 200, description = "Student updated", body = StudentResponse),
        (status = 400, description = "Class full or email already registered"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Student or class not found")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user, dto))]
pub async fn update_student(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateStudentDto>,
) -> Result<Json<StudentResponse>, AppError> {
    let student = StudentService::update_student(&state.db, id, dto).await?;
    Ok(respond(student))
}

/// Deactivate a student (soft delete)
#[utoipa::path(
    delete,
    path = "/api/v1/students/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student deactivated", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Student not found")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn delete_student(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    let student_id = StudentService::deactivate_student(&state.db, id).await?;
    Ok(Json(MessageResponse::new(format!(
        "Student {} deactivated successfully",
        student_id
    ))))
}

/// Upload a JPEG or PNG photo in the multipart field `file`
#[utoipa::path(
    post,
    path = "/api/v1/students/{id}/upload-photo",
    params(("id" = i64, Path, description = "Student ID")),
    request_body(content_type = "multipart/form-data", description = "Photo in field `file`"),
    responses(
        (status = 200, description = "Photo stored", body = PhotoUploadResponse),
        (status = 400, description = "Missing or oversized file"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Student not found"),
        (status = 415, description = "Only JPG and PNG images are allowed")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user, multipart))]
pub async fn upload_photo(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<i64>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PhotoUploadResponse>, AppError> {
    let multipart = multipart
        .map_err(|e| AppError::bad_request(anyhow!("Expected a multipart body: {}", e.body_text())))?;
    let upload = read_photo_field(multipart, state.upload_config.max_file_size).await?;
    let photo_url = StudentService::upload_photo(&state.db, state.storage.as_ref(), id, upload).await?;

    Ok(Json(PhotoUploadResponse {
        message: "Photo uploaded successfully".to_string(),
        photo_url,
    }))
}

async fn read_photo_field(mut multipart: Multipart, max_bytes: usize) -> Result<PhotoUpload, AppError> {
    let too_large = || AppError::bad_request(anyhow!("File too large. Maximum size is {} bytes", max_bytes));

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            too_large()
        } else {
            AppError::bad_request(anyhow!("Invalid multipart body: {}", e.body_text()))
        }
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let filename = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                too_large()
            } else {
                AppError::bad_request(anyhow!("Invalid multipart body: {}", e.body_text()))
            }
        })?;

        return Ok(PhotoUpload {
            content_type,
            filename,
            bytes: bytes.to_vec(),
        });
    }

    Err(AppError::bad_request(anyhow!("file is required")))
}
