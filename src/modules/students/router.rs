use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_student, delete_student, get_student, list_students, update_student, upload_photo,
};

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Mounted under `/api/v1`. The collection answers with and without a trailing slash.
pub fn init_students_router(max_file_size: usize) -> Router<AppState> {
    Router::new()
        .route("/students", post(create_student).get(list_students))
        .route("/students/", post(create_student).get(list_students))
        .route(
            "/students/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route(
            "/students/{id}/upload-photo",
            post(upload_photo).layer(DefaultBodyLimit::max(max_file_size + MULTIPART_OVERHEAD)),
        )
}
