use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{create_class, delete_class, get_class, list_classes, update_class};

/// Mounted under `/api/v1`. The collection answers with and without a trailing slash.
pub fn init_classes_router() -> Router<AppState> {
    Router::new()
        .route("/classes", post(create_class).get(list_classes))
        .route("/classes/", post(create_class).get(list_classes))
        .route(
            "/classes/{id}",
            get(get_class).put(update_class).delete(delete_class),
        )
}
