mod common;

use axum::http::StatusCode;
use common::{empty_request, read_json, send, setup_test_app, setup_test_app_with};
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_root_welcome(pool: PgPool) {
    let app = setup_test_app_with(pool, |settings| {
        settings.app.name = "Test School".to_string();
    });

    let response = send(&app, empty_request("GET", "/", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Welcome to Test School");
    assert_eq!(body["status"], "running");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_health_reports_database(pool: PgPool) {
    let app = setup_test_app(pool);

    let response = send(&app, empty_request("GET", "/health", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "up");
    assert_eq!(body["app"], "School Management System");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_openapi_document_served(pool: PgPool) {
    let app = setup_test_app(pool);

    let response = send(&app, empty_request("GET", "/api-docs/openapi.json", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["info"]["title"], "Schoolbook API");
    assert!(body["paths"]["/api/v1/students/{id}/upload-photo"].is_object());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_request_id_is_echoed(pool: PgPool) {
    let app = setup_test_app(pool);

    let mut request = empty_request("GET", "/health", None);
    request
        .headers_mut()
        .insert("x-request-id", "trace-me-42".parse().unwrap());
    let response = send(&app, request).await;
    assert_eq!(response.headers().get("x-request-id").unwrap(), "trace-me-42");

    let response = send(&app, empty_request("GET", "/", None)).await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unknown_route_is_not_found(pool: PgPool) {
    let app = setup_test_app(pool);

    let response = send(&app, empty_request("GET", "/api/v1/nope", None)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
