use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use schoolbook::router::init_router;
use schoolbook::state::AppState;
use schoolbook_config::Settings;
use schoolbook_core::hash_password;
use schoolbook_models::UserRole;
use serde_json::Value;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "testpass123";

/// Keeps the upload directory alive for the duration of a test.
pub struct TestApp {
    pub router: Router,
    #[allow(dead_code)]
    pub upload_dir: TempDir,
}

pub fn test_settings(upload_dir: &TempDir) -> Settings {
    let mut settings = Settings::default();
    settings.rate_limit.enabled = false;
    settings.upload.upload_dir = upload_dir.path().to_path_buf();
    settings.jwt.secret = "integration-test-secret".to_string();
    settings
}

pub fn setup_test_app(pool: PgPool) -> TestApp {
    let upload_dir = TempDir::new().unwrap();
    let settings = test_settings(&upload_dir);
    TestApp {
        router: init_router(AppState::new(pool, settings), None),
        upload_dir,
    }
}

#[allow(dead_code)]
pub fn setup_test_app_with(pool: PgPool, configure: impl FnOnce(&mut Settings)) -> TestApp {
    let upload_dir = TempDir::new().unwrap();
    let mut settings = test_settings(&upload_dir);
    configure(&mut settings);
    TestApp {
        router: init_router(AppState::new(pool, settings), None),
        upload_dir,
    }
}

#[allow(dead_code)]
pub struct TestUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

pub fn generate_unique_username() -> String {
    format!("user_{}", &Uuid::new_v4().simple().to_string()[..12])
}

/// Inserts an active user with the given role.
pub async fn create_test_user(pool: &PgPool, role: UserRole) -> TestUser {
    create_user_with_status(pool, role, true).await
}

pub async fn create_user_with_status(pool: &PgPool, role: UserRole, is_active: bool) -> TestUser {
    let username = generate_unique_username();
    let email = generate_unique_email();
    let hashed = hash_password(TEST_PASSWORD).unwrap();

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (email, username, hashed_password, first_name, last_name, role, is_active)
         VALUES ($1, $2, $3, 'Test', 'User', $4, $5)
         RETURNING id",
    )
    .bind(&email)
    .bind(&username)
    .bind(&hashed)
    .bind(role)
    .bind(is_active)
    .fetch_one(pool)
    .await
    .unwrap();

    TestUser {
        id,
        username,
        email,
        password: TEST_PASSWORD.to_string(),
    }
}

pub fn login_request(username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!(
            "username={}&password={}",
            username, password
        )))
        .unwrap()
}

/// Logs in through the API and returns the access token.
pub async fn login(app: &Router, user: &TestUser) -> String {
    let response = app
        .clone()
        .oneshot(login_request(&user.username, &user.password))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    body["access_token"].as_str().unwrap().to_string()
}

/// A logged-in user of the given role: `(user, token)`.
#[allow(dead_code)]
pub async fn user_with_token(app: &TestApp, pool: &PgPool, role: UserRole) -> (TestUser, String) {
    let user = create_test_user(pool, role).await;
    let token = login(&app.router, &user).await;
    (user, token)
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn send(app: &TestApp, request: Request<Body>) -> Response<Body> {
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn read_json(response: Response<Body>) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
