mod common;

use axum::http::StatusCode;
use common::{TestApp, empty_request, json_request, read_json, send, setup_test_app, user_with_token};
use schoolbook_models::UserRole;
use serde_json::{Value, json};
use sqlx::PgPool;

fn class_body(name: &str, grade_level: i32) -> Value {
    json!({
        "name": name,
        "grade_level": grade_level,
        "section": "A",
        "academic_year": "2024-2025",
        "room_number": "101",
    })
}

async fn create_class(app: &TestApp, token: &str, body: &Value) -> Value {
    let response = send(app, json_request("POST", "/api/v1/classes/", Some(token), body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    read_json(response).await
}

async fn enroll_student(pool: &PgPool, class_id: i64, student_id: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO students (student_id, first_name, last_name, date_of_birth, gender,
                               guardian_name, guardian_relationship, guardian_phone, class_id)
         VALUES ($1, 'Kwame', 'Mensah', '2015-03-15', 'male', 'Ama Mensah', 'Mother', '+233201234567', $2)
         RETURNING id",
    )
    .bind(student_id)
    .bind(class_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_creates_class(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let (_, token) = user_with_token(&app, &pool, UserRole::Admin).await;

    let body = create_class(&app, &token, &class_body("Grade 1A", 1)).await;

    assert_eq!(body["name"], "Grade 1A");
    assert_eq!(body["max_students"], 40);
    assert_eq!(body["current_enrollment"], 0);
    assert_eq!(body["is_full"], false);
    assert!(body["id"].as_i64().unwrap() > 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_collection_answers_without_trailing_slash(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let (_, token) = user_with_token(&app, &pool, UserRole::Admin).await;

    let response = send(
        &app,
        json_request("POST", "/api/v1/classes", Some(&token), &class_body("Grade 2A", 2)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(&app, empty_request("GET", "/api/v1/classes", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_teacher_cannot_create_class(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let (_, token) = user_with_token(&app, &pool, UserRole::Teacher).await;

    let response = send(
        &app,
        json_request("POST", "/api/v1/classes/", Some(&token), &class_body("Grade 1A", 1)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = read_json(response).await;
    assert_eq!(
        body["error"],
        "User role 'teacher' does not have access. Required: 'admin'"
    );
    assert_eq!(body["code"], "forbidden");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unauthenticated_cannot_list(pool: PgPool) {
    let app = setup_test_app(pool);

    let response = send(&app, empty_request("GET", "/api/v1/classes/", None)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_class_rejected(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let (_, token) = user_with_token(&app, &pool, UserRole::Admin).await;
    create_class(&app, &token, &class_body("Grade 1A", 1)).await;

    let response = send(
        &app,
        json_request("POST", "/api/v1/classes/", Some(&token), &class_body("Grade 1A", 1)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(response).await["error"],
        "Class 'Grade 1A' already exists for 2024-2025"
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_same_name_allowed_in_other_year(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let (_, token) = user_with_token(&app, &pool, UserRole::Admin).await;
    create_class(&app, &token, &class_body("Grade 1A", 1)).await;

    let mut body = class_body("Grade 1A", 1);
    body["academic_year"] = json!("2025-2026");
    create_class(&app, &token, &body).await;
}

#[sqlx::test(migrations = "./migrations")]
async fn test_invalid_grade_level(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let (_, token) = user_with_token(&app, &pool, UserRole::Admin).await;

    let response = send(
        &app,
        json_request("POST", "/api/v1/classes/", Some(&token), &class_body("Grade 13A", 13)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_orders_by_grade_then_name_and_filters(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let (_, admin) = user_with_token(&app, &pool, UserRole::Admin).await;
    create_class(&app, &admin, &class_body("Grade 2B", 2)).await;
    create_class(&app, &admin, &class_body("Grade 1B", 1)).await;
    create_class(&app, &admin, &class_body("Grade 1A", 1)).await;

    let (_, teacher) = user_with_token(&app, &pool, UserRole::Teacher).await;
    let response = send(&app, empty_request("GET", "/api/v1/classes/", Some(&teacher))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let names: Vec<String> = read_json(response)
        .await
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Grade 1A", "Grade 1B", "Grade 2B"]);

    let response = send(
        &app,
        empty_request("GET", "/api/v1/classes/?grade_level=2", Some(&teacher)),
    )
    .await;
    let body = read_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let response = send(
        &app,
        empty_request("GET", "/api/v1/classes/?academic_year=1999-2000", Some(&teacher)),
    )
    .await;
    assert!(read_json(response).await.as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_class_not_found(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let (_, token) = user_with_token(&app, &pool, UserRole::Teacher).await;

    let response = send(&app, empty_request("GET", "/api/v1/classes/999999", Some(&token))).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json(response).await;
    assert_eq!(body["error"], "Class with id 999999 not found");
    assert_eq!(body["code"], "not_found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_class_reports_enrollment(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let (_, token) = user_with_token(&app, &pool, UserRole::Admin).await;
    let mut body = class_body("Grade 3A", 3);
    body["max_students"] = json!(1);
    let class = create_class(&app, &token, &body).await;
    let class_id = class["id"].as_i64().unwrap();
    enroll_student(&pool, class_id, "STU2024001").await;

    let response = send(
        &app,
        empty_request("GET", &format!("/api/v1/classes/{}", class_id), Some(&token)),
    )
    .await;

    let body = read_json(response).await;
    assert_eq!(body["current_enrollment"], 1);
    assert_eq!(body["is_full"], true);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_replaces_fields(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let (_, token) = user_with_token(&app, &pool, UserRole::Admin).await;
    let class = create_class(&app, &token, &class_body("Grade 1A", 1)).await;
    let id = class["id"].as_i64().unwrap();

    let update = json!({
        "name": "Grade 1 Gold",
        "grade_level": 1,
        "academic_year": "2024-2025",
        "max_students": 30,
    });
    let response = send(
        &app,
        json_request("PUT", &format!("/api/v1/classes/{}", id), Some(&token), &update),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["name"], "Grade 1 Gold");
    assert_eq!(body["max_students"], 30);
    assert!(body["section"].is_null());
    assert!(body["room_number"].is_null());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_keeping_own_name_is_allowed(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let (_, token) = user_with_token(&app, &pool, UserRole::Admin).await;
    let class = create_class(&app, &token, &class_body("Grade 1A", 1)).await;
    let id = class["id"].as_i64().unwrap();

    let mut update = class_body("Grade 1A", 1);
    update["room_number"] = json!("202");
    let response = send(
        &app,
        json_request("PUT", &format!("/api/v1/classes/{}", id), Some(&token), &update),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["room_number"], "202");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_rename_conflict(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let (_, token) = user_with_token(&app, &pool, UserRole::Admin).await;
    create_class(&app, &token, &class_body("Grade 1A", 1)).await;
    let other = create_class(&app, &token, &class_body("Grade 1B", 1)).await;

    let response = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/v1/classes/{}", other["id"]),
            Some(&token),
            &class_body("Grade 1A", 1),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["code"], "conflict");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_class_with_students_rejected(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let (_, token) = user_with_token(&app, &pool, UserRole::Admin).await;
    let class = create_class(&app, &token, &class_body("Grade 4A", 4)).await;
    let class_id = class["id"].as_i64().unwrap();
    enroll_student(&pool, class_id, "STU2024001").await;
    enroll_student(&pool, class_id, "STU2024002").await;

    let response = send(
        &app,
        empty_request("DELETE", &format!("/api/v1/classes/{}", class_id), Some(&token)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(response).await["error"],
        "Cannot delete class with 2 enrolled students"
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_empty_class(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let (_, token) = user_with_token(&app, &pool, UserRole::Admin).await;
    let class = create_class(&app, &token, &class_body("Grade 5A", 5)).await;
    let uri = format!("/api/v1/classes/{}", class["id"]);

    let response = send(&app, empty_request("DELETE", &uri, Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await["message"],
        "Class Grade 5A deleted successfully"
    );

    let response = send(&app, empty_request("GET", &uri, Some(&token))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_teacher_cannot_delete_class(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let (_, admin) = user_with_token(&app, &pool, UserRole::Admin).await;
    let class = create_class(&app, &admin, &class_body("Grade 6A", 6)).await;
    let (_, teacher) = user_with_token(&app, &pool, UserRole::Teacher).await;

    let response = send(
        &app,
        empty_request("DELETE", &format!("/api/v1/classes/{}", class["id"]), Some(&teacher)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deactivated_student_still_holds_seat(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let (_, token) = user_with_token(&app, &pool, UserRole::Admin).await;
    let mut body = class_body("Grade 7A", 7);
    body["max_students"] = json!(1);
    let class = create_class(&app, &token, &body).await;
    let class_uri = format!("/api/v1/classes/{}", class["id"]);
    let student_id = enroll_student(&pool, class["id"].as_i64().unwrap(), "STU2024001").await;

    let response = send(
        &app,
        empty_request("DELETE", &format!("/api/v1/students/{}", student_id), Some(&token)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, empty_request("DELETE", &class_uri, Some(&token))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["code"], "conflict");
    assert_eq!(body["error"], "Cannot delete class with 1 enrolled students");

    let response = send(&app, empty_request("GET", &class_uri, Some(&token))).await;
    let body = read_json(response).await;
    assert_eq!(body["current_enrollment"], 1);
    assert_eq!(body["is_full"], true);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_teacher_cannot_update_class(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let (_, admin) = user_with_token(&app, &pool, UserRole::Admin).await;
    let class = create_class(&app, &admin, &class_body("Grade 8A", 8)).await;
    let (_, teacher) = user_with_token(&app, &pool, UserRole::Teacher).await;

    let response = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/v1/classes/{}", class["id"]),
            Some(&teacher),
            &class_body("Grade 8 Gold", 8),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        read_json(response).await["error"],
        "User role 'teacher' does not have access. Required: 'admin'"
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_teacher_can_view_class(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let (_, admin) = user_with_token(&app, &pool, UserRole::Admin).await;
    let class = create_class(&app, &admin, &class_body("Grade 9A", 9)).await;
    let (_, teacher) = user_with_token(&app, &pool, UserRole::Teacher).await;

    let response = send(
        &app,
        empty_request("GET", &format!("/api/v1/classes/{}", class["id"]), Some(&teacher)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["name"], "Grade 9A");
}
