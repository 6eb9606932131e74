use schoolbook_auth::jwt::{INVALID_TOKEN, create_access_token, verify_token};
use schoolbook_config::JwtConfig;

fn get_test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        algorithm: "HS256".to_string(),
        access_token_expire_minutes: 60,
    }
}

#[test]
fn test_create_access_token_success() {
    let token = create_access_token(42, &get_test_jwt_config()).unwrap();
    assert!(!token.is_empty());
    assert_eq!(token.split('.').count(), 3);
}

#[test]
fn test_verify_token_success() {
    let jwt_config = get_test_jwt_config();
    let token = create_access_token(42, &jwt_config).unwrap();

    let claims = verify_token(&token, &jwt_config).unwrap();

    assert_eq!(claims.sub, "42");
    assert_eq!(claims.user_id(), Some(42));
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[test]
fn test_verify_token_wrong_secret() {
    let token = create_access_token(42, &get_test_jwt_config()).unwrap();
    let other = JwtConfig {
        secret: "a_different_secret".to_string(),
        ..get_test_jwt_config()
    };

    let err = verify_token(&token, &other).unwrap_err();
    assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);
    assert_eq!(err.error.to_string(), INVALID_TOKEN);
}

#[test]
fn test_verify_token_malformed() {
    let jwt_config = get_test_jwt_config();
    assert!(verify_token("not.a.token", &jwt_config).is_err());
    assert!(verify_token("", &jwt_config).is_err());
}

#[test]
fn test_verify_token_expired() {
    let expired = JwtConfig {
        access_token_expire_minutes: -5,
        ..get_test_jwt_config()
    };
    let token = create_access_token(42, &expired).unwrap();

    let err = verify_token(&token, &get_test_jwt_config()).unwrap_err();
    assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);
}

#[test]
fn test_tampered_token_rejected() {
    let jwt_config = get_test_jwt_config();
    let token = create_access_token(42, &jwt_config).unwrap();
    let mut parts: Vec<&str> = token.split('.').collect();
    let forged_payload = create_access_token(1, &jwt_config).unwrap();
    let forged: Vec<&str> = forged_payload.split('.').collect();
    parts[1] = forged[1];

    assert!(verify_token(&parts.join("."), &jwt_config).is_err());
}
