use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Form-encoded login body. `username` also accepts an email address.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginForm {
    #[validate(length(min = 1))]
    #[schema(example = "teacher1")]
    pub username: String,
    #[validate(length(min = 1))]
    #[schema(example = "TeacherPass123")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `bearer`.
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_is_bearer() {
        let json = serde_json::to_value(TokenResponse::bearer("abc".to_string())).unwrap();
        assert_eq!(json["token_type"], "bearer");
        assert_eq!(json["access_token"], "abc");
    }

    #[test]
    fn test_login_form_rejects_empty_password() {
        let form = LoginForm {
            username: "teacher1".to_string(),
            password: String::new(),
        };
        assert!(form.validate().is_err());
    }
}
