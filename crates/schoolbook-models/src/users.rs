//! User models, roles and role authorization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;
use validator::Validate;

/// The fixed set of roles a user can hold.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Satisfies every role requirement.
    Admin,
    #[default]
    Teacher,
    Parent,
    Student,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Teacher => "teacher",
            UserRole::Parent => "parent",
            UserRole::Student => "student",
        }
    }

    /// Whether a user holding `self` may access something requiring `required`.
    pub fn permits(self, required: UserRole) -> bool {
        is_authorized(required, self)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role check: an exact match passes, and `Admin` passes everything.
pub fn is_authorized(required: UserRole, actual: UserRole) -> bool {
    match (required, actual) {
        (_, UserRole::Admin) => true,
        (required, actual) => required == actual,
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub hashed_password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Public profile; never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            role: user.role,
            is_active: user.is_active,
            is_verified: user.is_verified,
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}

/// Registration body.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(email)]
    #[schema(example = "teacher@school.com")]
    pub email: String,
    #[validate(length(min = 3, max = 50))]
    #[validate(custom(function = "validate_username", message = "Username cannot contain '@'"))]
    #[schema(example = "teacher1")]
    pub username: String,
    #[validate(length(min = 8, max = 100))]
    pub password: String,
    #[validate(length(min = 1, max = 50))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50))]
    pub last_name: String,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
}

/// Login accepts a username or an email in the same field, so a username
/// must never look like an email.
pub fn validate_username(username: &str) -> Result<(), validator::ValidationError> {
    if username.contains('@') {
        return Err(validator::ValidationError::new("username_contains_at"));
    }
    Ok(())
}
