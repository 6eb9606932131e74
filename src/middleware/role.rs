//! Role checks for authenticated routes.
//!
//! A route requiring a role takes the matching extractor instead of
//! [`AuthUser`]. `admin` satisfies every requirement; any other role must
//! match exactly.
//!
//! ```rust,ignore
//! use crate::middleware::role::RequireAdmin;
//!
//! async fn delete_class(RequireAdmin(admin): RequireAdmin) -> Result<(), AppError> {
//!     // only reached by admins
//! }
//! ```

use schoolbook_core::AppError;
use schoolbook_models::{UserRole, is_authorized};

use crate::middleware::auth::AuthUser;

/// Passes when the user's role satisfies `required`.
pub fn check_role(auth_user: &AuthUser, required: UserRole) -> Result<(), AppError> {
    let actual = auth_user.0.role;
    if is_authorized(required, actual) {
        return Ok(());
    }

    tracing::warn!(
        user.id = auth_user.0.id,
        user.role = %actual,
        required = %required,
        "Role check failed"
    );
    Err(AppError::forbidden(format!(
        "User role '{}' does not have access. Required: '{}'",
        actual, required
    )))
}

/// Declares an extractor that authenticates the caller and then requires a role.
#[macro_export]
macro_rules! require_role {
    ($name:ident, $role:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthUser);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = schoolbook_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user = <$crate::middleware::auth::AuthUser as axum::extract::FromRequestParts<
                    $crate::state::AppState,
                >>::from_request_parts(parts, state)
                .await?;
                $crate::middleware::role::check_role(&auth_user, $role)?;
                Ok($name(auth_user))
            }
        }
    };
}

require_role!(RequireAdmin, schoolbook_models::UserRole::Admin);

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use schoolbook_models::User;

    fn user_with(role: UserRole) -> AuthUser {
        AuthUser(User {
            id: 1,
            email: "teacher@school.com".to_string(),
            username: "teacher1".to_string(),
            hashed_password: "x".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Smith".to_string(),
            phone: None,
            role,
            is_active: true,
            is_verified: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login: None,
        })
    }

    #[test]
    fn test_admin_passes_admin_requirement() {
        assert!(check_role(&user_with(UserRole::Admin), UserRole::Admin).is_ok());
        assert!(check_role(&user_with(UserRole::Admin), UserRole::Parent).is_ok());
    }

    #[test]
    fn test_teacher_denied_admin_requirement() {
        let err = check_role(&user_with(UserRole::Teacher), UserRole::Admin).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::FORBIDDEN);
        assert_eq!(
            err.error.to_string(),
            "User role 'teacher' does not have access. Required: 'admin'"
        );
    }
}
