//! Account administration that is not exposed over HTTP.

use sqlx::PgPool;

use schoolbook_core::hash_password;
use schoolbook_models::{UserRole, validate_username};

use crate::CliResult;

pub struct NewAdmin {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// Inserts an active, verified administrator and returns its id.
pub async fn create_admin(db: &PgPool, admin: &NewAdmin) -> CliResult<i64> {
    validate_username(&admin.username).map_err(|_| "Username cannot contain '@'")?;

    let hashed_password =
        hash_password(&admin.password).map_err(|e| format!("Failed to hash password: {}", e.error))?;

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (email, username, hashed_password, first_name, last_name, role, is_active, is_verified)
         VALUES ($1, $2, $3, $4, $5, $6, TRUE, TRUE)
         ON CONFLICT DO NOTHING
         RETURNING id",
    )
    .bind(&admin.email)
    .bind(&admin.username)
    .bind(&hashed_password)
    .bind(&admin.first_name)
    .bind(&admin.last_name)
    .bind(UserRole::Admin)
    .fetch_optional(db)
    .await?;

    id.ok_or_else(|| "A user with this username or email already exists".into())
}

/// Replaces the stored credential of an existing user.
pub async fn reset_password(db: &PgPool, username: &str, password: &str) -> CliResult<()> {
    let hashed_password =
        hash_password(password).map_err(|e| format!("Failed to hash password: {}", e.error))?;

    let result = sqlx::query(
        "UPDATE users SET hashed_password = $1, updated_at = NOW() WHERE username = $2",
    )
    .bind(&hashed_password)
    .bind(username)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(format!("User '{}' not found", username).into());
    }
    Ok(())
}
