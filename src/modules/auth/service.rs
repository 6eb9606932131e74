use anyhow::anyhow;
use sqlx::PgPool;
use tracing::{debug, error, info, instrument, warn};

use schoolbook_auth::create_access_token;
use schoolbook_config::JwtConfig;
use schoolbook_core::{AppError, hash_password, verify_password};
use schoolbook_models::{CreateUserDto, LoginForm, TokenResponse, User};

use crate::metrics;

const USER_COLUMNS: &str = "id, email, username, hashed_password, first_name, last_name, phone, \
     role, is_active, is_verified, created_at, updated_at, last_login";

const INVALID_CREDENTIALS: &str = "Incorrect username or password";

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, dto), fields(user.username = %dto.username, db.operation = "INSERT", db.table = "users"))]
    pub async fn register_user(db: &PgPool, dto: CreateUserDto) -> Result<User, AppError> {
        let username_taken =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(&dto.username)
                .fetch_one(db)
                .await?;
        if username_taken {
            warn!(user.username = %dto.username, "Registration with existing username");
            return Err(AppError::conflict(anyhow!("Username already registered")));
        }

        let email_taken =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(&dto.email)
                .fetch_one(db)
                .await?;
        if email_taken {
            warn!(user.email = %dto.email, "Registration with existing email");
            return Err(AppError::conflict(anyhow!("Email already registered")));
        }

        let hashed_password = hash_password(&dto.password)?;
        let role = dto.role.unwrap_or_default();

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, username, hashed_password, first_name, last_name, phone, role)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&dto.email)
        .bind(&dto.username)
        .bind(&hashed_password)
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.phone)
        .bind(role)
        .fetch_one(db)
        .await
        .map_err(|e| {
            // A concurrent registration can still win the race past the checks above.
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                let message = match db_err.constraint() {
                    Some(c) if c.contains("username") => "Username already registered",
                    _ => "Email already registered",
                };
                return AppError::conflict(anyhow!(message));
            }
            error!(error = %e, "Database error creating user");
            AppError::from(e)
        })?;

        info!(user.id = user.id, user.role = %user.role, "User registered");
        Ok(user)
    }

    /// Checks the credentials and issues an access token. `username` may also be an email;
    /// an email match wins over a username match for accounts created before
    /// usernames were barred from containing `@`.
    #[instrument(skip(db, form, jwt_config), fields(user.username = %form.username))]
    pub async fn login_user(
        db: &PgPool,
        form: LoginForm,
        jwt_config: &JwtConfig,
    ) -> Result<TokenResponse, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $1 \
             ORDER BY (email = $1) DESC LIMIT 1"
        ))
        .bind(&form.username)
        .fetch_optional(db)
        .await?;

        let Some(user) = user else {
            debug!("Login for unknown user");
            metrics::track_login("failure");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        if !verify_password(&form.password, &user.hashed_password)? {
            debug!(user.id = user.id, "Login with wrong password");
            metrics::track_login("failure");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        if !user.is_active {
            metrics::track_login("inactive");
            return Err(AppError::forbidden("User account is deactivated"));
        }

        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(db)
            .await?;

        let token = create_access_token(user.id, jwt_config)?;
        metrics::track_login("success");
        info!(user.id = user.id, "User logged in");

        Ok(TokenResponse::bearer(token))
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn find_user_by_id(db: &PgPool, user_id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }
}
