//! Extractors for authentication and role checks.
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. [`auth::AuthUser`] verifies the token and loads the active user
//! 3. [`role::RequireAdmin`] additionally requires the `admin` role
//! 4. Handler executes if all checks pass

pub mod auth;
pub mod role;
