//! # Schoolbook Auth
//!
//! Stateless session tokens. A token is a signed JWT carrying the user id as
//! its subject and an absolute expiry; nothing is stored server side, so
//! logging out is the client discarding its token.
//!
//! # Example
//!
//! ```ignore
//! use schoolbook_auth::{create_access_token, verify_token};
//!
//! let token = create_access_token(user.id, &settings.jwt)?;
//! let claims = verify_token(&token, &settings.jwt)?;
//! assert_eq!(claims.user_id(), Some(user.id));
//! ```

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
