//! # Schoolbook Core
//!
//! Core types, errors, and utilities shared by every schoolbook crate.
//!
//! - [`errors`]: the `AppError` taxonomy and its HTTP response mapping
//! - [`pagination`]: page/page-size arithmetic for list endpoints
//! - [`password`]: bcrypt password hashing and verification
//! - [`file_storage`]: storage backend for uploaded student photos
//! - [`serde`]: query-string deserialization helpers
//!
//! # Example
//!
//! ```ignore
//! use schoolbook_core::errors::AppError;
//! use schoolbook_core::password::{hash_password, verify_password};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Student with id 7 not found"));
//! let hash = hash_password("secure_password")?;
//! ```

pub mod errors;
pub mod file_storage;
pub mod pagination;
pub mod password;
pub mod serde;

pub use errors::AppError;
pub use pagination::PageParams;
pub use password::{hash_password, verify_password};
