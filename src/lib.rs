//! # Schoolbook API
//!
//! A school management REST API built with Rust, Axum, and PostgreSQL:
//! users with JWT sessions, classes with a capacity, and student records
//! with generated identifiers, search, soft delete and photo upload.
//!
//! ## Architecture
//!
//! ```text
//! crates/
//! ├── schoolbook-core/     # AppError, pagination, passwords, file storage
//! ├── schoolbook-config/   # Settings loaded from the environment
//! ├── schoolbook-db/       # Pool and migrations
//! ├── schoolbook-auth/     # Access token issue/verify
//! ├── schoolbook-models/   # Rows, DTOs and pure domain rules
//! └── schoolbook-cli/      # Administrative CLI
//! src/
//! ├── middleware/          # AuthUser and role extractors
//! ├── modules/             # auth, classes, students, system
//! └── router.rs            # /api/v1 plus docs, uploads and metrics
//! ```
//!
//! Each feature module follows the same structure:
//!
//! - `controller.rs`: HTTP handlers
//! - `service.rs`: business logic and SQL
//! - `router.rs`: Axum router configuration
//!
//! ## Roles
//!
//! | Role | Access |
//! |------|--------|
//! | admin | Everything, including creating, replacing and deleting classes |
//! | teacher, parent, student | Any authenticated route without a role requirement |
//!
//! ## API Documentation
//!
//! - Swagger UI: `http://localhost:8000/swagger-ui`
//! - Scalar: `http://localhost:8000/scalar`

pub mod docs;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod validator;

pub use schoolbook_auth;
pub use schoolbook_config;
pub use schoolbook_core;
pub use schoolbook_db;
pub use schoolbook_models;
