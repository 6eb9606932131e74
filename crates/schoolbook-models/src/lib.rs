//! # Schoolbook Models
//!
//! Plain data records, request/response DTOs and the pure domain rules that
//! go with them.
//!
//! - [`users`]: users, the closed [`UserRole`] set and role authorization
//! - [`auth`]: login form and token response
//! - [`classes`]: classes with derived enrollment
//! - [`students`]: students, identifier sequencing, derived name and age

pub mod auth;
pub mod classes;
pub mod students;
pub mod users;

pub use auth::{LoginForm, MessageResponse, TokenResponse};
pub use classes::{Class, ClassDto, ClassFilterParams, ClassResponse, ClassSummary};
pub use students::{
    BloodGroup, CreateStudentDto, Gender, PhotoUploadResponse, Student, StudentFilterParams,
    StudentListResponse, StudentResponse, UpdateStudentDto,
};
pub use users::{CreateUserDto, User, UserResponse, UserRole, is_authorized, validate_username};
