pub mod auth;
pub mod classes;
pub mod students;
pub mod system;
