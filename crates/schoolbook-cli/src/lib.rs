//! # Schoolbook CLI
//!
//! Administrative commands and demo-data seeding used by the `schoolbook-cli`
//! binary.
//!
//! ```ignore
//! use schoolbook_cli::seeder::{seed_all, SeedConfig};
//!
//! seed_all(&pool, SeedConfig { classes: 6, students: 120 }).await?;
//! ```

pub mod admin;
pub mod seeder;

pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;
