//! Demo-data seeding.
//!
//! - [`classes`] - class generation and insertion
//! - [`students`] - student generation, class assignment and insertion
//! - [`models`] - seed records and configuration
//!
//! # Performance
//!
//! - Parallel data generation using Rayon
//! - Batch inserts with multi-value INSERT statements
//! - No credentials are generated, so nothing is hashed

pub mod classes;
pub mod models;
pub mod students;

pub use models::{SEED_MARKER, SeedConfig};

use chrono::{Datelike, Utc};
use sqlx::PgPool;
use std::time::Instant;

use crate::CliResult;

/// Seeds classes for the current academic year and students spread across them.
pub async fn seed_all(db: &PgPool, config: SeedConfig) -> CliResult<()> {
    let start_time = Instant::now();

    println!("🌱 Starting database seeding...");
    println!("   - Classes: {}", config.classes);
    println!("   - Students: {}", config.students);

    let today = Utc::now().date_naive();
    let year = classes::academic_year(today.year());

    let class_seeds = classes::generate_classes(config.classes, &year);
    let class_ids = classes::seed_classes(db, &class_seeds).await?;

    let assignments = students::plan_class_assignments(config.students, &class_ids);
    let first_sequence = students::next_sequence(db, today.year()).await?;
    let student_seeds = students::generate_students(&assignments, today, first_sequence);
    let inserted = students::seed_students(db, &student_seeds).await?;

    println!(
        "\n✅ Seeding complete! Created {} classes and {} students in {:?}",
        class_ids.len(),
        inserted,
        start_time.elapsed()
    );
    Ok(())
}

/// Removes seeded students, then seeded classes.
pub async fn clear_all(db: &PgPool) -> CliResult<()> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded data...");

    let students = students::clear_students(db).await?;
    let classes = classes::clear_classes(db).await?;

    println!(
        "✅ Removed {} students and {} classes in {:?}",
        students,
        classes,
        start_time.elapsed()
    );
    Ok(())
}
