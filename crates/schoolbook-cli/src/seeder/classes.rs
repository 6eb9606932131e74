//! Class seeding.

use sqlx::PgPool;
use std::time::Instant;

use schoolbook_models::classes::DEFAULT_MAX_STUDENTS;

use super::models::{ClassSeed, SEED_MARKER};
use crate::CliResult;

const SECTIONS: [&str; 4] = ["A", "B", "C", "D"];

/// `2025-2026` style label for the academic year starting in `start_year`.
pub fn academic_year(start_year: i32) -> String {
    format!("{}-{}", start_year, start_year + 1)
}

/// Classes walk grades 1..=12 and then sections, e.g. `Grade 1A`, `Grade 2A`, ..., `Grade 1B`.
pub fn generate_classes(count: usize, academic_year: &str) -> Vec<ClassSeed> {
    (0..count)
        .map(|i| {
            let grade_level = (i % 12) as i32 + 1;
            let section = SECTIONS[(i / 12) % SECTIONS.len()];
            let cycle = i / (12 * SECTIONS.len());
            let name = if cycle == 0 {
                format!("Grade {}{}", grade_level, section)
            } else {
                format!("Grade {}{}{}", grade_level, section, cycle + 1)
            };

            ClassSeed {
                name,
                grade_level,
                section: section.to_string(),
                academic_year: academic_year.to_string(),
                max_students: DEFAULT_MAX_STUDENTS,
            }
        })
        .collect()
}

/// Inserts the classes, skipping names already taken for the year. Returns
/// `(id, max_students)` for every inserted class.
pub async fn seed_classes(db: &PgPool, classes: &[ClassSeed]) -> CliResult<Vec<(i64, i32)>> {
    let start_time = Instant::now();
    println!("🏫 Seeding {} classes...", classes.len());

    if classes.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = String::from(
        "INSERT INTO classes (name, grade_level, section, academic_year, max_students, description) VALUES ",
    );
    for i in 0..classes.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let p = i * 6;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${}, ${}, ${})",
            p + 1,
            p + 2,
            p + 3,
            p + 4,
            p + 5,
            p + 6
        ));
    }
    query.push_str(" ON CONFLICT (name, academic_year) DO NOTHING RETURNING id, max_students");

    let mut q = sqlx::query_as::<_, (i64, i32)>(&query);
    for class in classes {
        q = q
            .bind(&class.name)
            .bind(class.grade_level)
            .bind(&class.section)
            .bind(&class.academic_year)
            .bind(class.max_students)
            .bind(SEED_MARKER);
    }
    let inserted = q.fetch_all(db).await?;

    println!(
        "   ✓ Inserted {} classes in {:?}",
        inserted.len(),
        start_time.elapsed()
    );
    Ok(inserted)
}

pub async fn clear_classes(db: &PgPool) -> CliResult<u64> {
    let result = sqlx::query("DELETE FROM classes WHERE description = $1")
        .bind(SEED_MARKER)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
