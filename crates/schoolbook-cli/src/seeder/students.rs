//! Student seeding.

use chrono::{Datelike, NaiveDate};
use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;

use schoolbook_models::Gender;
use schoolbook_models::students::{format_identifier, identifier_prefix, parse_sequence};

use super::models::{SEED_MARKER, StudentSeed};
use crate::CliResult;

const RELATIONSHIPS: [&str; 3] = ["Mother", "Father", "Guardian"];

/// Assigns `count` students to classes round robin, never past a class's
/// capacity. Students beyond the total capacity get no class.
pub fn plan_class_assignments(count: usize, classes: &[(i64, i32)]) -> Vec<Option<i64>> {
    let mut remaining: Vec<(i64, usize)> = classes
        .iter()
        .map(|&(id, max)| (id, max.max(0) as usize))
        .collect();
    let mut next = 0;

    (0..count)
        .map(|_| {
            for _ in 0..remaining.len() {
                let slot = next % remaining.len();
                next += 1;
                if remaining[slot].1 > 0 {
                    remaining[slot].1 -= 1;
                    return Some(remaining[slot].0);
                }
            }
            None
        })
        .collect()
}

/// Builds students in parallel; identifiers continue from `first_sequence`.
pub fn generate_students(
    assignments: &[Option<i64>],
    admission_date: NaiveDate,
    first_sequence: i64,
) -> Vec<StudentSeed> {
    let year = admission_date.year();

    assignments
        .par_iter()
        .enumerate()
        .map(|(idx, &class_id)| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            let guardian_first: String = FirstName().fake();
            let age: i32 = (5..18).fake();
            let month: u32 = (1..13).fake();
            let day: u32 = (1..29).fake();
            let gender = match (0..3).fake::<u8>() {
                0 => Gender::Male,
                1 => Gender::Female,
                _ => Gender::Other,
            };

            StudentSeed {
                student_id: format_identifier(year, first_sequence + idx as i64),
                date_of_birth: NaiveDate::from_ymd_opt(year - age, month, day)
                    .unwrap_or(admission_date),
                guardian_name: format!("{} {}", guardian_first, last_name),
                guardian_relationship: RELATIONSHIPS[idx % RELATIONSHIPS.len()].to_string(),
                guardian_phone: PhoneNumber().fake::<String>().chars().take(20).collect(),
                first_name,
                last_name,
                gender,
                admission_date,
                class_id,
            }
        })
        .collect()
}

/// The first free identifier sequence for the admission year.
pub async fn next_sequence(db: &PgPool, year: i32) -> CliResult<i64> {
    let existing = sqlx::query_scalar::<_, String>(
        "SELECT student_id FROM students WHERE student_id LIKE $1",
    )
    .bind(format!("{}%", identifier_prefix(year)))
    .fetch_all(db)
    .await?;

    let last = existing
        .iter()
        .filter_map(|id| parse_sequence(year, id))
        .max()
        .unwrap_or(0);
    Ok(last + 1)
}

pub async fn seed_students(db: &PgPool, students: &[StudentSeed]) -> CliResult<usize> {
    let start_time = Instant::now();
    println!("🎓 Seeding {} students...", students.len());

    let mut tx = db.begin().await?;

    // 11 params per student
    const BATCH_SIZE: usize = 500;

    let mut inserted = 0;
    for chunk in students.chunks(BATCH_SIZE) {
        inserted += insert_students_chunk(&mut tx, chunk).await?;
    }

    tx.commit().await?;

    println!(
        "   ✓ Inserted {} students in {:?}",
        inserted,
        start_time.elapsed()
    );
    Ok(inserted)
}

async fn insert_students_chunk(
    tx: &mut Transaction<'_, Postgres>,
    students: &[StudentSeed],
) -> CliResult<usize> {
    if students.is_empty() {
        return Ok(0);
    }

    let mut query = String::from(
        "INSERT INTO students (student_id, first_name, last_name, date_of_birth, gender, \
         guardian_name, guardian_relationship, guardian_phone, admission_date, class_id, notes) VALUES ",
    );
    for i in 0..students.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let p = i * 11;
        let placeholders: Vec<String> = (1..=11).map(|n| format!("${}", p + n)).collect();
        query.push('(');
        query.push_str(&placeholders.join(", "));
        query.push(')');
    }

    let mut q = sqlx::query(&query);
    for student in students {
        q = q
            .bind(&student.student_id)
            .bind(&student.first_name)
            .bind(&student.last_name)
            .bind(student.date_of_birth)
            .bind(student.gender)
            .bind(&student.guardian_name)
            .bind(&student.guardian_relationship)
            .bind(&student.guardian_phone)
            .bind(student.admission_date)
            .bind(student.class_id)
            .bind(SEED_MARKER);
    }

    let result = q.execute(&mut **tx).await?;
    Ok(result.rows_affected() as usize)
}

pub async fn clear_students(db: &PgPool) -> CliResult<u64> {
    let result = sqlx::query("DELETE FROM students WHERE notes = $1")
        .bind(SEED_MARKER)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignments_respect_capacity() {
        let plan = plan_class_assignments(5, &[(1, 2), (2, 1)]);
        assert_eq!(plan.iter().filter(|c| **c == Some(1)).count(), 2);
        assert_eq!(plan.iter().filter(|c| **c == Some(2)).count(), 1);
        assert_eq!(plan.iter().filter(|c| c.is_none()).count(), 2);
    }

    #[test]
    fn test_assignments_round_robin() {
        let plan = plan_class_assignments(4, &[(1, 40), (2, 40)]);
        assert_eq!(plan, vec![Some(1), Some(2), Some(1), Some(2)]);
    }

    #[test]
    fn test_no_classes_means_unassigned() {
        assert_eq!(plan_class_assignments(2, &[]), vec![None, None]);
    }

    #[test]
    fn test_generated_identifiers_are_sequential() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        let students = generate_students(&[None, None, None], date, 7);
        let ids: Vec<_> = students.iter().map(|s| s.student_id.as_str()).collect();
        assert_eq!(ids, vec!["STU2025007", "STU2025008", "STU2025009"]);
    }

    #[test]
    fn test_generated_students_are_school_age() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        for student in generate_students(&[Some(1); 20], date, 1) {
            let age = date.year() - student.date_of_birth.year();
            assert!((5..=18).contains(&age));
            assert!(!student.guardian_phone.is_empty());
        }
    }
}
