use chrono::NaiveDate;
use schoolbook_models::Gender;

/// Seeded rows carry this marker (class `description`, student `notes`) so
/// `clear` removes only generated data.
pub const SEED_MARKER: &str = "[seed]";

pub struct ClassSeed {
    pub name: String,
    pub grade_level: i32,
    pub section: String,
    pub academic_year: String,
    pub max_students: i32,
}

pub struct StudentSeed {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub guardian_name: String,
    pub guardian_relationship: String,
    pub guardian_phone: String,
    pub admission_date: NaiveDate,
    pub class_id: Option<i64>,
}

#[derive(Clone, Copy, Debug)]
pub struct SeedConfig {
    pub classes: usize,
    pub students: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            classes: 6,
            students: 120,
        }
    }
}
