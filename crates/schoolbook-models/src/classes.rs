//! Class models.
//!
//! Enrollment is never stored: every query that loads a [`Class`] computes
//! `current_enrollment` with an explicit count over `students`. All
//! associated students are counted, active or not.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use schoolbook_core::serde::deserialize_optional_from_str;

pub const DEFAULT_MAX_STUDENTS: i32 = 40;

fn default_max_students() -> i32 {
    DEFAULT_MAX_STUDENTS
}

/// A class row joined with its enrollment count.
#[derive(Debug, Clone, FromRow)]
pub struct Class {
    pub id: i64,
    pub name: String,
    pub grade_level: i32,
    pub section: Option<String>,
    pub academic_year: String,
    pub max_students: i32,
    pub description: Option<String>,
    pub room_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub current_enrollment: i64,
}

impl Class {
    pub fn is_full(&self) -> bool {
        self.current_enrollment >= i64::from(self.max_students)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassResponse {
    pub id: i64,
    pub name: String,
    pub grade_level: i32,
    pub section: Option<String>,
    pub academic_year: String,
    pub max_students: i32,
    pub description: Option<String>,
    pub room_number: Option<String>,
    pub current_enrollment: i64,
    pub is_full: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Class> for ClassResponse {
    fn from(class: Class) -> Self {
        let is_full = class.is_full();
        Self {
            id: class.id,
            name: class.name,
            grade_level: class.grade_level,
            section: class.section,
            academic_year: class.academic_year,
            max_students: class.max_students,
            description: class.description,
            room_number: class.room_number,
            current_enrollment: class.current_enrollment,
            is_full,
            created_at: class.created_at,
            updated_at: class.updated_at,
        }
    }
}

/// Short form embedded in student responses.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ClassSummary {
    pub id: i64,
    pub name: String,
    pub grade_level: i32,
    pub section: Option<String>,
    pub academic_year: String,
}

/// Body for both create and update. Update replaces every field.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ClassDto {
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "Grade 1A")]
    pub name: String,
    #[validate(range(min = 1, max = 12))]
    pub grade_level: i32,
    #[validate(length(max = 10))]
    pub section: Option<String>,
    #[validate(length(min = 1, max = 20))]
    #[schema(example = "2024-2025")]
    pub academic_year: String,
    #[serde(default = "default_max_students")]
    #[validate(range(min = 1))]
    pub max_students: i32,
    pub description: Option<String>,
    #[validate(length(max = 20))]
    pub room_number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ClassFilterParams {
    pub academic_year: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    #[param(minimum = 1, maximum = 12)]
    pub grade_level: Option<i32>,
}
