//! Student domain models and DTOs.
//!
//! Besides the row and DTO types this module holds the pure rules around
//! students: identifier sequencing (`STU<year><NNN>`), the derived
//! `full_name` and `age` fields, and how a partial update is applied.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use schoolbook_core::serde::{
    deserialize_optional_bool, deserialize_optional_from_str, deserialize_optional_i64,
    double_option,
};

use crate::classes::ClassSummary;

pub const STUDENT_ID_PREFIX: &str = "STU";
pub const DEFAULT_COUNTRY: &str = "Ghana";

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "gender", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(format!(
                "unknown gender '{}', expected male, female or other",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "blood_group")]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    #[sqlx(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    #[sqlx(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    #[sqlx(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    #[sqlx(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    #[sqlx(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    #[sqlx(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    #[sqlx(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    #[sqlx(rename = "O-")]
    ONegative,
}

/// A student row, optionally joined with its class.
///
/// The `class_*` columns come from a `LEFT JOIN classes`; statements that
/// only touch `students` (e.g. `RETURNING *`) leave them defaulted.
#[derive(Debug, Clone, FromRow)]
pub struct Student {
    pub id: i64,
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub blood_group: Option<BloodGroup>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: String,
    pub guardian_name: String,
    pub guardian_relationship: String,
    pub guardian_phone: String,
    pub guardian_email: Option<String>,
    pub guardian_address: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub emergency_contact_relationship: Option<String>,
    pub admission_date: NaiveDate,
    pub class_id: Option<i64>,
    pub roll_number: Option<String>,
    pub is_active: bool,
    pub photo_url: Option<String>,
    pub medical_conditions: Option<String>,
    pub allergies: Option<String>,
    pub previous_school: Option<String>,
    pub previous_class: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(default)]
    pub class_name: Option<String>,
    #[sqlx(default)]
    pub class_grade_level: Option<i32>,
    #[sqlx(default)]
    pub class_section: Option<String>,
    #[sqlx(default)]
    pub class_academic_year: Option<String>,
}

impl Student {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, self.middle_name.as_deref(), &self.last_name)
    }

    pub fn age_on(&self, today: NaiveDate) -> i32 {
        age_on(self.date_of_birth, today)
    }

    fn class_summary(&self) -> Option<ClassSummary> {
        match (self.class_id, &self.class_name, &self.class_academic_year) {
            (Some(id), Some(name), Some(academic_year)) => Some(ClassSummary {
                id,
                name: name.clone(),
                grade_level: self.class_grade_level.unwrap_or_default(),
                section: self.class_section.clone(),
                academic_year: academic_year.clone(),
            }),
            _ => None,
        }
    }
}

/// First, middle and last name joined by single spaces; a blank middle name is skipped.
pub fn full_name(first: &str, middle: Option<&str>, last: &str) -> String {
    match middle.map(str::trim).filter(|m| !m.is_empty()) {
        Some(middle) => format!("{} {} {}", first, middle, last),
        None => format!("{} {}", first, last),
    }
}

/// Whole years between `date_of_birth` and `today`.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

/// `STU<year>`, the prefix shared by every identifier issued for that admission year.
pub fn identifier_prefix(admission_year: i32) -> String {
    format!("{}{}", STUDENT_ID_PREFIX, admission_year)
}

/// `STU<year><seq>` with the sequence zero padded to at least three digits.
pub fn format_identifier(admission_year: i32, sequence: i64) -> String {
    format!("{}{:03}", identifier_prefix(admission_year), sequence)
}

/// Sequence number of an identifier issued for `admission_year`, if it is one.
pub fn parse_sequence(admission_year: i32, identifier: &str) -> Option<i64> {
    let suffix = identifier.strip_prefix(&identifier_prefix(admission_year))?;
    if suffix.len() < 3 || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

/// The identifier following the highest one already issued for the year.
pub fn next_identifier<'a, I>(admission_year: i32, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let last = existing
        .into_iter()
        .filter_map(|id| parse_sequence(admission_year, id))
        .max()
        .unwrap_or(0);
    format_identifier(admission_year, last + 1)
}

/// File extension for a stored photo: taken from the upload's filename when
/// it is a known image extension, otherwise from the content type.
pub fn photo_extension(filename: Option<&str>, content_type: &str) -> &'static str {
    let from_name = filename
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match from_name.as_deref() {
        Some("png") => "png",
        Some("jpeg") => "jpeg",
        Some("jpg") => "jpg",
        _ if content_type.eq_ignore_ascii_case("image/png") => "png",
        _ => "jpg",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentResponse {
    pub id: i64,
    #[schema(example = "STU2024001")]
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub age: i32,
    pub gender: Gender,
    pub blood_group: Option<BloodGroup>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: String,
    pub guardian_name: String,
    pub guardian_relationship: String,
    pub guardian_phone: String,
    pub guardian_email: Option<String>,
    pub guardian_address: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub emergency_contact_relationship: Option<String>,
    pub admission_date: NaiveDate,
    pub class_id: Option<i64>,
    #[serde(rename = "class")]
    pub student_class: Option<ClassSummary>,
    pub roll_number: Option<String>,
    pub is_active: bool,
    pub photo_url: Option<String>,
    pub medical_conditions: Option<String>,
    pub allergies: Option<String>,
    pub previous_school: Option<String>,
    pub previous_class: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentResponse {
    pub fn from_student(student: Student, today: NaiveDate) -> Self {
        let full_name = student.full_name();
        let age = student.age_on(today);
        let student_class = student.class_summary();
        Self {
            id: student.id,
            student_id: student.student_id,
            first_name: student.first_name,
            last_name: student.last_name,
            middle_name: student.middle_name,
            full_name,
            date_of_birth: student.date_of_birth,
            age,
            gender: student.gender,
            blood_group: student.blood_group,
            email: student.email,
            phone: student.phone,
            address: student.address,
            city: student.city,
            state: student.state,
            postal_code: student.postal_code,
            country: student.country,
            guardian_name: student.guardian_name,
            guardian_relationship: student.guardian_relationship,
            guardian_phone: student.guardian_phone,
            guardian_email: student.guardian_email,
            guardian_address: student.guardian_address,
            emergency_contact_name: student.emergency_contact_name,
            emergency_contact_phone: student.emergency_contact_phone,
            emergency_contact_relationship: student.emergency_contact_relationship,
            admission_date: student.admission_date,
            class_id: student.class_id,
            student_class,
            roll_number: student.roll_number,
            is_active: student.is_active,
            photo_url: student.photo_url,
            medical_conditions: student.medical_conditions,
            allergies: student.allergies,
            previous_school: student.previous_school,
            previous_class: student.previous_class,
            notes: student.notes,
            created_at: student.created_at,
            updated_at: student.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateStudentDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(length(max = 100))]
    pub middle_name: Option<String>,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub blood_group: Option<BloodGroup>,

    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub state: Option<String>,
    #[validate(length(max = 20))]
    pub postal_code: Option<String>,
    #[serde(default = "default_country")]
    #[validate(length(min = 1, max = 100))]
    pub country: String,

    #[validate(length(min = 1, max = 200))]
    pub guardian_name: String,
    #[validate(length(min = 1, max = 50))]
    pub guardian_relationship: String,
    #[validate(length(min = 1, max = 20))]
    pub guardian_phone: String,
    #[validate(email)]
    pub guardian_email: Option<String>,
    pub guardian_address: Option<String>,

    #[validate(length(max = 200))]
    pub emergency_contact_name: Option<String>,
    #[validate(length(max = 20))]
    pub emergency_contact_phone: Option<String>,
    #[validate(length(max = 50))]
    pub emergency_contact_relationship: Option<String>,

    pub medical_conditions: Option<String>,
    pub allergies: Option<String>,
    #[validate(length(max = 200))]
    pub previous_school: Option<String>,
    #[validate(length(max = 50))]
    pub previous_class: Option<String>,
    pub notes: Option<String>,

    pub class_id: Option<i64>,
    #[validate(length(max = 20))]
    pub roll_number: Option<String>,
    /// Defaults to today; its year picks the identifier sequence.
    #[validate(custom(function = "validate_admission_date", message = "Admission year must have four digits"))]
    pub admission_date: Option<NaiveDate>,
}

/// Identifier prefixes only stay distinct across years of the same width.
fn validate_admission_date(date: &NaiveDate) -> Result<(), validator::ValidationError> {
    if !(1000..=9999).contains(&date.year()) {
        return Err(validator::ValidationError::new("admission_year_out_of_range"));
    }
    Ok(())
}

/// Partial update. A field missing from the body is left untouched; an
/// explicit `null` clears a nullable field.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateStudentDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 100))]
    pub middle_name: Option<Option<String>>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<BloodGroup>)]
    pub blood_group: Option<Option<BloodGroup>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    #[validate(email)]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 20))]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 100))]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 100))]
    pub state: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 20))]
    pub postal_code: Option<Option<String>>,
    #[validate(length(min = 1, max = 100))]
    pub country: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub class_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 20))]
    pub roll_number: Option<Option<String>>,

    #[validate(length(min = 1, max = 200))]
    pub guardian_name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub guardian_relationship: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub guardian_phone: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    #[validate(email)]
    pub guardian_email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub guardian_address: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub emergency_contact_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub emergency_contact_phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub emergency_contact_relationship: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub medical_conditions: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub allergies: Option<Option<String>>,

    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

fn patch<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

impl UpdateStudentDto {
    /// The class the student moves into, when the patch changes it to a
    /// different class than `current`.
    pub fn class_change(&self, current: Option<i64>) -> Option<i64> {
        match self.class_id {
            Some(Some(new_class)) if Some(new_class) != current => Some(new_class),
            _ => None,
        }
    }

    /// The new email, when the patch sets one different from `current`.
    pub fn email_change(&self, current: Option<&str>) -> Option<&str> {
        match &self.email {
            Some(Some(email)) if Some(email.as_str()) != current => Some(email.as_str()),
            _ => None,
        }
    }

    /// Writes every supplied field onto `student`.
    pub fn apply_to(self, student: &mut Student) {
        patch(&mut student.first_name, self.first_name);
        patch(&mut student.last_name, self.last_name);
        patch(&mut student.middle_name, self.middle_name);
        patch(&mut student.date_of_birth, self.date_of_birth);
        patch(&mut student.gender, self.gender);
        patch(&mut student.blood_group, self.blood_group);
        patch(&mut student.email, self.email);
        patch(&mut student.phone, self.phone);
        patch(&mut student.address, self.address);
        patch(&mut student.city, self.city);
        patch(&mut student.state, self.state);
        patch(&mut student.postal_code, self.postal_code);
        patch(&mut student.country, self.country);
        patch(&mut student.class_id, self.class_id);
        patch(&mut student.roll_number, self.roll_number);
        patch(&mut student.guardian_name, self.guardian_name);
        patch(&mut student.guardian_relationship, self.guardian_relationship);
        patch(&mut student.guardian_phone, self.guardian_phone);
        patch(&mut student.guardian_email, self.guardian_email);
        patch(&mut student.guardian_address, self.guardian_address);
        patch(&mut student.emergency_contact_name, self.emergency_contact_name);
        patch(&mut student.emergency_contact_phone, self.emergency_contact_phone);
        patch(
            &mut student.emergency_contact_relationship,
            self.emergency_contact_relationship,
        );
        patch(&mut student.medical_conditions, self.medical_conditions);
        patch(&mut student.allergies, self.allergies);
        patch(&mut student.is_active, self.is_active);
        patch(&mut student.notes, self.notes);
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct StudentFilterParams {
    /// Page number, starting at 1 (default 1)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    /// Page size between 1 and 100 (default 20)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page_size: Option<i64>,
    /// Case-insensitive match on first name, last name, student id or email
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub class_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    #[param(value_type = Option<Gender>)]
    pub gender: Option<Gender>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentListResponse {
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub students: Vec<StudentResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PhotoUploadResponse {
    pub message: String,
    #[schema(example = "/uploads/student_photos/STU2024001.jpg")]
    pub photo_url: String,
}
