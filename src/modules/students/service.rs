use anyhow::anyhow;
use chrono::{Datelike, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, error, info, instrument, warn};

use schoolbook_core::AppError;
use schoolbook_core::PageParams;
use schoolbook_core::file_storage::{FileStorage, StorageError};
use schoolbook_models::students::{identifier_prefix, next_identifier, photo_extension};
use schoolbook_models::{
    CreateStudentDto, Student, StudentFilterParams, StudentListResponse, StudentResponse,
    UpdateStudentDto,
};

use crate::metrics;
use crate::modules::classes::service::{ClassService, not_found as class_not_found};
use crate::state::UPLOADS_URL_PREFIX;

/// Student columns joined with the class summary columns.
const STUDENT_SELECT: &str = "SELECT s.*, c.name AS class_name, c.grade_level AS class_grade_level, \
     c.section AS class_section, c.academic_year AS class_academic_year \
     FROM students s LEFT JOIN classes c ON c.id = s.class_id";

/// Insert attempts before an identifier collision is reported as a failure.
const MAX_IDENTIFIER_ATTEMPTS: usize = 3;

const PHOTO_DIR: &str = "student_photos";

/// An uploaded photo as read from the multipart body.
#[derive(Debug)]
pub struct PhotoUpload {
    pub content_type: String,
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

pub struct StudentService;

impl StudentService {
    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "students"))]
    pub async fn create_student(db: &PgPool, dto: CreateStudentDto) -> Result<Student, AppError> {
        if let Some(class_id) = dto.class_id {
            Self::ensure_class_has_room(db, class_id).await?;
        }
        if let Some(email) = &dto.email {
            Self::ensure_email_free(db, email, None).await?;
        }

        let admission_date = dto.admission_date.unwrap_or_else(|| Utc::now().date_naive());
        let year = admission_date.year();

        for attempt in 1..=MAX_IDENTIFIER_ATTEMPTS {
            let student_id = Self::next_student_id(db, year).await?;
            debug!(student.student_id = %student_id, attempt, "Inserting student");

            match Self::insert_student(db, &student_id, admission_date, &dto).await {
                Ok(id) => {
                    metrics::track_student_created();
                    info!(student.id = id, student.student_id = %student_id, "Student created");
                    return Self::get_student(db, id).await;
                }
                Err(sqlx::Error::Database(db_err))
                    if db_err.is_unique_violation()
                        && db_err.constraint().is_some_and(|c| c.contains("student_id")) =>
                {
                    warn!(student.student_id = %student_id, attempt, "Student identifier already taken, retrying");
                }
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    return Err(AppError::conflict(anyhow!("Email already registered")));
                }
                Err(e) => {
                    error!(error = %e, "Database error creating student");
                    return Err(AppError::from(e));
                }
            }
        }

        error!(year, "Could not allocate a student identifier");
        Err(AppError::internal_error(format!(
            "Could not allocate a unique student identifier for {}",
            year
        )))
    }

    async fn next_student_id(db: &PgPool, year: i32) -> Result<String, AppError> {
        let existing = sqlx::query_scalar::<_, String>(
            "SELECT student_id FROM students WHERE student_id LIKE $1",
        )
        .bind(format!("{}%", identifier_prefix(year)))
        .fetch_all(db)
        .await?;

        Ok(next_identifier(year, existing.iter().map(String::as_str)))
    }

    async fn insert_student(
        db: &PgPool,
        student_id: &str,
        admission_date: chrono::NaiveDate,
        dto: &CreateStudentDto,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO students (
                student_id, first_name, last_name, middle_name, date_of_birth, gender, blood_group,
                email, phone, address, city, state, postal_code, country,
                guardian_name, guardian_relationship, guardian_phone, guardian_email, guardian_address,
                emergency_contact_name, emergency_contact_phone, emergency_contact_relationship,
                admission_date, class_id, roll_number,
                medical_conditions, allergies, previous_school, previous_class, notes
             ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30
             )
             RETURNING id",
        )
        .bind(student_id)
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.middle_name)
        .bind(dto.date_of_birth)
        .bind(dto.gender)
        .bind(dto.blood_group)
        .bind(&dto.email)
        .bind(&dto.phone)
        .bind(&dto.address)
        .bind(&dto.city)
        .bind(&dto.state)
        .bind(&dto.postal_code)
        .bind(&dto.country)
        .bind(&dto.guardian_name)
        .bind(&dto.guardian_relationship)
        .bind(&dto.guardian_phone)
        .bind(&dto.guardian_email)
        .bind(&dto.guardian_address)
        .bind(&dto.emergency_contact_name)
        .bind(&dto.emergency_contact_phone)
        .bind(&dto.emergency_contact_relationship)
        .bind(admission_date)
        .bind(dto.class_id)
        .bind(&dto.roll_number)
        .bind(&dto.medical_conditions)
        .bind(&dto.allergies)
        .bind(&dto.previous_school)
        .bind(&dto.previous_class)
        .bind(&dto.notes)
        .fetch_one(db)
        .await
    }

    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "students"))]
    pub async fn list_students(
        db: &PgPool,
        filters: StudentFilterParams,
    ) -> Result<StudentListResponse, AppError> {
        let page = PageParams::new(filters.page, filters.page_size)?;

        let mut count_query =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM students s WHERE 1=1");
        push_filters(&mut count_query, &filters);
        let total = count_query
            .build_query_scalar::<i64>()
            .fetch_one(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error counting students");
                AppError::from(e)
            })?;

        let mut data_query = QueryBuilder::<Postgres>::new(STUDENT_SELECT);
        data_query.push(" WHERE 1=1");
        push_filters(&mut data_query, &filters);
        data_query
            .push(" ORDER BY s.id LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let students = data_query
            .build_query_as::<Student>()
            .fetch_all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error listing students");
                AppError::from(e)
            })?;

        debug!(total, returned = students.len(), "Students fetched");

        let today = Utc::now().date_naive();
        Ok(StudentListResponse {
            total,
            page: page.page,
            page_size: page.page_size,
            students: students
                .into_iter()
                .map(|s| StudentResponse::from_student(s, today))
                .collect(),
        })
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "students"))]
    pub async fn get_student(db: &PgPool, id: i64) -> Result<Student, AppError> {
        sqlx::query_as::<_, Student>(&format!("{STUDENT_SELECT} WHERE s.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Applies the fields present in `dto`; everything else keeps its value.
    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "students"))]
    pub async fn update_student(
        db: &PgPool,
        id: i64,
        dto: UpdateStudentDto,
    ) -> Result<Student, AppError> {
        let mut student = Self::get_student(db, id).await?;

        if let Some(class_id) = dto.class_change(student.class_id) {
            Self::ensure_class_has_room(db, class_id).await?;
        }
        if let Some(email) = dto.email_change(student.email.as_deref()) {
            Self::ensure_email_free(db, email, Some(id)).await?;
        }

        dto.apply_to(&mut student);

        sqlx::query(
            "UPDATE students SET
                first_name = $1, last_name = $2, middle_name = $3, date_of_birth = $4,
                gender = $5, blood_group = $6, email = $7, phone = $8, address = $9,
                city = $10, state = $11, postal_code = $12, country = $13,
                class_id = $14, roll_number = $15,
                guardian_name = $16, guardian_relationship = $17, guardian_phone = $18,
                guardian_email = $19, guardian_address = $20,
                emergency_contact_name = $21, emergency_contact_phone = $22,
                emergency_contact_relationship = $23,
                medical_conditions = $24, allergies = $25, is_active = $26, notes = $27,
                updated_at = NOW()
             WHERE id = $28",
        )
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(&student.middle_name)
        .bind(student.date_of_birth)
        .bind(student.gender)
        .bind(student.blood_group)
        .bind(&student.email)
        .bind(&student.phone)
        .bind(&student.address)
        .bind(&student.city)
        .bind(&student.state)
        .bind(&student.postal_code)
        .bind(&student.country)
        .bind(student.class_id)
        .bind(&student.roll_number)
        .bind(&student.guardian_name)
        .bind(&student.guardian_relationship)
        .bind(&student.guardian_phone)
        .bind(&student.guardian_email)
        .bind(&student.guardian_address)
        .bind(&student.emergency_contact_name)
        .bind(&student.emergency_contact_phone)
        .bind(&student.emergency_contact_relationship)
        .bind(&student.medical_conditions)
        .bind(&student.allergies)
        .bind(student.is_active)
        .bind(&student.notes)
        .bind(id)
        .execute(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict(anyhow!("Email already registered"));
            }
            error!(error = %e, "Database error updating student");
            AppError::from(e)
        })?;

        info!(student.id = id, "Student updated");
        Self::get_student(db, id).await
    }

    /// Soft delete: clears the active flag and returns the student identifier.
    #[instrument(skip(db), fields(db.operation = "UPDATE", db.table = "students"))]
    pub async fn deactivate_student(db: &PgPool, id: i64) -> Result<String, AppError> {
        let student_id = sqlx::query_scalar::<_, String>(
            "UPDATE students SET is_active = FALSE, updated_at = NOW() WHERE id = $1 RETURNING student_id",
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| not_found(id))?;

        info!(student.id = id, student.student_id = %student_id, "Student deactivated");
        Ok(student_id)
    }

    /// Stores the photo under the student's identifier and records its reference path.
    #[instrument(skip(db, storage, upload), fields(file.size = upload.bytes.len(), file.content_type = %upload.content_type, db.operation = "UPDATE", db.table = "students"))]
    pub async fn upload_photo(
        db: &PgPool,
        storage: &dyn FileStorage,
        id: i64,
        upload: PhotoUpload,
    ) -> Result<String, AppError> {
        let student = Self::get_student(db, id).await?;

        storage
            .validate(&upload.content_type, upload.bytes.len())
            .map_err(storage_error)?;

        let ext = photo_extension(upload.filename.as_deref(), &upload.content_type);
        let key = format!("{}/{}.{}", PHOTO_DIR, student.student_id, ext);

        storage.save(&key, &upload.bytes).await.map_err(|e| {
            error!(error = %e, key = %key, "Failed to save photo");
            storage_error(e)
        })?;
        let photo_url = storage.get_url(&key).map_err(storage_error)?;

        // A previous photo with another extension would otherwise be orphaned.
        if let Some(old_url) = student.photo_url.as_deref()
            && old_url != photo_url
            && let Some(old_key) = old_url
                .strip_prefix(UPLOADS_URL_PREFIX)
                .map(|k| k.trim_start_matches('/'))
            && let Err(e) = storage.delete(old_key).await
        {
            warn!(error = %e, old_key, "Failed to remove previous photo");
        }

        sqlx::query("UPDATE students SET photo_url = $1, updated_at = NOW() WHERE id = $2")
            .bind(&photo_url)
            .bind(id)
            .execute(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error recording photo");
                AppError::from(e)
            })?;

        info!(student.id = id, photo_url = %photo_url, "Photo uploaded");
        Ok(photo_url)
    }

    async fn ensure_class_has_room(db: &PgPool, class_id: i64) -> Result<(), AppError> {
        let class = ClassService::find_class(db, class_id)
            .await?
            .ok_or_else(|| class_not_found(class_id))?;

        if class.is_full() {
            warn!(class.id = class_id, "Class is full");
            return Err(AppError::conflict(anyhow!(
                "Class {} is full (max: {})",
                class.name,
                class.max_students
            )));
        }
        Ok(())
    }

    async fn ensure_email_free(
        db: &PgPool,
        email: &str,
        exclude_id: Option<i64>,
    ) -> Result<(), AppError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM students WHERE email = $1 AND ($2::BIGINT IS NULL OR id <> $2)
             )",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(db)
        .await?;

        if taken {
            return Err(AppError::conflict(anyhow!("Email already registered")));
        }
        Ok(())
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &StudentFilterParams) {
    if let Some(search) = filters.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        query
            .push(" AND (s.first_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR s.last_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR s.student_id ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR s.email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(class_id) = filters.class_id {
        query.push(" AND s.class_id = ").push_bind(class_id);
    }
    if let Some(is_active) = filters.is_active {
        query.push(" AND s.is_active = ").push_bind(is_active);
    }
    if let Some(gender) = filters.gender {
        query.push(" AND s.gender = ").push_bind(gender);
    }
}

fn not_found(id: i64) -> AppError {
    AppError::not_found(anyhow!("Student with id {} not found", id))
}

fn storage_error(err: StorageError) -> AppError {
    match err {
        StorageError::InvalidMimeType { .. } => {
            AppError::unsupported_media_type(anyhow!("Only JPG and PNG images are allowed"))
        }
        StorageError::InvalidFileSize { .. } => AppError::bad_request(anyhow!("{}", err)),
        other => AppError::internal(other),
    }
}
