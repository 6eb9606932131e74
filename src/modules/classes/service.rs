use anyhow::anyhow;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, error, info, instrument, warn};

use schoolbook_core::AppError;
use schoolbook_models::{Class, ClassDto, ClassFilterParams};

use crate::metrics;

/// Class columns plus the live enrollment count.
const CLASS_SELECT: &str = "SELECT c.id, c.name, c.grade_level, c.section, c.academic_year, \
     c.max_students, c.description, c.room_number, c.created_at, c.updated_at, \
     (SELECT COUNT(*) FROM students s WHERE s.class_id = c.id) AS current_enrollment \
     FROM classes c";

pub struct ClassService;

impl ClassService {
    #[instrument(skip(db, dto), fields(class.name = %dto.name, class.year = %dto.academic_year, db.operation = "INSERT", db.table = "classes"))]
    pub async fn create_class(db: &PgPool, dto: ClassDto) -> Result<Class, AppError> {
        if Self::name_taken(db, &dto.name, &dto.academic_year, None).await? {
            warn!("Attempted to create duplicate class");
            return Err(duplicate(&dto.name, &dto.academic_year));
        }

        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO classes (name, grade_level, section, academic_year, max_students, description, room_number)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id",
        )
        .bind(&dto.name)
        .bind(dto.grade_level)
        .bind(&dto.section)
        .bind(&dto.academic_year)
        .bind(dto.max_students)
        .bind(&dto.description)
        .bind(&dto.room_number)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return duplicate(&dto.name, &dto.academic_year);
            }
            error!(error = %e, "Database error creating class");
            AppError::from(e)
        })?;

        metrics::track_class_created();
        info!(class.id = id, "Class created");

        Self::get_class(db, id).await
    }

    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "classes"))]
    pub async fn list_classes(db: &PgPool, filters: ClassFilterParams) -> Result<Vec<Class>, AppError> {
        let mut query = QueryBuilder::<Postgres>::new(CLASS_SELECT);
        query.push(" WHERE 1=1");

        if let Some(year) = &filters.academic_year {
            query.push(" AND c.academic_year = ").push_bind(year.clone());
        }
        if let Some(grade) = filters.grade_level {
            query.push(" AND c.grade_level = ").push_bind(grade);
        }
        query.push(" ORDER BY c.grade_level, c.name");

        let classes = query.build_query_as::<Class>().fetch_all(db).await.map_err(|e| {
            error!(error = %e, "Database error listing classes");
            AppError::from(e)
        })?;

        debug!(returned = classes.len(), "Classes fetched");
        Ok(classes)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "classes"))]
    pub async fn get_class(db: &PgPool, class_id: i64) -> Result<Class, AppError> {
        Self::find_class(db, class_id)
            .await?
            .ok_or_else(|| not_found(class_id))
    }

    pub async fn find_class(db: &PgPool, class_id: i64) -> Result<Option<Class>, AppError> {
        let class = sqlx::query_as::<_, Class>(&format!("{CLASS_SELECT} WHERE c.id = $1"))
            .bind(class_id)
            .fetch_optional(db)
            .await?;
        Ok(class)
    }

    /// Replaces every field of the class.
    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "classes"))]
    pub async fn update_class(db: &PgPool, class_id: i64, dto: ClassDto) -> Result<Class, AppError> {
        let existing = Self::get_class(db, class_id).await?;

        let renamed = existing.name != dto.name || existing.academic_year != dto.academic_year;
        if renamed && Self::name_taken(db, &dto.name, &dto.academic_year, Some(class_id)).await? {
            warn!("Attempted to rename class onto an existing one");
            return Err(duplicate(&dto.name, &dto.academic_year));
        }

        sqlx::query(
            "UPDATE classes
             SET name = $1, grade_level = $2, section = $3, academic_year = $4,
                 max_students = $5, description = $6, room_number = $7, updated_at = NOW()
             WHERE id = $8",
        )
        .bind(&dto.name)
        .bind(dto.grade_level)
        .bind(&dto.section)
        .bind(&dto.academic_year)
        .bind(dto.max_students)
        .bind(&dto.description)
        .bind(&dto.room_number)
        .bind(class_id)
        .execute(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return duplicate(&dto.name, &dto.academic_year);
            }
            error!(error = %e, "Database error updating class");
            AppError::from(e)
        })?;

        info!("Class updated");
        Self::get_class(db, class_id).await
    }

    /// Deletes an empty class and returns its name.
    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "classes"))]
    pub async fn delete_class(db: &PgPool, class_id: i64) -> Result<String, AppError> {
        let class = Self::get_class(db, class_id).await?;

        if class.current_enrollment > 0 {
            warn!(enrollment = class.current_enrollment, "Attempted to delete non-empty class");
            return Err(AppError::conflict(anyhow!(
                "Cannot delete class with {} enrolled students",
                class.current_enrollment
            )));
        }

        sqlx::query("DELETE FROM classes WHERE id = $1")
            .bind(class_id)
            .execute(db)
            .await?;

        info!("Class deleted");
        Ok(class.name)
    }

    async fn name_taken(
        db: &PgPool,
        name: &str,
        academic_year: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, AppError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM classes
                WHERE name = $1 AND academic_year = $2 AND ($3::BIGINT IS NULL OR id <> $3)
             )",
        )
        .bind(name)
        .bind(academic_year)
        .bind(exclude_id)
        .fetch_one(db)
        .await?;
        Ok(taken)
    }
}

pub fn not_found(class_id: i64) -> AppError {
    AppError::not_found(anyhow!("Class with id {} not found", class_id))
}

fn duplicate(name: &str, academic_year: &str) -> AppError {
    AppError::conflict(anyhow!("Class '{}' already exists for {}", name, academic_year))
}
