//! PostgreSQL-backed course repository.

use async_trait::async_trait;
use opencourse_application::{CourseRepository, CourseUpsert, ResolvedCourse, UpsertOutcome};
use opencourse_core::{AppError, AppResult};
use opencourse_domain::{Course, CourseId, next_course_id};
use sqlx::PgPool;
use tracing::warn;

/// Attempts at allocating a fresh sequential identifier before giving up.
const MAX_ID_ALLOCATION_ATTEMPTS: usize = 5;

/// PostgreSQL implementation of the course repository port.
#[derive(Clone)]
pub struct PostgresCourseRepository {
    pool: PgPool,
}

impl PostgresCourseRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a brand-new record under a freshly computed identifier.
    ///
    /// Identifier assignment is `max numeric id + 1`, recomputed and retried
    /// on a primary-key violation so concurrent creations cannot persist
    /// colliding identifiers.
    async fn insert_with_allocated_id(&self, course: &ResolvedCourse) -> AppResult<CourseUpsert> {
        for attempt in 1..=MAX_ID_ALLOCATION_ATTEMPTS {
            let existing: Vec<String> = sqlx::query_scalar("SELECT id FROM courses")
                .fetch_all(&self.pool)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to list course identifiers: {error}"))
                })?;

            let id = next_course_id(existing.iter().map(String::as_str));

            let inserted = sqlx::query(
                r#"
                INSERT INTO courses (id, instructor, title, description, created_at, updated_at, students)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(id.as_str())
            .bind(&course.instructor)
            .bind(&course.title)
            .bind(&course.description)
            .bind(&course.created_at)
            .bind(&course.updated_at)
            .bind(i64::from(course.students))
            .execute(&self.pool)
            .await;

            match inserted {
                Ok(_) => {
                    return Ok(CourseUpsert {
                        course_id: id,
                        outcome: UpsertOutcome::Created,
                    });
                }
                Err(error) if is_unique_violation(&error) => {
                    // A concurrent creation won the identifier; recompute.
                    warn!(attempt, course_id = %id, "course identifier collision, retrying");
                }
                Err(error) => {
                    return Err(AppError::Internal(format!(
                        "failed to insert course: {error}"
                    )));
                }
            }
        }

        Err(AppError::Conflict(
            "could not allocate a unique course identifier".to_owned(),
        ))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CourseRow {
    id: String,
    instructor: String,
    title: String,
    description: String,
    created_at: String,
    updated_at: String,
    students: i64,
}

impl TryFrom<CourseRow> for Course {
    type Error = AppError;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        let students = u32::try_from(row.students).map_err(|_| {
            AppError::Internal(format!(
                "course '{}' has an out-of-range student count: {}",
                row.id, row.students
            ))
        })?;

        Ok(Self {
            id: CourseId::new(row.id)?,
            instructor: row.instructor,
            title: row.title,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
            students,
        })
    }
}

const COURSE_COLUMNS: &str = "id, instructor, title, description, created_at, updated_at, students";

#[async_trait]
impl CourseRepository for PostgresCourseRepository {
    async fn list_all(&self) -> AppResult<Vec<Course>> {
        let rows = sqlx::query_as::<_, CourseRow>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list courses: {error}")))?;

        rows.into_iter().map(Course::try_from).collect()
    }

    async fn list_by_instructor(&self, instructor: &str) -> AppResult<Vec<Course>> {
        let rows = sqlx::query_as::<_, CourseRow>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE instructor = $1"
        ))
        .bind(instructor)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list courses by instructor: {error}"))
        })?;

        rows.into_iter().map(Course::try_from).collect()
    }

    async fn upsert(&self, course: ResolvedCourse) -> AppResult<CourseUpsert> {
        let Some(id) = course.id.clone() else {
            return self.insert_with_allocated_id(&course).await;
        };

        // `xmax = 0` distinguishes a fresh insert from a conflict-update.
        let inserted: bool = sqlx::query_scalar(
            r#"
            INSERT INTO courses (id, instructor, title, description, created_at, updated_at, students)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                instructor = EXCLUDED.instructor,
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                created_at = EXCLUDED.created_at,
                updated_at = EXCLUDED.updated_at,
                students = EXCLUDED.students
            RETURNING (xmax = 0)
            "#,
        )
        .bind(id.as_str())
        .bind(&course.instructor)
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.created_at)
        .bind(&course.updated_at)
        .bind(i64::from(course.students))
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to upsert course: {error}")))?;

        Ok(CourseUpsert {
            course_id: id,
            outcome: if inserted {
                UpsertOutcome::Created
            } else {
                UpsertOutcome::Updated
            },
        })
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(database_error) = error {
        return database_error.code().as_deref() == Some("23505");
    }

    false
}

#[cfg(test)]
mod tests {
    use opencourse_core::AppError;
    use opencourse_domain::Course;

    use super::CourseRow;

    fn row(students: i64) -> CourseRow {
        CourseRow {
            id: "1".to_owned(),
            instructor: "Alice".to_owned(),
            title: "T".to_owned(),
            description: String::new(),
            created_at: "Jan 1, 2024".to_owned(),
            updated_at: "Jan 1, 2024".to_owned(),
            students,
        }
    }

    #[test]
    fn in_range_student_count_converts() {
        let course = Course::try_from(row(42));
        assert_eq!(course.map(|course| course.students).unwrap_or_default(), 42);
    }

    #[test]
    fn out_of_range_student_count_is_an_internal_error_not_zero() {
        let course = Course::try_from(row(i64::from(u32::MAX) + 1));
        assert!(matches!(course, Err(AppError::Internal(_))));
    }
}
