//! Course reads and writes behind the authorization gate, plus the upsert
//! resolver that completes partial records with deterministic defaults.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use opencourse_core::{AppResult, CallerIdentity};
use opencourse_domain::{
    Course, CourseDraft, CourseId, UNKNOWN_INSTRUCTOR, format_course_date,
};

use crate::course_policy::{self, CourseScope};

/// Whether an upsert inserted a new record or replaced an existing one.
///
/// Reported by the persistence provider, never inferred by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new record was inserted.
    Created,
    /// An existing record was replaced in place.
    Updated,
}

/// Result of an upsert-by-identifier operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseUpsert {
    /// Identifier the record was persisted under.
    pub course_id: CourseId,
    /// Whether the record was created or updated.
    pub outcome: UpsertOutcome,
}

/// A draft completed by the resolver and ready to persist.
///
/// The identifier may still be absent, in which case the repository
/// allocates the next sequential one atomically (see the Postgres adapter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCourse {
    /// Identifier to upsert under, or `None` to allocate one.
    pub id: Option<CourseId>,
    /// Instructor display name, always populated.
    pub instructor: String,
    /// Course title.
    pub title: String,
    /// Course description.
    pub description: String,
    /// Human-formatted creation date.
    pub created_at: String,
    /// Human-formatted date of this upsert.
    pub updated_at: String,
    /// Enrolled student count.
    pub students: u32,
}

impl ResolvedCourse {
    /// Materializes the resolved draft into a course record under `id`.
    #[must_use]
    pub fn into_course(self, id: CourseId) -> Course {
        Course {
            id,
            instructor: self.instructor,
            title: self.title,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
            students: self.students,
        }
    }
}

/// Repository port for course records.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Lists every course record.
    async fn list_all(&self) -> AppResult<Vec<Course>>;

    /// Lists course records owned by the given instructor name.
    async fn list_by_instructor(&self, instructor: &str) -> AppResult<Vec<Course>>;

    /// Upserts by identifier: insert if absent, replace in place if present.
    ///
    /// When the resolved draft carries no identifier, the implementation
    /// must allocate the next sequential one without persisting a duplicate.
    async fn upsert(&self, course: ResolvedCourse) -> AppResult<CourseUpsert>;
}

/// Completes a partial course record with deterministic defaults.
///
/// - `instructor` falls back to the caller's display name, then to
///   [`UNKNOWN_INSTRUCTOR`].
/// - `created_at` is defaulted to the formatted `now` only when absent;
///   `updated_at` is always overwritten with it.
/// - `students` defaults to `0` only when absent; an explicit `0` is kept
///   as supplied.
#[must_use]
pub fn resolve_upsert(
    draft: CourseDraft,
    caller: Option<&CallerIdentity>,
    now: DateTime<Utc>,
) -> ResolvedCourse {
    let now = format_course_date(now);

    let instructor = match draft.instructor {
        Some(name) if !name.is_empty() => name,
        _ => caller
            .and_then(|caller| caller.display_name())
            .map_or_else(|| UNKNOWN_INSTRUCTOR.to_owned(), ToOwned::to_owned),
    };

    ResolvedCourse {
        id: draft.id,
        instructor,
        title: draft.title.unwrap_or_default(),
        description: draft.description.unwrap_or_default(),
        created_at: draft.created_at.unwrap_or_else(|| now.clone()),
        updated_at: now,
        students: draft.students.unwrap_or(0),
    }
}

/// Application service for authorization-gated course reads and writes.
#[derive(Clone)]
pub struct CourseService {
    repository: Arc<dyn CourseRepository>,
}

impl CourseService {
    /// Creates a course service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn CourseRepository>) -> Self {
        Self { repository }
    }

    /// Lists the course records visible to the caller.
    ///
    /// The gate decides the scope: admins read everything, instructors read
    /// records whose instructor matches their display name.
    pub async fn list_instructor_courses(
        &self,
        caller: Option<&CallerIdentity>,
    ) -> AppResult<Vec<Course>> {
        match course_policy::can_list_instructor_courses(caller)? {
            CourseScope::All => self.repository.list_all().await,
            CourseScope::Own => {
                // Own scope matches on the display name because that is what
                // course records store as the instructor.
                let instructor = caller
                    .and_then(|caller| caller.display_name())
                    .unwrap_or_default();
                self.repository.list_by_instructor(instructor).await
            }
        }
    }

    /// Resolves and persists a partial course record for the caller.
    pub async fn upsert_course(
        &self,
        caller: Option<&CallerIdentity>,
        draft: CourseDraft,
    ) -> AppResult<CourseUpsert> {
        course_policy::can_create_or_update_course(caller)?;

        let resolved = resolve_upsert(draft, caller, Utc::now());
        self.repository.upsert(resolved).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use opencourse_core::{AppError, AppResult, CallerIdentity, Role};
    use opencourse_domain::{Course, CourseDraft, CourseId, next_course_id};
    use tokio::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingCourseRepository {
        courses: Mutex<Vec<Course>>,
        listed_instructors: Mutex<Vec<String>>,
        list_all_calls: Mutex<usize>,
    }

    #[async_trait::async_trait]
    impl CourseRepository for RecordingCourseRepository {
        async fn list_all(&self) -> AppResult<Vec<Course>> {
            *self.list_all_calls.lock().await += 1;
            Ok(self.courses.lock().await.clone())
        }

        async fn list_by_instructor(&self, instructor: &str) -> AppResult<Vec<Course>> {
            self.listed_instructors
                .lock()
                .await
                .push(instructor.to_owned());
            Ok(self
                .courses
                .lock()
                .await
                .iter()
                .filter(|course| course.instructor == instructor)
                .cloned()
                .collect())
        }

        async fn upsert(&self, course: ResolvedCourse) -> AppResult<CourseUpsert> {
            let mut courses = self.courses.lock().await;
            let id = match course.id.clone() {
                Some(id) => id,
                None => next_course_id(courses.iter().map(|course| course.id.as_str())),
            };

            let existing = courses.iter().position(|stored| stored.id == id);
            let record = course.into_course(id.clone());
            let outcome = match existing {
                Some(index) => {
                    courses[index] = record;
                    UpsertOutcome::Updated
                }
                None => {
                    courses.push(record);
                    UpsertOutcome::Created
                }
            };

            Ok(CourseUpsert {
                course_id: id,
                outcome,
            })
        }
    }

    fn caller(name: &str, role: Role) -> CallerIdentity {
        CallerIdentity::new("subject", Some(name.to_owned()), role)
    }

    fn seeded_course(id: &str, instructor: &str) -> Course {
        Course {
            id: CourseId::new(id).unwrap_or_else(|_| next_course_id([])),
            instructor: instructor.to_owned(),
            title: format!("Course {id}"),
            description: String::new(),
            created_at: "Jan 1, 2024".to_owned(),
            updated_at: "Jan 1, 2024".to_owned(),
            students: 10,
        }
    }

    fn fixed_now() -> chrono::DateTime<Utc> {
        chrono::Utc
            .with_ymd_and_hms(2024, 1, 5, 9, 30, 0)
            .single()
            .unwrap_or_default()
    }

    #[test]
    fn resolver_defaults_every_absent_field() {
        let bob = caller("Bob", Role::Instructor);
        let resolved = resolve_upsert(
            CourseDraft {
                title: Some("X".to_owned()),
                ..CourseDraft::default()
            },
            Some(&bob),
            fixed_now(),
        );

        assert_eq!(resolved.id, None);
        assert_eq!(resolved.instructor, "Bob");
        assert_eq!(resolved.title, "X");
        assert_eq!(resolved.description, "");
        assert_eq!(resolved.created_at, "Jan 5, 2024");
        assert_eq!(resolved.updated_at, "Jan 5, 2024");
        assert_eq!(resolved.students, 0);
    }

    #[test]
    fn resolver_preserves_supplied_fields_except_updated_at() {
        let bob = caller("Bob", Role::Instructor);
        let resolved = resolve_upsert(
            CourseDraft {
                instructor: Some("Alice".to_owned()),
                created_at: Some("Mar 2, 2020".to_owned()),
                students: Some(42),
                ..CourseDraft::default()
            },
            Some(&bob),
            fixed_now(),
        );

        assert_eq!(resolved.instructor, "Alice");
        assert_eq!(resolved.created_at, "Mar 2, 2020");
        assert_eq!(resolved.updated_at, "Jan 5, 2024");
        assert_eq!(resolved.students, 42);
    }

    #[test]
    fn resolver_keeps_an_explicit_zero_student_count() {
        let resolved = resolve_upsert(
            CourseDraft {
                students: Some(0),
                ..CourseDraft::default()
            },
            Some(&caller("Bob", Role::Instructor)),
            fixed_now(),
        );
        assert_eq!(resolved.students, 0);
    }

    #[test]
    fn resolver_falls_back_to_unknown_instructor() {
        let nameless = CallerIdentity::new("subject", None, Role::Admin);
        let resolved = resolve_upsert(CourseDraft::default(), Some(&nameless), fixed_now());
        assert_eq!(resolved.instructor, UNKNOWN_INSTRUCTOR);
    }

    #[test]
    fn resolver_treats_empty_instructor_as_absent() {
        let resolved = resolve_upsert(
            CourseDraft {
                instructor: Some(String::new()),
                ..CourseDraft::default()
            },
            Some(&caller("Bob", Role::Instructor)),
            fixed_now(),
        );
        assert_eq!(resolved.instructor, "Bob");
    }

    #[tokio::test]
    async fn admin_listing_reads_all_records() {
        let repository = Arc::new(RecordingCourseRepository::default());
        repository
            .courses
            .lock()
            .await
            .extend([seeded_course("1", "Alice"), seeded_course("2", "Bob")]);

        let service = CourseService::new(repository.clone());
        let admin = caller("Root", Role::Admin);
        let courses = service
            .list_instructor_courses(Some(&admin))
            .await
            .unwrap_or_default();

        assert_eq!(courses.len(), 2);
        assert_eq!(*repository.list_all_calls.lock().await, 1);
    }

    #[tokio::test]
    async fn instructor_listing_is_scoped_to_their_name() {
        let repository = Arc::new(RecordingCourseRepository::default());
        repository
            .courses
            .lock()
            .await
            .extend([seeded_course("1", "Alice"), seeded_course("2", "Bob")]);

        let service = CourseService::new(repository.clone());
        let bob = caller("Bob", Role::Instructor);
        let courses = service
            .list_instructor_courses(Some(&bob))
            .await
            .unwrap_or_default();

        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].instructor, "Bob");
        assert_eq!(
            repository.listed_instructors.lock().await.as_slice(),
            ["Bob".to_owned()]
        );
    }

    #[tokio::test]
    async fn student_listing_is_denied_before_any_read() {
        let repository = Arc::new(RecordingCourseRepository::default());
        let service = CourseService::new(repository.clone());

        let student = caller("Sam", Role::Student);
        let denied = service.list_instructor_courses(Some(&student)).await;

        assert!(matches!(denied, Err(AppError::Forbidden(_))));
        assert_eq!(*repository.list_all_calls.lock().await, 0);
        assert!(repository.listed_instructors.lock().await.is_empty());
    }

    #[tokio::test]
    async fn upsert_without_identifier_creates_and_reports_the_allocated_id() {
        let repository = Arc::new(RecordingCourseRepository::default());
        for id in ["1", "2", "5"] {
            repository.courses.lock().await.push(seeded_course(id, "Alice"));
        }

        let service = CourseService::new(repository);
        let bob = caller("Bob", Role::Instructor);
        let upsert = service
            .upsert_course(
                Some(&bob),
                CourseDraft {
                    title: Some("Networking".to_owned()),
                    ..CourseDraft::default()
                },
            )
            .await;

        let Ok(upsert) = upsert else {
            panic!("upsert failed");
        };
        assert_eq!(upsert.course_id.as_str(), "6");
        assert_eq!(upsert.outcome, UpsertOutcome::Created);
    }

    #[tokio::test]
    async fn upsert_with_existing_identifier_updates_in_place() {
        let repository = Arc::new(RecordingCourseRepository::default());
        repository.courses.lock().await.push(seeded_course("3", "Bob"));

        let service = CourseService::new(repository.clone());
        let bob = caller("Bob", Role::Instructor);
        let upsert = service
            .upsert_course(
                Some(&bob),
                CourseDraft {
                    id: CourseId::new("3").ok(),
                    title: Some("Revised".to_owned()),
                    ..CourseDraft::default()
                },
            )
            .await;

        let Ok(upsert) = upsert else {
            panic!("upsert failed");
        };
        assert_eq!(upsert.outcome, UpsertOutcome::Updated);

        let courses = repository.courses.lock().await;
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].title, "Revised");
    }

    #[tokio::test]
    async fn unauthenticated_upsert_is_denied() {
        let service = CourseService::new(Arc::new(RecordingCourseRepository::default()));
        let denied = service.upsert_course(None, CourseDraft::default()).await;
        assert!(matches!(denied, Err(AppError::Unauthorized(_))));
    }
}
