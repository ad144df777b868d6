//! In-memory course repository for tests and local development.

use std::collections::HashMap;

use async_trait::async_trait;
use opencourse_application::{CourseRepository, CourseUpsert, ResolvedCourse, UpsertOutcome};
use opencourse_core::AppResult;
use opencourse_domain::{Course, next_course_id};
use tokio::sync::RwLock;

/// In-memory implementation of the course repository port.
#[derive(Debug, Default)]
pub struct InMemoryCourseRepository {
    courses: RwLock<HashMap<String, Course>>,
}

impl InMemoryCourseRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(mut courses: Vec<Course>) -> Vec<Course> {
        // Numeric ids in numeric order, everything else after, for stable
        // output in tests.
        courses.sort_by_key(|course| {
            (
                course.id.as_str().parse::<u64>().map_or(u64::MAX, |id| id),
                course.id.as_str().to_owned(),
            )
        });
        courses
    }
}

#[async_trait]
impl CourseRepository for InMemoryCourseRepository {
    async fn list_all(&self) -> AppResult<Vec<Course>> {
        let courses = self.courses.read().await;
        Ok(Self::sorted(courses.values().cloned().collect()))
    }

    async fn list_by_instructor(&self, instructor: &str) -> AppResult<Vec<Course>> {
        let courses = self.courses.read().await;
        Ok(Self::sorted(
            courses
                .values()
                .filter(|course| course.instructor == instructor)
                .cloned()
                .collect(),
        ))
    }

    async fn upsert(&self, course: ResolvedCourse) -> AppResult<CourseUpsert> {
        let mut courses = self.courses.write().await;

        let id = match course.id.clone() {
            Some(id) => id,
            None => next_course_id(courses.keys().map(String::as_str)),
        };

        let record = course.into_course(id.clone());
        let outcome = match courses.insert(id.as_str().to_owned(), record) {
            Some(_) => UpsertOutcome::Updated,
            None => UpsertOutcome::Created,
        };

        Ok(CourseUpsert {
            course_id: id,
            outcome,
        })
    }
}
