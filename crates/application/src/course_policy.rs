//! Authorization gate for the instructor course surface.
//!
//! One policy with two entry points, so instructor/admin semantics cannot
//! drift between the read and write paths. Both fail closed on an absent
//! caller. Pure predicates over caller state; no side effects.

use opencourse_core::{AppError, AppResult, CallerIdentity, Role};

/// Subset of course records a caller is entitled to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseScope {
    /// Every record, regardless of instructor.
    All,
    /// Only records whose instructor matches the caller's display name.
    Own,
}

/// Decides whether the caller may list instructor courses, and at which scope.
///
/// Admins see everything; instructors see their own records; everyone else
/// is denied.
pub fn can_list_instructor_courses(caller: Option<&CallerIdentity>) -> AppResult<CourseScope> {
    let caller = caller
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    match caller.role() {
        Role::Admin => Ok(CourseScope::All),
        Role::Instructor => Ok(CourseScope::Own),
        Role::Student => Err(AppError::Forbidden(
            "instructor or admin role required".to_owned(),
        )),
    }
}

/// Decides whether the caller may create or update a course record.
pub fn can_create_or_update_course(caller: Option<&CallerIdentity>) -> AppResult<()> {
    let caller = caller
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    match caller.role() {
        Role::Instructor | Role::Admin => Ok(()),
        Role::Student => Err(AppError::Forbidden(
            "instructor or admin role required".to_owned(),
        )),
    }
}
