//! Domain types and pure rules for courses and accounts.

#![forbid(unsafe_code)]

mod course;
mod user;

pub use course::{
    Course, CourseDraft, CourseId, UNKNOWN_INSTRUCTOR, format_course_date, next_course_id,
};
pub use user::{EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, UserId, validate_password};
