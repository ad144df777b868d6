//! Application services and ports.

#![forbid(unsafe_code)]

pub mod course_policy;
mod course_service;
mod user_service;

pub use course_policy::CourseScope;
pub use course_service::{
    CourseRepository, CourseService, CourseUpsert, ResolvedCourse, UpsertOutcome, resolve_upsert,
};
pub use user_service::{
    AuthOutcome, PasswordHasher, RegisterParams, UserRecord, UserRepository, UserService,
};
