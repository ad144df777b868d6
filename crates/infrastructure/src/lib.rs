//! Persistence and password-hashing adapters.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod in_memory_course_repository;
mod postgres_course_repository;
mod postgres_user_repository;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use in_memory_course_repository::InMemoryCourseRepository;
pub use postgres_course_repository::PostgresCourseRepository;
pub use postgres_user_repository::PostgresUserRepository;
