//! HTTP handlers grouped by surface.

pub mod courses;
pub mod health;
