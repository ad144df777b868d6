//! Course record types and the pure rules the upsert path depends on:
//! sequential identifier assignment and human-formatted dates.

use chrono::{DateTime, Utc};
use opencourse_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Fallback instructor name when neither the draft nor the caller supplies one.
pub const UNKNOWN_INSTRUCTOR: &str = "Unknown Instructor";

/// Unique identifier for a course record.
///
/// Stored as a string; identifiers assigned by this system are sequential
/// integers encoded as strings, but pre-existing records may carry arbitrary
/// non-empty values. Once assigned, an identifier never changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CourseId(String);

impl CourseId {
    /// Creates a validated course identifier.
    ///
    /// Any non-empty string is accepted as an opaque key; only the empty
    /// string signals "no identifier".
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(AppError::Validation(
                "course identifier must not be empty".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<CourseId> for String {
    fn from(value: CourseId) -> Self {
        value.0
    }
}

impl std::fmt::Display for CourseId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A fully-populated course record as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Unique record identifier.
    pub id: CourseId,
    /// Display name of the instructor who owns the record.
    pub instructor: String,
    /// Course title.
    pub title: String,
    /// Course description.
    pub description: String,
    /// Human-formatted creation date, e.g. `"Jan 5, 2024"`.
    pub created_at: String,
    /// Human-formatted date of the most recent upsert.
    pub updated_at: String,
    /// Number of enrolled students.
    pub students: u32,
}

/// A partial course record as submitted by a caller.
///
/// Any subset of fields may be populated; the resolver fills in the rest.
/// A caller-supplied `updated_at` is deliberately not modeled because the
/// resolver always overwrites it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseDraft {
    /// Identifier of an existing record to update, or `None` to create.
    pub id: Option<CourseId>,
    /// Instructor display name; defaults to the caller's.
    pub instructor: Option<String>,
    /// Course title.
    pub title: Option<String>,
    /// Course description.
    pub description: Option<String>,
    /// Creation date; defaulted to "now" only when absent.
    pub created_at: Option<String>,
    /// Enrolled student count; defaulted to `0` when absent.
    pub students: Option<u32>,
}

/// Computes the next sequential course identifier.
///
/// Takes one greater than the maximum numeric value among the existing
/// identifiers; non-numeric identifiers contribute no candidate. An empty
/// set yields `"1"`.
pub fn next_course_id<'a>(existing: impl IntoIterator<Item = &'a str>) -> CourseId {
    let max = existing
        .into_iter()
        .filter_map(|id| id.parse::<u64>().ok())
        .max()
        .unwrap_or(0);

    CourseId((max + 1).to_string())
}

/// Formats a timestamp the way course records store dates, e.g. `"Jan 5, 2024"`.
#[must_use]
pub fn format_course_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%b %-d, %Y").to_string()
}
