use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::AppError;

/// Role tier attached to every account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Enrolled learner with no instructor surface access.
    Student,
    /// Teaches courses; sees and manages records they own.
    Instructor,
    /// Full access across every course record.
    Admin,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Instructor => "instructor",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "student" => Ok(Self::Student),
            "instructor" => Ok(Self::Instructor),
            "admin" => Ok(Self::Admin),
            _ => Err(AppError::Validation(format!("unknown role '{value}'"))),
        }
    }
}

/// Caller information persisted in the authenticated session.
///
/// Resolved once per request from the session store; immutable for the
/// lifetime of that request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    subject: String,
    display_name: Option<String>,
    role: Role,
}

impl CallerIdentity {
    /// Creates a caller identity from account data.
    #[must_use]
    pub fn new(subject: impl Into<String>, display_name: Option<String>, role: Role) -> Self {
        Self {
            subject: subject.into(),
            display_name,
            role,
        }
    }

    /// Returns the stable subject identifier for the account.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the display name, if the account has one.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Returns the caller's role tier.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }
}
