//! Business operations behind the HTTP handlers.
//!
//! Services own a cloned `PgPool`, validate their input, and return
//! `DomainError` which the API layer maps onto status codes.
use thiserror::Error;

use crate::auth::AuthError;
use crate::database::DatabaseError;
use crate::filter::FilterError;
use crate::types::InvalidTransition;

pub mod aggregates;
pub mod related;
pub mod users;
pub mod catalog;
pub mod enrollments;
pub mod progress;
pub mod reviews;
pub mod discussions;
pub mod admin;

pub use users::UserService;
pub use catalog::CatalogService;
pub use enrollments::EnrollmentService;
pub use progress::ProgressService;
pub use reviews::ReviewService;
pub use discussions::DiscussionService;
pub use admin::AdminService;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{message}")]
    Validation { field: &'static str, message: String },
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::Database(err.into())
    }
}

impl From<FilterError> for DomainError {
    fn from(err: FilterError) -> Self {
        DomainError::Database(err.into())
    }
}

impl DomainError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        DomainError::Validation { field, message: message.into() }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Trimmed, non-empty text for a required field.
pub fn required(field: &'static str, value: Option<&str>) -> DomainResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(DomainError::invalid(field, format!("{} is required", field))),
    }
}

/// Trimmed text or `None` when blank.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("title", Some("  Rust 101 ")).unwrap(), "Rust 101");
        assert!(matches!(required("title", Some("   ")), Err(DomainError::Validation { field: "title", .. })));
        assert!(required("title", None).is_err());
    }

    #[test]
    fn optional_text_drops_blank() {
        assert_eq!(optional_text(Some(" ".into())), None);
        assert_eq!(optional_text(Some(" #fff ".into())), Some("#fff".into()));
    }
}
