/// Database models for Trellis
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts
/// - `session`: Server-side session records backing the signed client token
/// - `project`: Top-level projects, each owned by a user
/// - `member`: Project memberships with per-project roles
/// - `module`: Task lists belonging to a project
/// - `column`: Kanban columns within a module
/// - `task`: Tasks within a column
///
/// Every model validates its `Create*` input before touching the database
/// and reports failures as [`ModelError::Validation`] with the offending
/// field. Deleting a row that does not exist reports [`ModelError::NotFound`]
/// uniformly across all entities.

pub mod column;
pub mod member;
pub mod module;
pub mod project;
pub mod session;
pub mod task;
pub mod user;

/// Error type shared by all model operations
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Input failed an entity invariant
    #[error("{field}: {message}")]
    Validation {
        /// Field that failed validation
        field: &'static str,
        /// Constraint that was violated
        message: String,
    },

    /// The referenced row does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Underlying database failure
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl ModelError {
    /// Shorthand for a validation failure on a single field
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ModelError::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Result alias used by all model operations
pub type ModelResult<T> = Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ModelError::validation("name", "must be 3-255 characters");
        assert_eq!(err.to_string(), "name: must be 3-255 characters");
    }

    #[test]
    fn test_not_found_display() {
        let err = ModelError::NotFound("project");
        assert_eq!(err.to_string(), "project not found");
    }
}
