//! Core Error Types
//!
//! Typed failures shared by all components. Two things are deliberately
//! *not* errors here: a duplicate follow edge or Duo group resolves as an
//! idempotent no-op, and a delivery miss (receiver offline) is logged and
//! ignored because the message is already durable by the time delivery is
//! attempted.

use thiserror::Error;

/// Typed failures surfaced by the core components.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A referenced user, profile, group, or message does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of the missing record (e.g. "profile", "group")
        entity: &'static str,
        /// Identifier that failed to resolve
        id: String,
    },

    /// Malformed input, such as a blank message body or a sender that is
    /// not a member of the target group.
    #[error("validation error in field '{field}': {message}")]
    Validation {
        /// The field that failed validation
        field: &'static str,
        /// Human-readable error message
        message: String,
    },
}

impl CoreError {
    /// Create a new not-found error.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Create a new validation error.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_not_found_display() {
        let id = Uuid::nil();
        let error = CoreError::not_found("profile", id);
        assert_eq!(
            error.to_string(),
            format!("profile not found: {id}")
        );
    }

    #[test]
    fn test_validation_display() {
        let error = CoreError::validation("body", "message body is empty");
        assert_eq!(
            error.to_string(),
            "validation error in field 'body': message body is empty"
        );
    }
}
