//! Error types for the PeakPartner domain

use crate::validation::ValidationError;
use thiserror::Error;

/// Failures raised by the local state machines and payload checks.
///
/// These are synchronous and never retried: the acting party is told
/// immediately and no state is mutated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid transition: cannot {action} a {entity} that is {from}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        action: &'static str,
    },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Validation error: {}", .0.user_message())]
    Validation(ValidationError),
}

impl DomainError {
    pub fn invalid_transition(
        entity: &'static str,
        from: impl ToString,
        action: &'static str,
    ) -> Self {
        Self::InvalidTransition {
            entity,
            from: from.to_string(),
            action,
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }

    /// True for failures that the caller may not retry with the same actor.
    pub fn is_permission(&self) -> bool {
        matches!(self, Self::PermissionDenied(_))
    }
}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_message() {
        let err = DomainError::invalid_transition("session", "CANCELLED", "complete");
        assert_eq!(
            err.to_string(),
            "Invalid transition: cannot complete a session that is CANCELLED"
        );
    }

    #[test]
    fn test_validation_message_uses_label() {
        let err: DomainError = ValidationError::new("proposed_end", "must be after start").into();
        assert_eq!(
            err.to_string(),
            "Validation error: Proposed End Time: must be after start"
        );
        assert!(!err.is_permission());
    }
}
