//! Domain error model.

use thiserror::Error;

/// Result type used across the fulfillment domain.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// The variants follow how an invocation fails, not where: validation and
/// authorization failures happen before any write, not-found is terminal for
/// the invocation, and persistence failures come from the external store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed input: wrong argument shape, bad JSON, missing discount, ...
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier could not be parsed or derived.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The caller is not allowed to perform the operation.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A referenced order or partition record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation collides with existing state (e.g. duplicate PoId).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The underlying store rejected a read or write.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// A cross-partition invariant does not hold.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Whether the failure was detected before any state could have been written.
    pub fn is_pre_write(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::InvalidId(_) | Self::Unauthorized(_) | Self::Conflict(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_surface_the_caller_text() {
        let err = DomainError::validation("At least 2 manufacturer discount objects expected.");
        assert_eq!(
            err.to_string(),
            "validation failed: At least 2 manufacturer discount objects expected."
        );

        let err = DomainError::not_found("purchase order 42");
        assert_eq!(err.to_string(), "not found: purchase order 42");
    }

    #[test]
    fn persistence_and_not_found_are_not_pre_write() {
        assert!(DomainError::validation("x").is_pre_write());
        assert!(DomainError::conflict("x").is_pre_write());
        assert!(!DomainError::persistence("x").is_pre_write());
        assert!(!DomainError::not_found("x").is_pre_write());
    }
}
