//! Unified error types for the domain layer
//!
//! Provides a common error type for identifier and entity validation so the
//! client crate never has to fall back to `String` errors.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., a reference without any identifier)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Invalid ID format
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    ///
    /// Use this when a value cannot be acted upon as given:
    /// - A reference carries neither a primary nor a document id
    /// - A document id is blank
    ///
    /// # Example
    /// ```ignore
    /// if !target.is_resolvable() {
    ///     return Err(DomainError::validation("course reference has no identifier"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an invalid ID error
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = DomainError::validation("course reference has no identifier");
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Validation failed: course reference has no identifier"
        );
    }

    #[test]
    fn test_invalid_id_error() {
        let err = DomainError::invalid_id("local-abc");
        assert_eq!(err.to_string(), "Invalid ID format: local-abc");
    }
}
