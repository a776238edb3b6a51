//! # Error Hierarchy
//!
//! Structured error types shared across the workspace, built with
//! `thiserror`. Subsystem crates define their own error enums and convert
//! into these where a shared type is useful.

use thiserror::Error;

/// Top-level error type for core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Canonicalization failure during digest computation.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Domain primitive validation failure.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values have no canonical rendering and are rejected.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed during canonicalization.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Validation errors for domain primitive newtypes.
///
/// Each variant carries the offending input so operators can diagnose a
/// rejected request without guesswork.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Malformed hex input.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// A digest string is not 64 hex characters.
    #[error("invalid digest: \"{0}\" (expected 64 hex characters)")]
    InvalidDigest(String),

    /// A Merkle root is empty or contains whitespace.
    #[error("invalid merkle root: \"{0}\"")]
    InvalidRoot(String),

    /// A comment body exceeds the accepted size.
    #[error("comment too long: {len} bytes (max {max})")]
    CommentTooLong {
        /// Submitted length in bytes.
        len: usize,
        /// Maximum accepted length in bytes.
        max: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display() {
        let err = ValidationError::CommentTooLong { len: 5000, max: 4096 };
        let msg = err.to_string();
        assert!(msg.contains("5000"));
        assert!(msg.contains("4096"));
    }

    #[test]
    fn core_error_from_validation() {
        let err: CoreError = ValidationError::InvalidRoot(String::new()).into();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn float_rejected_display() {
        let err = CanonicalizationError::FloatRejected(1.5);
        assert!(err.to_string().contains("1.5"));
    }
}
