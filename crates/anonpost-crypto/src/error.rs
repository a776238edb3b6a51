//! # Cryptographic Error Types
//!
//! [`ArtifactError`] covers malformed signature components and is surfaced
//! to submitters as a rejection. [`CryptoError`] covers storage-side
//! failures, which are operational, not the submitter's fault.

use thiserror::Error;

/// The signature claim cannot be turned into circuit artifacts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArtifactError {
    /// `r` is not a scalar in `(0, n)` or no curve point has x-coordinate `r`.
    #[error("invalid r: {0}")]
    InvalidR(String),

    /// The message is not valid hex.
    #[error("invalid message encoding: {0}")]
    InvalidMessage(String),

    /// The message hash reduces to zero, which would place `U` at infinity.
    #[error("message hash reduces to zero modulo the group order")]
    DegenerateMessage,
}

/// Errors from content-addressed storage operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// CAS operation error.
    #[error("CAS error: {0}")]
    Cas(String),

    /// I/O error (CAS filesystem operations).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
