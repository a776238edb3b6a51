#![deny(missing_docs)]

//! # anonpost-core: Foundational Types
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It depends on no other workspace crate.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** A [`PropId`] cannot be
//!    passed where a [`GroupType`] is expected, and a [`MerkleRoot`] is never
//!    normalized: roots compare byte-for-byte.
//!
//! 2. **[`CanonicalBytes`] is the sole path to digest computation.** Proof
//!    fingerprints and content-store addresses both flow through
//!    `CanonicalBytes::new()`, so the same submission always hashes the same
//!    way regardless of field order in the inbound JSON.
//!
//! 3. **Structured errors.** `thiserror` enums, no `Box<dyn Error>`, no
//!    `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod encoding;
pub mod error;
pub mod identity;
pub mod submission;

// Re-export primary types at crate root for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_hex, ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, CoreError, ValidationError};
pub use identity::{GroupId, GroupType, MerkleRoot, PropId, ProofFingerprint, SubmissionId};
pub use submission::{
    Eip712Value, Group, NewSubmissionRecord, SignatureClaim, Submission, SubmissionRecord,
};
