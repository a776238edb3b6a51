//! # Proof System Trait (Sealed)
//!
//! The verification-side abstraction over proof backends. Only the backends
//! defined in this crate ([`Groth16ProofSystem`](crate::groth16::Groth16ProofSystem)
//! and [`MockProofSystem`](crate::mock::MockProofSystem)) can implement it,
//! so no external backend can be slipped into the verifier.

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::signals::PublicSignals;

/// Why a proof could not be checked.
///
/// The verifier treats every variant as a failed verification; the detail
/// only feeds logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// The proof object does not have the expected shape or encoding.
    #[error("malformed proof: {0}")]
    MalformedProof(String),

    /// The verification key does not have the expected shape or encoding.
    #[error("malformed verification key: {0}")]
    MalformedKey(String),

    /// A public signal is not a valid field element.
    #[error("malformed public signal: {0}")]
    MalformedSignal(String),

    /// The number of public signals does not match the key.
    #[error("expected {expected} public signals, got {actual}")]
    ArityMismatch {
        /// Inputs the key was generated for.
        expected: usize,
        /// Inputs supplied.
        actual: usize,
    },

    /// The backend failed while evaluating the proof.
    #[error("verification failed: {0}")]
    VerificationFailed(String),
}

mod private {
    pub trait Sealed {}
}

/// A proof backend able to check a proof against public signals.
pub trait ProofSystem: private::Sealed + Send + Sync {
    /// Parsed proof representation.
    type Proof: DeserializeOwned + Clone + std::fmt::Debug;
    /// Verification key.
    type VerifyingKey;

    /// Parse an opaque JSON proof into this backend's representation.
    fn parse_proof(&self, proof: &serde_json::Value) -> Result<Self::Proof, VerifyError> {
        serde_json::from_value(proof.clone()).map_err(|e| VerifyError::MalformedProof(e.to_string()))
    }

    /// Check `proof` against `signals`.
    ///
    /// `Ok(false)` means a well-formed proof that does not verify.
    fn verify(
        &self,
        vk: &Self::VerifyingKey,
        proof: &Self::Proof,
        signals: &PublicSignals,
    ) -> Result<bool, VerifyError>;
}

impl private::Sealed for crate::groth16::Groth16ProofSystem {}
impl private::Sealed for crate::mock::MockProofSystem {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_error_display() {
        let err = VerifyError::ArityMismatch {
            expected: 3,
            actual: 2,
        };
        assert_eq!(err.to_string(), "expected 3 public signals, got 2");
        assert!(VerifyError::MalformedProof("pi_a".into())
            .to_string()
            .contains("pi_a"));
    }
}
