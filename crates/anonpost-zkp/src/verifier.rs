//! # ProofVerifier
//!
//! The single entry point the submission pipeline uses to check a proof.
//! The backend and its key are fixed at construction; a key that cannot be
//! loaded, or that was generated for a different number of public inputs
//! than the signal layout, is a startup error rather than a per-request one.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::groth16::{Groth16ProofSystem, Groth16VerifyingKey};
use crate::mock::MockProofSystem;
use crate::signals::PublicSignals;
use crate::traits::{ProofSystem, VerifyError};

/// The verifier cannot be constructed.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// The key file could not be read.
    #[error("cannot read verification key {}: {source}", .path.display())]
    KeyUnreadable {
        /// Configured key path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The key could not be decoded.
    #[error("verification key is malformed: {0}")]
    KeyMalformed(String),

    /// The key's input count does not match the signal layout.
    #[error("verification key takes {actual} public inputs, signal layout has {expected}")]
    ArityMismatch {
        /// Inputs produced by signal assembly.
        expected: usize,
        /// Inputs declared by the key.
        actual: usize,
    },
}

#[derive(Debug, Clone)]
enum Backend {
    Groth16(Groth16VerifyingKey),
    Mock,
}

/// Checks proofs against assembled public signals.
#[derive(Debug, Clone)]
pub struct ProofVerifier {
    backend: Backend,
}

impl ProofVerifier {
    /// Load a snarkjs Groth16 key from disk.
    ///
    /// When `expected_inputs` is given the key's `nPublic` must equal it.
    pub fn groth16_from_file(
        path: impl AsRef<Path>,
        expected_inputs: Option<usize>,
    ) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| {
            ConfigurationError::KeyUnreadable {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::groth16_from_json(&json, expected_inputs)
    }

    /// Parse a snarkjs Groth16 key from a JSON string.
    pub fn groth16_from_json(
        json: &str,
        expected_inputs: Option<usize>,
    ) -> Result<Self, ConfigurationError> {
        let key = Groth16VerifyingKey::from_json(json)
            .map_err(|e| ConfigurationError::KeyMalformed(e.to_string()))?;
        if let Some(expected) = expected_inputs {
            if key.n_public() != expected {
                return Err(ConfigurationError::ArityMismatch {
                    expected,
                    actual: key.n_public(),
                });
            }
        }
        Ok(Self {
            backend: Backend::Groth16(key),
        })
    }

    /// A verifier backed by the transparent mock proof system.
    pub fn mock() -> Self {
        Self {
            backend: Backend::Mock,
        }
    }

    /// Backend name for logs and readiness output.
    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Groth16(_) => "groth16",
            Backend::Mock => "mock",
        }
    }

    /// Public inputs the key expects, if the backend has a key.
    pub fn public_input_count(&self) -> Option<usize> {
        match &self.backend {
            Backend::Groth16(key) => Some(key.n_public()),
            Backend::Mock => None,
        }
    }

    /// Verify, reporting why a proof could not be checked.
    pub fn check(
        &self,
        signals: &PublicSignals,
        proof: &serde_json::Value,
    ) -> Result<bool, VerifyError> {
        match &self.backend {
            Backend::Groth16(vk) => run(&Groth16ProofSystem, vk, signals, proof),
            Backend::Mock => run(&MockProofSystem, &(), signals, proof),
        }
    }

    /// Verify. Any malformed input counts as an invalid proof.
    pub fn verify(&self, signals: &PublicSignals, proof: &serde_json::Value) -> bool {
        match self.check(signals, proof) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::debug!(backend = self.backend_name(), error = %e, "proof could not be checked");
                false
            }
        }
    }
}

fn run<P: ProofSystem>(
    system: &P,
    vk: &P::VerifyingKey,
    signals: &PublicSignals,
    proof: &serde_json::Value,
) -> Result<bool, VerifyError> {
    let proof = system.parse_proof(proof)?;
    system.verify(vk, &proof, signals)
}
