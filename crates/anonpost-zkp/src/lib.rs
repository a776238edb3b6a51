//! # anonpost-zkp: Proof Verification
//!
//! - [`signals`]: assembles the ordered BN254 public-input vector from the
//!   group root, proposal identifiers, and signature artifacts.
//! - [`traits`]: the sealed [`ProofSystem`] abstraction.
//! - [`groth16`]: BN254 Groth16 verification over snarkjs key and proof JSON.
//! - [`mock`]: a transparent digest-based backend for development.
//! - [`verifier`]: [`ProofVerifier`], the facade the pipeline calls.

pub mod groth16;
pub mod mock;
pub mod signals;
pub mod traits;
pub mod verifier;

pub use groth16::{Groth16ProofSystem, Groth16VerifyingKey, SnarkjsProof, SnarkjsVerificationKey};
pub use mock::{MockProof, MockProofSystem};
pub use signals::{
    assemble, assemble_from_artifacts, root_to_field, PublicSignals, SerializationError,
    PUBLIC_SIGNAL_COUNT,
};
pub use traits::{ProofSystem, VerifyError};
pub use verifier::{ConfigurationError, ProofVerifier};
