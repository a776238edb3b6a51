//! # Mock Proof System
//!
//! A transparent stand-in for the membership circuit, for development and
//! pipeline tests where a real 65 547-input setup is impractical.
//!
//! ```text
//! proof = { "protocol": "mock", "signalsDigest": SHA256(canonical(signals)) }
//! ```
//!
//! **NOT PRIVATE AND NOT SOUND.** Anyone can produce a "proof" for any
//! signal vector. The proof is still bound to every signal, so tamper
//! detection behaves as it does with a real backend.

use serde::{Deserialize, Serialize};

use anonpost_core::{sha256_digest, CanonicalBytes, ContentDigest};

use crate::signals::PublicSignals;
use crate::traits::{ProofSystem, VerifyError};

/// Protocol tag carried by mock proofs.
pub const MOCK_PROTOCOL: &str = "mock";

/// A mock proof: the digest of the signal vector it claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockProof {
    /// Always `mock`.
    pub protocol: String,
    /// Hex SHA-256 of the canonical JSON signal array.
    pub signals_digest: String,
}

/// The mock backend. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockProofSystem;

impl MockProofSystem {
    /// Produce the unique proof the mock verifier accepts for `signals`.
    pub fn prove(&self, signals: &PublicSignals) -> Result<MockProof, VerifyError> {
        Ok(MockProof {
            protocol: MOCK_PROTOCOL.to_string(),
            signals_digest: signals_digest(signals)?.to_hex(),
        })
    }

    /// [`prove`](Self::prove), rendered as the JSON a client would submit.
    pub fn prove_json(&self, signals: &PublicSignals) -> Result<serde_json::Value, VerifyError> {
        Ok(serde_json::json!({
            "protocol": MOCK_PROTOCOL,
            "signalsDigest": signals_digest(signals)?.to_hex(),
        }))
    }
}

fn signals_digest(signals: &PublicSignals) -> Result<ContentDigest, VerifyError> {
    let canonical =
        CanonicalBytes::new(signals).map_err(|e| VerifyError::MalformedSignal(e.to_string()))?;
    Ok(sha256_digest(&canonical))
}

impl ProofSystem for MockProofSystem {
    type Proof = MockProof;
    type VerifyingKey = ();

    fn verify(
        &self,
        _vk: &Self::VerifyingKey,
        proof: &Self::Proof,
        signals: &PublicSignals,
    ) -> Result<bool, VerifyError> {
        if proof.protocol != MOCK_PROTOCOL {
            return Err(VerifyError::MalformedProof(format!(
                "protocol must be {MOCK_PROTOCOL:?}, got {:?}",
                proof.protocol
            )));
        }
        let claimed = ContentDigest::from_hex(&proof.signals_digest)
            .map_err(|e| VerifyError::MalformedProof(e.to_string()))?;
        Ok(claimed == signals_digest(signals)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(values: &[&str]) -> PublicSignals {
        PublicSignals::from_decimal_strings(values.iter().map(|s| s.to_string()).collect())
            .unwrap()
    }

    #[test]
    fn prove_then_verify() {
        let s = signals(&["1", "2", "3"]);
        let proof = MockProofSystem.prove(&s).unwrap();
        assert!(MockProofSystem.verify(&(), &proof, &s).unwrap());
    }

    #[test]
    fn proof_carries_digest_of_canonical_signals() {
        let s = signals(&["1", "2", "3"]);
        let expected = sha256_digest(&CanonicalBytes::new(&s).unwrap());
        let proof = MockProofSystem.prove(&s).unwrap();
        assert_eq!(proof.signals_digest, expected.to_hex());
        assert_ne!(proof.signals_digest, "00".repeat(32));
    }

    #[test]
    fn prove_json_matches_prove() {
        let s = signals(&["42"]);
        let parsed = MockProofSystem
            .parse_proof(&MockProofSystem.prove_json(&s).unwrap())
            .unwrap();
        assert_eq!(parsed, MockProofSystem.prove(&s).unwrap());
    }

    #[test]
    fn any_changed_signal_fails() {
        let s = signals(&["1", "2", "3"]);
        let proof = MockProofSystem.prove(&s).unwrap();
        for tampered in [
            signals(&["9", "2", "3"]),
            signals(&["1", "9", "3"]),
            signals(&["1", "2", "9"]),
            signals(&["1", "2"]),
        ] {
            assert!(!MockProofSystem.verify(&(), &proof, &tampered).unwrap());
        }
    }

    #[test]
    fn wrong_protocol_is_malformed() {
        let s = signals(&["1"]);
        let mut proof = MockProofSystem.prove(&s).unwrap();
        proof.protocol = "groth16".into();
        assert!(matches!(
            MockProofSystem.verify(&(), &proof, &s),
            Err(VerifyError::MalformedProof(_))
        ));
    }

    #[test]
    fn bad_digest_is_malformed() {
        let s = signals(&["1"]);
        let mut proof = MockProofSystem.prove(&s).unwrap();
        proof.signals_digest = "xyz".into();
        assert!(MockProofSystem.verify(&(), &proof, &s).is_err());
    }
}
