//! # Groth16 over BN254 (snarkjs formats)
//!
//! Verification keys and proofs arrive in the JSON layout written by
//! snarkjs: field elements as decimal strings, G1 points as projective
//! triples `[x, y, "1"]`, and G2 points as `[[x.c0, x.c1], [y.c0, y.c1],
//! ["1", "0"]]`.
//!
//! Every coordinate is range-checked against the base field and every point
//! is checked to lie on the curve and in the prime-order subgroup before it
//! reaches the pairing. Verification itself is `ark-groth16`.

use ark_bn254::{Bn254, Fq, Fq2, Fr, G1Affine, G2Affine};
use ark_ff::PrimeField;
use ark_groth16::{Groth16, PreparedVerifyingKey, Proof, VerifyingKey};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::signals::PublicSignals;
use crate::traits::{ProofSystem, VerifyError};

// ---------------------------------------------------------------------------
// snarkjs JSON shapes
// ---------------------------------------------------------------------------

/// A snarkjs `verification_key.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnarkjsVerificationKey {
    /// Must be `groth16`.
    pub protocol: String,
    /// Must be `bn128` (snarkjs name for BN254).
    pub curve: String,
    /// Number of public inputs.
    #[serde(rename = "nPublic")]
    pub n_public: usize,
    /// α in G1.
    pub vk_alpha_1: Vec<String>,
    /// β in G2.
    pub vk_beta_2: Vec<Vec<String>>,
    /// γ in G2.
    pub vk_gamma_2: Vec<Vec<String>>,
    /// δ in G2.
    pub vk_delta_2: Vec<Vec<String>>,
    /// Input commitments, `nPublic + 1` G1 points.
    #[serde(rename = "IC")]
    pub ic: Vec<Vec<String>>,
}

/// A snarkjs `proof.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnarkjsProof {
    /// A in G1.
    pub pi_a: Vec<String>,
    /// B in G2.
    pub pi_b: Vec<Vec<String>>,
    /// C in G1.
    pub pi_c: Vec<String>,
    /// `groth16` when present.
    #[serde(default)]
    pub protocol: Option<String>,
    /// `bn128` when present.
    #[serde(default)]
    pub curve: Option<String>,
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn fq(value: &str, what: &str) -> Result<Fq, String> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("{what}: {value:?} is not a decimal integer"));
    }
    let n = BigUint::parse_bytes(value.as_bytes(), 10)
        .ok_or_else(|| format!("{what}: {value:?} is not a decimal integer"))?;
    let modulus: BigUint = Fq::MODULUS.into();
    if n >= modulus {
        return Err(format!("{what}: coordinate exceeds the base field"));
    }
    Ok(Fq::from(n))
}

fn g1(coords: &[String], what: &str) -> Result<G1Affine, String> {
    let [x, y, z] = coords else {
        return Err(format!("{what}: expected 3 coordinates, got {}", coords.len()));
    };
    if z != "1" {
        return Err(format!("{what}: expected affine point with z = 1"));
    }
    let point = G1Affine::new_unchecked(fq(x, what)?, fq(y, what)?);
    if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(format!("{what}: not a valid G1 point"));
    }
    Ok(point)
}

fn g2(coords: &[Vec<String>], what: &str) -> Result<G2Affine, String> {
    let [x, y, z] = coords else {
        return Err(format!("{what}: expected 3 coordinates, got {}", coords.len()));
    };
    let pair = |c: &[String]| -> Result<Fq2, String> {
        match c {
            [c0, c1] => Ok(Fq2::new(fq(c0, what)?, fq(c1, what)?)),
            _ => Err(format!("{what}: expected 2 components, got {}", c.len())),
        }
    };
    if z.as_slice() != ["1", "0"] {
        return Err(format!("{what}: expected affine point with z = 1"));
    }
    let point = G2Affine::new_unchecked(pair(x)?, pair(y)?);
    if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(format!("{what}: not a valid G2 point"));
    }
    Ok(point)
}

fn check_tag(field: &str, actual: &str, expected: &str) -> Result<(), String> {
    if actual == expected {
        Ok(())
    } else {
        Err(format!("{field} must be {expected:?}, got {actual:?}"))
    }
}

// ---------------------------------------------------------------------------
// Groth16VerifyingKey
// ---------------------------------------------------------------------------

/// A decoded and prepared BN254 Groth16 verification key.
#[derive(Clone)]
pub struct Groth16VerifyingKey {
    n_public: usize,
    prepared: PreparedVerifyingKey<Bn254>,
}

impl std::fmt::Debug for Groth16VerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Groth16VerifyingKey")
            .field("n_public", &self.n_public)
            .finish_non_exhaustive()
    }
}

impl Groth16VerifyingKey {
    /// Parse a `verification_key.json` document.
    pub fn from_json(json: &str) -> Result<Self, VerifyError> {
        let raw: SnarkjsVerificationKey =
            serde_json::from_str(json).map_err(|e| VerifyError::MalformedKey(e.to_string()))?;
        Self::from_snarkjs(&raw)
    }

    /// Decode an already-parsed snarkjs key.
    pub fn from_snarkjs(raw: &SnarkjsVerificationKey) -> Result<Self, VerifyError> {
        decode_key(raw).map_err(VerifyError::MalformedKey)
    }

    /// Number of public inputs the key was generated for.
    pub fn n_public(&self) -> usize {
        self.n_public
    }
}

fn decode_key(raw: &SnarkjsVerificationKey) -> Result<Groth16VerifyingKey, String> {
    check_tag("protocol", &raw.protocol, "groth16")?;
    check_tag("curve", &raw.curve, "bn128")?;
    if raw.ic.len() != raw.n_public + 1 {
        return Err(format!(
            "IC has {} points but nPublic is {}",
            raw.ic.len(),
            raw.n_public
        ));
    }
    let gamma_abc_g1 = raw
        .ic
        .iter()
        .enumerate()
        .map(|(i, p)| g1(p, &format!("IC[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;
    let vk = VerifyingKey::<Bn254> {
        alpha_g1: g1(&raw.vk_alpha_1, "vk_alpha_1")?,
        beta_g2: g2(&raw.vk_beta_2, "vk_beta_2")?,
        gamma_g2: g2(&raw.vk_gamma_2, "vk_gamma_2")?,
        delta_g2: g2(&raw.vk_delta_2, "vk_delta_2")?,
        gamma_abc_g1,
    };
    Ok(Groth16VerifyingKey {
        n_public: raw.n_public,
        prepared: ark_groth16::prepare_verifying_key(&vk),
    })
}

fn decode_proof(raw: &SnarkjsProof) -> Result<Proof<Bn254>, String> {
    if let Some(protocol) = &raw.protocol {
        check_tag("protocol", protocol, "groth16")?;
    }
    if let Some(curve) = &raw.curve {
        check_tag("curve", curve, "bn128")?;
    }
    Ok(Proof {
        a: g1(&raw.pi_a, "pi_a")?,
        b: g2(&raw.pi_b, "pi_b")?,
        c: g1(&raw.pi_c, "pi_c")?,
    })
}

// ---------------------------------------------------------------------------
// Groth16ProofSystem
// ---------------------------------------------------------------------------

/// BN254 Groth16 verification via `ark-groth16`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Groth16ProofSystem;

impl ProofSystem for Groth16ProofSystem {
    type Proof = SnarkjsProof;
    type VerifyingKey = Groth16VerifyingKey;

    fn verify(
        &self,
        vk: &Self::VerifyingKey,
        proof: &Self::Proof,
        signals: &PublicSignals,
    ) -> Result<bool, VerifyError> {
        if signals.len() != vk.n_public {
            return Err(VerifyError::ArityMismatch {
                expected: vk.n_public,
                actual: signals.len(),
            });
        }
        let proof = decode_proof(proof).map_err(VerifyError::MalformedProof)?;
        let inputs: Vec<Fr> = signals
            .to_biguints()
            .map_err(|e| VerifyError::MalformedSignal(e.to_string()))?
            .into_iter()
            .map(Fr::from)
            .collect();

        Groth16::<Bn254>::verify_proof(&vk.prepared, &proof, &inputs)
            .map_err(|e| VerifyError::VerificationFailed(e.to_string()))
    }
}
