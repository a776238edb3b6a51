//! A proof bound to an assembled vector rejects a change at any position,
//! not only in the header or at hand-picked table entries.

use std::sync::OnceLock;

use num_bigint::BigUint;
use proptest::prelude::*;
use serde_json::Value;

use anonpost_core::{GroupType, MerkleRoot, PropId};
use anonpost_crypto::compute_artifacts;
use anonpost_zkp::signals::field_modulus;
use anonpost_zkp::{
    assemble_from_artifacts, MockProofSystem, ProofVerifier, PublicSignals, PUBLIC_SIGNAL_COUNT,
};

const R_HEX: &str = "f973a0b87062c389d125d8199e803b832b6ac6bf7867a4f6cd87506060fc4c58";
const MESSAGE: &[u8] = b"heyanon: propId=7 groupType=2";

fn bound() -> &'static (Vec<String>, Value) {
    static BOUND: OnceLock<(Vec<String>, Value)> = OnceLock::new();
    BOUND.get_or_init(|| {
        let artifacts = compute_artifacts(R_HEX, true, MESSAGE).unwrap();
        let signals = assemble_from_artifacts(
            &MerkleRoot::new("0xabc").unwrap(),
            PropId::new(7),
            GroupType::new(2),
            &artifacts,
        )
        .unwrap();
        let proof = MockProofSystem.prove_json(&signals).unwrap();
        (signals.into_vec(), proof)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn changing_any_signal_breaks_the_proof(
        index in 0..PUBLIC_SIGNAL_COUNT,
        delta in 1u64..,
    ) {
        let (values, proof) = bound();
        let verifier = ProofVerifier::mock();

        let mut tampered = values.clone();
        let old: BigUint = tampered[index].parse().unwrap();
        let new = (old + BigUint::from(delta)) % field_modulus();
        prop_assume!(new.to_string() != tampered[index]);
        tampered[index] = new.to_string();

        let tampered = PublicSignals::from_decimal_strings(tampered).unwrap();
        prop_assert!(!verifier.verify(&tampered, proof));
    }
}

#[test]
fn untampered_vector_verifies() {
    let (values, proof) = bound();
    let signals = PublicSignals::from_decimal_strings(values.clone()).unwrap();
    assert!(ProofVerifier::mock().verify(&signals, proof));
}
