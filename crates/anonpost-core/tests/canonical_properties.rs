//! Property tests for canonical serialization and proof fingerprints.
//!
//! Fingerprints are the commit idempotency key, so a client re-sending the
//! same proof with different key order or whitespace must land on the same
//! record.

use anonpost_core::{sha256_digest, CanonicalBytes, ProofFingerprint};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn proof_like(entries: &[(String, String)]) -> Value {
    let mut map = Map::new();
    for (k, v) in entries {
        map.insert(k.clone(), Value::String(v.clone()));
    }
    Value::Object(map)
}

proptest! {
    #[test]
    fn fingerprint_ignores_key_order(
        entries in prop::collection::btree_map("[a-z_]{1,8}", "[0-9]{1,20}", 1..8)
    ) {
        let forward: Vec<(String, String)> = entries.clone().into_iter().collect();
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = CanonicalBytes::new(&proof_like(&forward)).unwrap();
        let b = CanonicalBytes::new(&proof_like(&reversed)).unwrap();
        prop_assert_eq!(&a, &b);

        let fa = ProofFingerprint::from_digest(sha256_digest(&a));
        let fb = ProofFingerprint::from_digest(sha256_digest(&b));
        prop_assert_eq!(fa, fb);
    }

    #[test]
    fn fingerprint_ignores_whitespace(value in "[0-9]{1,40}") {
        let compact = format!(r#"{{"pi_a":["{value}"],"protocol":"groth16"}}"#);
        let spaced = format!("{{ \"protocol\" : \"groth16\" ,\n \"pi_a\" : [ \"{value}\" ] }}");
        let a = CanonicalBytes::from_value(serde_json::from_str(&compact).unwrap()).unwrap();
        let b = CanonicalBytes::from_value(serde_json::from_str(&spaced).unwrap()).unwrap();
        prop_assert_eq!(sha256_digest(&a), sha256_digest(&b));
    }

    #[test]
    fn distinct_values_have_distinct_fingerprints(x in "[0-9]{1,20}", y in "[0-9]{1,20}") {
        prop_assume!(x != y);
        let a = CanonicalBytes::new(&serde_json::json!({"pi_a": [x]})).unwrap();
        let b = CanonicalBytes::new(&serde_json::json!({"pi_a": [y]})).unwrap();
        prop_assert_ne!(sha256_digest(&a), sha256_digest(&b));
    }
}
