//! # Canonical Serialization
//!
//! This module defines [`CanonicalBytes`], the sole construction path for
//! bytes used in digest computation: proof fingerprints and the
//! content-store address of every committed submission.
//!
//! ## Security Invariant
//!
//! The inner `Vec<u8>` is private. The only way to construct `CanonicalBytes`
//! is through [`CanonicalBytes::new()`] or [`CanonicalBytes::from_value()`],
//! both of which apply the coercion rules below before serialization. Two
//! JSON documents that differ only in key order or whitespace therefore
//! produce identical bytes, and identical fingerprints.
//!
//! ## Coercion Rules
//!
//! 1. Reject floats. Field elements travel as decimal strings, and a float
//!    has no single canonical rendering.
//! 2. Sort object keys lexicographically.
//! 3. Use compact separators (no whitespace).
//!
//! Strings are never rewritten. A comment body that happens to look like a
//! timestamp is stored exactly as submitted.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by canonical JSON serialization.
///
/// The inner `Vec<u8>` is private; downstream code cannot construct
/// `CanonicalBytes` except through the constructors in this module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        Self::from_value(value)
    }

    /// Construct canonical bytes from an already-parsed JSON value.
    ///
    /// Used when re-verifying stored artifacts: the stored bytes are parsed
    /// back to a `Value` and re-canonicalized to recompute the digest.
    pub fn from_value(value: Value) -> Result<Self, CanonicalizationError> {
        let coerced = coerce_json_value(value)?;
        Ok(Self(serde_json::to_vec(&coerced)?))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume and return the inner byte vector.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Length of the canonical encoding in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the canonical encoding is empty. Never true for valid JSON.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Recursively apply the canonicalization rules.
///
/// Keys are sorted through a `BTreeMap` before the object is rebuilt, so
/// the output is sorted even if some dependency turns on serde_json's
/// `preserve_order` feature.
fn coerce_json_value(value: Value) -> Result<Value, CanonicalizationError> {
    match value {
        Value::Number(n) => {
            if n.is_f64() {
                return Err(CanonicalizationError::FloatRejected(
                    n.as_f64().unwrap_or(f64::NAN),
                ));
            }
            Ok(Value::Number(n))
        }
        Value::Object(map) => {
            let mut sorted = BTreeMap::new();
            for (k, v) in map {
                sorted.insert(k, coerce_json_value(v)?);
            }
            Ok(Value::Object(sorted.into_iter().collect()))
        }
        Value::Array(arr) => {
            let coerced: Result<Vec<_>, _> = arr.into_iter().map(coerce_json_value).collect();
            Ok(Value::Array(coerced?))
        }
        other => Ok(other),
    }
}
