//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers. Each identifier is a distinct
//! type, so a [`GroupType`] cannot be passed where a [`PropId`] is expected.
//!
//! ## Validation
//!
//! [`MerkleRoot`] validates shape at construction time but never
//! normalizes: `"0xABC"` and `"0xabc"` are different roots. Numeric
//! identifiers accept either a JSON number or a decimal string, since
//! wallet libraries emit both.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::digest::ContentDigest;
use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// Numeric identifiers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    String(String),
}

fn deserialize_u64_lenient<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => {
            let digits = s.trim();
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(serde::de::Error::custom(format!(
                    "expected a decimal integer, got {s:?}"
                )));
            }
            digits.parse::<u64>().map_err(serde::de::Error::custom)
        }
    }
}

/// Identifier of the proposal a comment is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropId(#[serde(deserialize_with = "deserialize_u64_lenient")] u64);

impl PropId {
    /// Wrap a raw proposal identifier.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Access the raw value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PropId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the group kind (e.g. token holders, delegates) whose
/// membership tree the proof is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupType(#[serde(deserialize_with = "deserialize_u64_lenient")] u64);

impl GroupType {
    /// Wrap a raw group type identifier.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Access the raw value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for GroupType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registry row identifier of a published group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(i64);

impl GroupId {
    /// Wrap a raw registry identifier.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Access the raw value.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// MerkleRoot
// ---------------------------------------------------------------------------

/// A group membership root as published by the registry.
///
/// Stored verbatim. Equality is exact string equality: no case folding,
/// no prefix stripping, no numeric normalization. Conversion to a field
/// element happens only when the public-signal vector is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MerkleRoot(String);

impl MerkleRoot {
    /// Validate and wrap a root string.
    ///
    /// Rejects empty strings and strings containing whitespace. Everything
    /// else is accepted as-is; field-range checks belong to signal assembly.
    pub fn new(root: impl Into<String>) -> Result<Self, ValidationError> {
        let root = root.into();
        if root.is_empty() || root.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidRoot(root));
        }
        Ok(Self(root))
    }

    /// Access the root string exactly as published.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for MerkleRoot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        MerkleRoot::new(s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for MerkleRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Fingerprints and record identifiers
// ---------------------------------------------------------------------------

/// SHA-256 over the canonical JSON of a submitted proof.
///
/// The idempotency key of the commit step: at most one submission record
/// exists per fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProofFingerprint(ContentDigest);

impl ProofFingerprint {
    /// Wrap a digest computed over a canonical proof.
    pub fn from_digest(digest: ContentDigest) -> Self {
        Self(digest)
    }

    /// Parse a fingerprint from its 64-character hex form.
    pub fn from_hex(hex: &str) -> Result<Self, ValidationError> {
        ContentDigest::from_hex(hex).map(Self)
    }

    /// The underlying digest.
    pub fn digest(&self) -> &ContentDigest {
        &self.0
    }

    /// Lowercase hex rendering, used as the ledger key.
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl std::fmt::Display for ProofFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ProofFingerprint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ProofFingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ProofFingerprint::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Unique identifier of a persisted submission record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(Uuid);

impl SubmissionId {
    /// Create a new random submission identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a submission identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prop_id_accepts_number_and_string() {
        let a: PropId = serde_json::from_str("7").unwrap();
        let b: PropId = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.value(), 7);
    }

    #[test]
    fn group_type_rejects_non_decimal_string() {
        assert!(serde_json::from_str::<GroupType>("\"0x02\"").is_err());
        assert!(serde_json::from_str::<GroupType>("\"\"").is_err());
        assert!(serde_json::from_str::<GroupType>("-1").is_err());
    }

    #[test]
    fn prop_id_serializes_as_number() {
        assert_eq!(serde_json::to_string(&PropId::new(7)).unwrap(), "7");
    }

    #[test]
    fn merkle_root_is_not_normalized() {
        let lower = MerkleRoot::new("0xabc").unwrap();
        let upper = MerkleRoot::new("0xABC").unwrap();
        assert_ne!(lower, upper);
        assert_eq!(upper.as_str(), "0xABC");
    }

    #[test]
    fn merkle_root_rejects_empty_and_whitespace() {
        assert!(MerkleRoot::new("").is_err());
        assert!(MerkleRoot::new(" 0xabc").is_err());
        assert!(serde_json::from_str::<MerkleRoot>("\"\"").is_err());
    }

    #[test]
    fn fingerprint_serializes_as_hex() {
        let fp = ProofFingerprint::from_hex(&"ab".repeat(32)).unwrap();
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(32)));
        let back: ProofFingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fp);
    }

    #[test]
    fn submission_ids_are_unique() {
        assert_ne!(SubmissionId::new(), SubmissionId::new());
    }
}
