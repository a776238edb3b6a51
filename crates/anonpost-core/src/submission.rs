//! # Submission Data Model
//!
//! The wire and storage shapes for groups, inbound submissions, and
//! committed submission records. Field names serialize in camelCase to
//! match the payloads produced by the browser client.
//!
//! Nothing in an inbound [`Submission`] is trusted until the pipeline has
//! validated the root, recomputed the signature artifacts, and verified the
//! proof against them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identity::{GroupId, GroupType, MerkleRoot, PropId, ProofFingerprint, SubmissionId};

/// Maximum accepted comment body, in bytes.
pub const MAX_COMMENT_BYTES: usize = 4096;

/// A published group: the membership root for one `(propId, groupType)`.
///
/// Owned by the external registry. Read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Registry row identifier.
    pub id: GroupId,
    /// Proposal the group was snapshotted for.
    pub prop_id: PropId,
    /// Group kind.
    pub type_id: GroupType,
    /// Published membership root.
    pub root: MerkleRoot,
}

/// The typed value the submitter signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eip712Value {
    /// Proposal identifier.
    pub prop_id: PropId,
    /// Group type identifier.
    pub group_type: GroupType,
}

/// The public half of the submitter's signature.
///
/// Only `r` and the parity of `R.y` are revealed; `s` stays private inside
/// the proof. `message` is the hex encoding of the exact bytes whose
/// keccak-256 digest was signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureClaim {
    /// Hex x-coordinate of the signature nonce point.
    pub r: String,
    /// Whether the nonce point's y-coordinate is odd.
    #[serde(rename = "isRYOdd", alias = "isROdd")]
    pub is_ry_odd: bool,
    /// Hex-encoded signed message bytes.
    pub message: String,
    /// The typed value the message encodes.
    pub eip712_value: Eip712Value,
}

/// An inbound comment submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Claimed group membership root.
    pub root: MerkleRoot,
    /// Opaque proof object from the external prover.
    pub proof: serde_json::Value,
    /// The comment body.
    pub comment_msg: String,
    /// Public signature components bound into the proof.
    pub public_signature_data: SignatureClaim,
}

impl Submission {
    /// Proposal the submission targets.
    pub fn prop_id(&self) -> PropId {
        self.public_signature_data.eip712_value.prop_id
    }

    /// Group type the submission claims membership in.
    pub fn group_type(&self) -> GroupType {
        self.public_signature_data.eip712_value.group_type
    }

    /// Check request-shape rules that serde alone does not enforce.
    pub fn validate_shape(&self) -> Result<(), ValidationError> {
        let len = self.comment_msg.len();
        if len > MAX_COMMENT_BYTES {
            return Err(ValidationError::CommentTooLong {
                len,
                max: MAX_COMMENT_BYTES,
            });
        }
        Ok(())
    }
}

/// Fields of a submission record prior to insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmissionRecord {
    /// Idempotency key.
    pub fingerprint: ProofFingerprint,
    /// Content-store address of the committed artifact (hex digest).
    pub artifact_address: String,
    /// The comment body.
    pub comment_msg: String,
    /// Group the proof was verified against.
    pub group_id: GroupId,
    /// Proposal identifier.
    pub prop_id: PropId,
    /// Group type identifier.
    pub group_type: GroupType,
}

/// A committed submission. Created once per fingerprint, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    /// Record identifier.
    pub id: SubmissionId,
    /// Idempotency key.
    pub fingerprint: ProofFingerprint,
    /// Content-store address of the committed artifact (hex digest).
    pub artifact_address: String,
    /// The comment body.
    pub comment_msg: String,
    /// Group the proof was verified against.
    pub group_id: GroupId,
    /// Proposal identifier.
    pub prop_id: PropId,
    /// Group type identifier.
    pub group_type: GroupType,
    /// When the record was first committed.
    pub created_at: DateTime<Utc>,
}

impl SubmissionRecord {
    /// Materialize a record from its insertion fields.
    pub fn from_new(new: NewSubmissionRecord, id: SubmissionId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            fingerprint: new.fingerprint,
            artifact_address: new.artifact_address,
            comment_msg: new.comment_msg,
            group_id: new.group_id,
            prop_id: new.prop_id,
            group_type: new.group_type,
            created_at,
        }
    }
}
