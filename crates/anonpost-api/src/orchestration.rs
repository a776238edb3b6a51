//! # Submission Orchestration
//!
//! [`SubmissionCoordinator`] drives one submission through the pipeline:
//!
//! 1. **Root validation**: [`GroupRootValidator`] looks the group up in the
//!    [`GroupRegistry`] and compares roots byte-for-byte.
//! 2. **Artifact computation**: `(T, U)` recomputed from the signature claim.
//! 3. **Signal assembly**: the BN254 public-input vector in circuit order.
//! 4. **Proof verification**: against the key loaded at startup.
//! 5. **Commit**: the canonical artifact is written to the [`ArtifactStore`],
//!    then the record is inserted into the [`SubmissionLedger`] under the
//!    proof fingerprint.
//!
//! Stages 1–4 have no side effects. The first failure ends the pipeline with
//! a [`RejectionReason`]. Stages 2–4 run on Tokio's blocking pool.
//!
//! ## Commit Semantics
//!
//! The commit runs in a detached task under a per-fingerprint async lock,
//! so a caller that drops its future cannot interrupt a commit halfway and
//! concurrent duplicates serialize. When the artifact is stored but the
//! record insert fails the caller receives
//! [`SubmissionError::PartialCommit`] with the orphaned address;
//! [`SubmissionCoordinator::complete_commit`] finishes the record insert from
//! the stored artifact alone, without re-running verification.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use anonpost_core::{
    sha256_digest, CanonicalBytes, CanonicalizationError, ContentDigest, Group, GroupType,
    MerkleRoot, NewSubmissionRecord, PropId, ProofFingerprint, Submission, SubmissionId,
    SubmissionRecord,
};
use anonpost_crypto::{ArtifactPoint, ArtifactTable, CryptoError, SignatureArtifacts};
use anonpost_state::{RejectionReason, SubmissionLifecycle, SubmissionState};
use anonpost_zkp::signals::assemble;
use anonpost_zkp::ProofVerifier;

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Failure of an external collaborator. Never a rejection: these surface
/// as internal errors or, after the artifact is stored, as partial commits.
#[derive(Error, Debug)]
pub enum CollaboratorError {
    /// Postgres query or connection failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Content store I/O or integrity failure.
    #[error("content store error: {0}")]
    ContentStore(#[from] CryptoError),

    /// A stored artifact does not decode as a submission artifact.
    #[error("stored artifact is malformed: {0}")]
    Malformed(String),

    /// A blocking task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(String),

    /// The collaborator is not reachable.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
}

/// Read-only access to published groups.
pub trait GroupRegistry: Send + Sync + 'static {
    /// The group published for `(prop_id, group_type)`, if any.
    fn find_group(
        &self,
        prop_id: PropId,
        group_type: GroupType,
    ) -> impl Future<Output = Result<Option<Group>, CollaboratorError>> + Send;
}

/// Content-addressed storage for committed artifacts.
pub trait ArtifactStore: Send + Sync + 'static {
    /// Store the artifact, returning its hex address. Idempotent.
    fn put(
        &self,
        artifact: &SubmissionArtifact,
    ) -> impl Future<Output = Result<String, CollaboratorError>> + Send;

    /// Read an artifact back, integrity-checked.
    fn get(
        &self,
        address: &ContentDigest,
    ) -> impl Future<Output = Result<Option<SubmissionArtifact>, CollaboratorError>> + Send;
}

/// Durable submission records, unique by fingerprint.
pub trait SubmissionLedger: Send + Sync + 'static {
    /// Insert the record unless one exists for its fingerprint. Returns the
    /// stored record and whether this call created it.
    fn insert_or_get(
        &self,
        new: NewSubmissionRecord,
    ) -> impl Future<Output = Result<(SubmissionRecord, bool), CollaboratorError>> + Send;

    /// Look a record up by fingerprint.
    fn find_by_fingerprint(
        &self,
        fingerprint: &ProofFingerprint,
    ) -> impl Future<Output = Result<Option<SubmissionRecord>, CollaboratorError>> + Send;
}

// ---------------------------------------------------------------------------
// Submission artifact
// ---------------------------------------------------------------------------

/// What the content store holds for a committed submission.
///
/// Self-contained: recovery recomputes the fingerprint from `proof` and
/// resolves the group from `(propId, groupType)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionArtifact {
    /// The submitted proof, verbatim.
    pub proof: serde_json::Value,
    /// The comment body.
    pub comment_msg: String,
    /// Proposal identifier.
    pub prop_id: PropId,
    /// Group type identifier.
    pub group_type: GroupType,
    /// The window table the proof was verified against.
    #[serde(rename = "T")]
    pub t: ArtifactTable,
    /// The `U` point the proof was verified against.
    #[serde(rename = "U")]
    pub u: ArtifactPoint,
}

/// SHA-256 of the canonical JSON of a proof. Key order in the submitted
/// object does not affect the result.
pub fn proof_fingerprint(
    proof: &serde_json::Value,
) -> Result<ProofFingerprint, CanonicalizationError> {
    let canonical = CanonicalBytes::new(proof)?;
    Ok(ProofFingerprint::from_digest(sha256_digest(&canonical)))
}

// ---------------------------------------------------------------------------
// GroupRootValidator
// ---------------------------------------------------------------------------

/// Root validation failure.
#[derive(Error, Debug)]
pub enum RootError {
    /// Nothing is published for the pair.
    #[error("no group is published for propId {prop_id}, groupType {group_type}")]
    GroupNotFound {
        /// Requested proposal.
        prop_id: PropId,
        /// Requested group type.
        group_type: GroupType,
    },

    /// The claimed root is not the published one.
    #[error("claimed root {claimed} does not match the published root {published}")]
    RootMismatch {
        /// Root from the submission.
        claimed: MerkleRoot,
        /// Root from the registry.
        published: MerkleRoot,
    },

    /// The registry could not be queried.
    #[error(transparent)]
    Registry(#[from] CollaboratorError),
}

/// Checks a claimed root against the registry.
#[derive(Debug)]
pub struct GroupRootValidator<'a, R> {
    registry: &'a R,
}

impl<'a, R: GroupRegistry> GroupRootValidator<'a, R> {
    /// Validate against `registry`.
    pub fn new(registry: &'a R) -> Self {
        Self { registry }
    }

    /// Return the group for `(prop_id, group_type)` if its root equals
    /// `root` exactly.
    pub async fn validate(
        &self,
        root: &MerkleRoot,
        prop_id: PropId,
        group_type: GroupType,
    ) -> Result<Group, RootError> {
        let group = self
            .registry
            .find_group(prop_id, group_type)
            .await?
            .ok_or(RootError::GroupNotFound {
                prop_id,
                group_type,
            })?;
        if group.root.as_str() != root.as_str() {
            return Err(RootError::RootMismatch {
                claimed: root.clone(),
                published: group.root,
            });
        }
        Ok(group)
    }
}

// ---------------------------------------------------------------------------
// Outcome and errors
// ---------------------------------------------------------------------------

/// A committed submission.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    /// The ledger record.
    pub record: SubmissionRecord,
    /// False when the fingerprint was already committed and the existing
    /// record was returned.
    pub created: bool,
}

/// Why a submission did not reach `COMMITTED`.
#[derive(Error, Debug)]
pub enum SubmissionError {
    /// Terminal rejection. Nothing was stored.
    #[error("{reason}: {detail}")]
    Rejected {
        /// Rejection reason.
        reason: RejectionReason,
        /// Human-readable explanation.
        detail: String,
    },

    /// The commit failed before anything was stored.
    #[error("commit failed, nothing stored: {0}")]
    PersistenceFailure(String),

    /// The artifact is stored but the record is not.
    #[error("artifact {address} stored but no record written for {fingerprint}")]
    PartialCommit {
        /// Address of the orphaned artifact.
        address: String,
        /// Fingerprint the record should carry.
        fingerprint: ProofFingerprint,
    },

    /// A recovery address is not a hex digest.
    #[error("invalid artifact address: {0}")]
    InvalidAddress(String),

    /// Nothing is stored at a recovery address.
    #[error("no artifact stored at {0}")]
    ArtifactNotFound(String),

    /// A stored artifact failed its integrity check or does not decode.
    #[error("stored artifact is unusable: {0}")]
    CorruptArtifact(String),

    /// Collaborator outage or task failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SubmissionError {
    /// The rejection reason, for rejections.
    pub fn rejection(&self) -> Option<RejectionReason> {
        match self {
            Self::Rejected { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

enum CommitFailure {
    Lookup(CollaboratorError),
    Store(CollaboratorError),
    Ledger {
        address: String,
        source: CollaboratorError,
    },
}

// ---------------------------------------------------------------------------
// Lifecycle tracking
// ---------------------------------------------------------------------------

fn record_outcome(outcome: &'static str) {
    metrics::counter!("anonpost_submissions_total", "outcome" => outcome).increment(1);
}

struct Tracker {
    lifecycle: SubmissionLifecycle,
}

impl Tracker {
    fn new(lifecycle: SubmissionLifecycle) -> Self {
        tracing::debug!(
            submission_id = %lifecycle.id(),
            state = %lifecycle.state(),
            "submission lifecycle started"
        );
        Self { lifecycle }
    }

    fn advance(&mut self) -> Result<SubmissionState, SubmissionError> {
        let from = self.lifecycle.state();
        let to = self
            .lifecycle
            .advance()
            .map_err(|e| SubmissionError::Internal(e.to_string()))?;
        tracing::debug!(submission_id = %self.lifecycle.id(), %from, %to, "stage passed");
        Ok(to)
    }

    fn reject(&mut self, reason: RejectionReason, detail: impl Into<String>) -> SubmissionError {
        let detail = detail.into();
        if let Err(e) = self.lifecycle.reject(reason) {
            return SubmissionError::Internal(e.to_string());
        }
        tracing::info!(
            submission_id = %self.lifecycle.id(),
            stage = %reason.stage(),
            %reason,
            %detail,
            "submission rejected"
        );
        record_outcome(reason.as_str());
        SubmissionError::Rejected { reason, detail }
    }

    fn partial(
        &mut self,
        address: String,
        fingerprint: ProofFingerprint,
        source: &CollaboratorError,
    ) -> SubmissionError {
        if let Err(e) = self.lifecycle.mark_partial_commit() {
            return SubmissionError::Internal(e.to_string());
        }
        tracing::error!(
            submission_id = %self.lifecycle.id(),
            %fingerprint,
            artifact_address = %address,
            error = %source,
            "artifact stored but record insert failed"
        );
        record_outcome("PARTIAL_COMMIT");
        SubmissionError::PartialCommit {
            address,
            fingerprint,
        }
    }

    fn complete_recovery(&mut self) -> Result<(), SubmissionError> {
        self.lifecycle
            .complete_recovery()
            .map_err(|e| SubmissionError::Internal(e.to_string()))
    }

    fn id(&self) -> SubmissionId {
        self.lifecycle.id()
    }
}

async fn blocking<T, F>(f: F) -> Result<T, SubmissionError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| SubmissionError::Internal(format!("blocking task failed: {e}")))
}

// ---------------------------------------------------------------------------
// SubmissionCoordinator
// ---------------------------------------------------------------------------

/// Runs submissions through validation, verification, and commit.
pub struct SubmissionCoordinator<R, S, L> {
    registry: Arc<R>,
    store: Arc<S>,
    ledger: Arc<L>,
    verifier: Arc<ProofVerifier>,
    commit_locks: Arc<DashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl<R, S, L> Clone for SubmissionCoordinator<R, S, L> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            store: Arc::clone(&self.store),
            ledger: Arc::clone(&self.ledger),
            verifier: Arc::clone(&self.verifier),
            commit_locks: Arc::clone(&self.commit_locks),
        }
    }
}

impl<R, S, L> std::fmt::Debug for SubmissionCoordinator<R, S, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionCoordinator")
            .field("verifier", &self.verifier.backend_name())
            .field("commits_in_flight", &self.commit_locks.len())
            .finish()
    }
}

impl<R, S, L> SubmissionCoordinator<R, S, L>
where
    R: GroupRegistry,
    S: ArtifactStore,
    L: SubmissionLedger,
{
    /// Assemble a coordinator from its collaborators.
    pub fn new(registry: R, store: S, ledger: L, verifier: ProofVerifier) -> Self {
        Self {
            registry: Arc::new(registry),
            store: Arc::new(store),
            ledger: Arc::new(ledger),
            verifier: Arc::new(verifier),
            commit_locks: Arc::new(DashMap::new()),
        }
    }

    /// The group registry.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// The artifact store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The submission ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// The proof verifier.
    pub fn verifier(&self) -> &ProofVerifier {
        &self.verifier
    }

    /// Look up a committed submission.
    pub async fn find_record(
        &self,
        fingerprint: &ProofFingerprint,
    ) -> Result<Option<SubmissionRecord>, CollaboratorError> {
        self.ledger.find_by_fingerprint(fingerprint).await
    }

    /// Run a submission through the full pipeline.
    #[tracing::instrument(
        name = "submission",
        skip_all,
        fields(prop_id = %submission.prop_id(), group_type = %submission.group_type())
    )]
    pub async fn submit(&self, submission: Submission) -> Result<SubmissionOutcome, SubmissionError> {
        let mut tracker = Tracker::new(SubmissionLifecycle::new(SubmissionId::new()));
        let prop_id = submission.prop_id();
        let group_type = submission.group_type();

        // RECEIVED -> ROOT_VALIDATED
        let validator = GroupRootValidator::new(self.registry.as_ref());
        let group = match validator.validate(&submission.root, prop_id, group_type).await {
            Ok(group) => group,
            Err(e @ RootError::GroupNotFound { .. }) => {
                return Err(tracker.reject(RejectionReason::GroupNotFound, e.to_string()))
            }
            Err(e @ RootError::RootMismatch { .. }) => {
                return Err(tracker.reject(RejectionReason::RootMismatch, e.to_string()))
            }
            Err(RootError::Registry(e)) => {
                tracing::error!(submission_id = %tracker.id(), error = %e, "group registry lookup failed");
                record_outcome("INTERNAL");
                return Err(SubmissionError::Internal(format!(
                    "group registry lookup failed: {e}"
                )));
            }
        };
        tracker.advance()?;

        // ROOT_VALIDATED -> ARTIFACTS_COMPUTED
        let claim = submission.public_signature_data.clone();
        let artifacts = match blocking(move || SignatureArtifacts::from_claim(&claim)).await? {
            Ok(artifacts) => artifacts,
            Err(e) => {
                return Err(tracker.reject(RejectionReason::ArtifactComputationError, e.to_string()))
            }
        };
        tracker.advance()?;

        // ARTIFACTS_COMPUTED -> SIGNALS_ASSEMBLED
        let root = submission.root.clone();
        let (t, u, assembled) = blocking(move || {
            let t = artifacts.table_strings();
            let u = artifacts.u_strings();
            let signals = assemble(&root, prop_id, group_type, &t, &u);
            (t, u, signals)
        })
        .await?;
        let signals = match assembled {
            Ok(signals) => signals,
            Err(e) => return Err(tracker.reject(RejectionReason::SerializationError, e.to_string())),
        };
        tracker.advance()?;

        // SIGNALS_ASSEMBLED -> PROOF_VERIFIED
        let verifier = Arc::clone(&self.verifier);
        let proof = submission.proof.clone();
        let valid = blocking(move || {
            let started = Instant::now();
            let valid = verifier.verify(&signals, &proof);
            metrics::histogram!("anonpost_verification_seconds")
                .record(started.elapsed().as_secs_f64());
            valid
        })
        .await?;
        if !valid {
            return Err(tracker.reject(
                RejectionReason::ProofInvalid,
                "proof does not verify against the assembled public signals",
            ));
        }
        tracker.advance()?;

        // PROOF_VERIFIED -> COMMITTED
        let fingerprint = proof_fingerprint(&submission.proof).map_err(|e| {
            record_outcome("PERSISTENCE_FAILURE");
            SubmissionError::PersistenceFailure(format!("cannot fingerprint proof: {e}"))
        })?;
        let artifact = SubmissionArtifact {
            proof: submission.proof,
            comment_msg: submission.comment_msg,
            prop_id,
            group_type,
            t,
            u,
        };

        let this = self.clone();
        let key = fingerprint.clone();
        let committed = tokio::spawn(async move { this.commit(artifact, group, key).await }).await;

        match committed {
            Ok(Ok((record, created))) => {
                tracker.advance()?;
                tracing::info!(
                    submission_id = %tracker.id(),
                    %fingerprint,
                    record_id = %record.id,
                    artifact_address = %record.artifact_address,
                    created,
                    "submission committed"
                );
                record_outcome(if created { "COMMITTED" } else { "DUPLICATE" });
                Ok(SubmissionOutcome { record, created })
            }
            Ok(Err(CommitFailure::Lookup(e))) => {
                tracing::error!(submission_id = %tracker.id(), %fingerprint, error = %e, "ledger lookup failed");
                record_outcome("PERSISTENCE_FAILURE");
                Err(SubmissionError::PersistenceFailure(e.to_string()))
            }
            Ok(Err(CommitFailure::Store(e))) => {
                tracing::error!(submission_id = %tracker.id(), %fingerprint, error = %e, "artifact store write failed");
                record_outcome("PERSISTENCE_FAILURE");
                Err(SubmissionError::PersistenceFailure(e.to_string()))
            }
            Ok(Err(CommitFailure::Ledger { address, source })) => {
                Err(tracker.partial(address, fingerprint, &source))
            }
            Err(e) => Err(SubmissionError::Internal(format!("commit task failed: {e}"))),
        }
    }

    /// Finish a partial commit from the artifact stored at `address`.
    ///
    /// Reads the artifact back, recomputes its fingerprint, resolves the
    /// group, and inserts the record. The proof is not verified again.
    #[tracing::instrument(name = "recovery", skip(self))]
    pub async fn complete_commit(&self, address: &str) -> Result<SubmissionOutcome, SubmissionError> {
        let digest = ContentDigest::from_hex(address)
            .map_err(|e| SubmissionError::InvalidAddress(e.to_string()))?;
        let mut tracker = Tracker::new(SubmissionLifecycle::resume_partial(SubmissionId::new()));

        let artifact = match self.store.get(&digest).await {
            Ok(Some(artifact)) => artifact,
            Ok(None) => return Err(SubmissionError::ArtifactNotFound(digest.to_hex())),
            Err(CollaboratorError::ContentStore(CryptoError::Cas(msg)))
            | Err(CollaboratorError::Malformed(msg)) => {
                tracing::warn!(artifact_address = %digest, error = %msg, "stored artifact rejected");
                return Err(SubmissionError::CorruptArtifact(msg));
            }
            Err(e) => return Err(SubmissionError::Internal(format!("artifact read failed: {e}"))),
        };

        let fingerprint = proof_fingerprint(&artifact.proof)
            .map_err(|e| SubmissionError::CorruptArtifact(format!("cannot fingerprint proof: {e}")))?;
        let group = match self
            .registry
            .find_group(artifact.prop_id, artifact.group_type)
            .await
        {
            Ok(Some(group)) => group,
            Ok(None) => {
                return Err(SubmissionError::Internal(format!(
                    "no group is published for propId {}, groupType {}",
                    artifact.prop_id, artifact.group_type
                )))
            }
            Err(e) => {
                return Err(SubmissionError::Internal(format!(
                    "group registry lookup failed: {e}"
                )))
            }
        };

        let new = NewSubmissionRecord {
            fingerprint: fingerprint.clone(),
            artifact_address: digest.to_hex(),
            comment_msg: artifact.comment_msg,
            group_id: group.id,
            prop_id: artifact.prop_id,
            group_type: artifact.group_type,
        };
        let this = self.clone();
        let key = fingerprint.clone();
        let inserted = tokio::spawn(async move {
            this.locked(&key, this.ledger.insert_or_get(new)).await
        })
        .await;

        match inserted {
            Ok(Ok((record, created))) => {
                tracker.complete_recovery()?;
                tracing::info!(
                    submission_id = %tracker.id(),
                    %fingerprint,
                    record_id = %record.id,
                    created,
                    "partial commit recovered"
                );
                record_outcome(if created { "RECOVERED" } else { "DUPLICATE" });
                Ok(SubmissionOutcome { record, created })
            }
            Ok(Err(e)) => {
                tracing::error!(%fingerprint, artifact_address = %digest, error = %e, "recovery insert failed");
                record_outcome("PARTIAL_COMMIT");
                Err(SubmissionError::PartialCommit {
                    address: digest.to_hex(),
                    fingerprint,
                })
            }
            Err(e) => Err(SubmissionError::Internal(format!("recovery task failed: {e}"))),
        }
    }

    async fn commit(
        &self,
        artifact: SubmissionArtifact,
        group: Group,
        fingerprint: ProofFingerprint,
    ) -> Result<(SubmissionRecord, bool), CommitFailure> {
        self.locked(&fingerprint, async {
            // A fingerprint that is already recorded writes nothing new.
            if let Some(existing) = self
                .ledger
                .find_by_fingerprint(&fingerprint)
                .await
                .map_err(CommitFailure::Lookup)?
            {
                return Ok((existing, false));
            }
            let address = self
                .store
                .put(&artifact)
                .await
                .map_err(CommitFailure::Store)?;
            let new = NewSubmissionRecord {
                fingerprint: fingerprint.clone(),
                artifact_address: address.clone(),
                comment_msg: artifact.comment_msg.clone(),
                group_id: group.id,
                prop_id: artifact.prop_id,
                group_type: artifact.group_type,
            };
            self.ledger
                .insert_or_get(new)
                .await
                .map_err(|source| CommitFailure::Ledger { address, source })
        })
        .await
    }

    /// Run `op` while holding the commit lock for `fingerprint`.
    async fn locked<T>(&self, fingerprint: &ProofFingerprint, op: impl Future<Output = T>) -> T {
        let key = fingerprint.to_hex();
        let lock = Arc::clone(self.commit_locks.entry(key.clone()).or_default().value());
        let out = {
            let _guard = lock.lock().await;
            op.await
        };
        drop(lock);
        self.commit_locks
            .remove_if(&key, |_, lock| Arc::strong_count(lock) == 1);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anonpost_core::GroupId;
    use serde_json::json;
    use std::collections::HashMap;

    struct FixedRegistry(HashMap<(PropId, GroupType), Group>);

    impl GroupRegistry for FixedRegistry {
        fn find_group(
            &self,
            prop_id: PropId,
            group_type: GroupType,
        ) -> impl Future<Output = Result<Option<Group>, CollaboratorError>> + Send {
            let found = self.0.get(&(prop_id, group_type)).cloned();
            async move { Ok(found) }
        }
    }

    struct DownRegistry;

    impl GroupRegistry for DownRegistry {
        fn find_group(
            &self,
            _prop_id: PropId,
            _group_type: GroupType,
        ) -> impl Future<Output = Result<Option<Group>, CollaboratorError>> + Send {
            async { Err(CollaboratorError::Unavailable("registry offline".into())) }
        }
    }

    fn registry() -> FixedRegistry {
        let group = Group {
            id: GroupId::new(1),
            prop_id: PropId::new(7),
            type_id: GroupType::new(2),
            root: MerkleRoot::new("0xabc").unwrap(),
        };
        FixedRegistry(HashMap::from([((PropId::new(7), GroupType::new(2)), group)]))
    }

    fn root(s: &str) -> MerkleRoot {
        MerkleRoot::new(s).unwrap()
    }

    #[tokio::test]
    async fn matching_root_returns_group() {
        let registry = registry();
        let group = GroupRootValidator::new(&registry)
            .validate(&root("0xabc"), PropId::new(7), GroupType::new(2))
            .await
            .unwrap();
        assert_eq!(group.id, GroupId::new(1));
    }

    #[tokio::test]
    async fn root_comparison_is_exact() {
        let registry = registry();
        let validator = GroupRootValidator::new(&registry);
        for claimed in ["0xdef", "0xABC", "abc", "2748"] {
            let err = validator
                .validate(&root(claimed), PropId::new(7), GroupType::new(2))
                .await
                .unwrap_err();
            assert!(matches!(err, RootError::RootMismatch { .. }), "{claimed}");
        }
    }

    #[tokio::test]
    async fn unknown_pair_is_group_not_found() {
        let registry = registry();
        let err = GroupRootValidator::new(&registry)
            .validate(&root("0xabc"), PropId::new(7), GroupType::new(3))
            .await
            .unwrap_err();
        assert!(matches!(err, RootError::GroupNotFound { .. }));
    }

    #[tokio::test]
    async fn registry_outage_is_not_a_rejection() {
        let err = GroupRootValidator::new(&DownRegistry)
            .validate(&root("0xabc"), PropId::new(7), GroupType::new(2))
            .await
            .unwrap_err();
        assert!(matches!(err, RootError::Registry(_)));
    }

    #[test]
    fn fingerprint_ignores_key_order() {
        let a = json!({"pi_a": ["1", "2", "1"], "protocol": "groth16"});
        let b = json!({"protocol": "groth16", "pi_a": ["1", "2", "1"]});
        assert_eq!(proof_fingerprint(&a).unwrap(), proof_fingerprint(&b).unwrap());
        let c = json!({"protocol": "groth16", "pi_a": ["1", "3", "1"]});
        assert_ne!(proof_fingerprint(&a).unwrap(), proof_fingerprint(&c).unwrap());
    }

    #[test]
    fn fingerprint_rejects_floats() {
        assert!(proof_fingerprint(&json!({"pi_a": [1.5]})).is_err());
    }

    #[test]
    fn artifact_wire_names() {
        let artifact = SubmissionArtifact {
            proof: json!({"protocol": "mock"}),
            comment_msg: "hi".into(),
            prop_id: PropId::new(7),
            group_type: GroupType::new(2),
            t: vec![],
            u: Default::default(),
        };
        let value = serde_json::to_value(&artifact).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        for key in ["proof", "commentMsg", "propId", "groupType", "T", "U"] {
            assert!(keys.contains(&key), "missing {key}");
        }
        assert_eq!(value["propId"], json!(7));
        let back: SubmissionArtifact = serde_json::from_value(value).unwrap();
        assert_eq!(back, artifact);
    }

    #[test]
    fn only_rejections_carry_a_reason() {
        let rejected = SubmissionError::Rejected {
            reason: RejectionReason::RootMismatch,
            detail: String::new(),
        };
        assert_eq!(rejected.rejection(), Some(RejectionReason::RootMismatch));
        assert_eq!(SubmissionError::Internal("x".into()).rejection(), None);
    }
}
