//! # Submission State Machine
//!
//! Tracks one submission through the verification pipeline. Transitions
//! are validated at runtime and every accepted transition is appended to
//! an in-memory log that the coordinator emits as structured events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use anonpost_core::SubmissionId;

// ── Submission State ─────────────────────────────────────────────────

/// Pipeline stages (5 forward + 3 terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionState {
    /// Payload accepted for processing.
    Received,
    /// Claimed root matches the registry.
    RootValidated,
    /// `(T, U)` recomputed from the signature claim.
    ArtifactsComputed,
    /// Public signal vector assembled.
    SignalsAssembled,
    /// Proof checked against the signals.
    ProofVerified,
    /// Artifact stored and record written. Terminal.
    Committed,
    /// Pipeline stopped with a reason. Terminal.
    Rejected,
    /// Artifact stored, record not written. Terminal for the pipeline;
    /// recovery resumes from here.
    PartialCommit,
}

impl SubmissionState {
    /// Whether the pipeline can make no further progress.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed | Self::Rejected | Self::PartialCommit)
    }

    /// The canonical string name of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "RECEIVED",
            Self::RootValidated => "ROOT_VALIDATED",
            Self::ArtifactsComputed => "ARTIFACTS_COMPUTED",
            Self::SignalsAssembled => "SIGNALS_ASSEMBLED",
            Self::ProofVerified => "PROOF_VERIFIED",
            Self::Committed => "COMMITTED",
            Self::Rejected => "REJECTED",
            Self::PartialCommit => "PARTIAL_COMMIT",
        }
    }

    fn next_forward_phase(&self) -> Option<SubmissionState> {
        match self {
            Self::Received => Some(Self::RootValidated),
            Self::RootValidated => Some(Self::ArtifactsComputed),
            Self::ArtifactsComputed => Some(Self::SignalsAssembled),
            Self::SignalsAssembled => Some(Self::ProofVerified),
            Self::ProofVerified => Some(Self::Committed),
            Self::Committed | Self::Rejected | Self::PartialCommit => None,
        }
    }
}

impl std::fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Rejection Reason ─────────────────────────────────────────────────

/// Why a submission was rejected. Every reason is terminal and leaves no
/// side effects behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    /// No group is published for `(propId, groupType)`.
    GroupNotFound,
    /// The claimed root differs from the published one.
    RootMismatch,
    /// `(T, U)` could not be derived from the signature claim.
    ArtifactComputationError,
    /// A public signal could not be encoded as a field element.
    SerializationError,
    /// The proof does not verify against the assembled signals.
    ProofInvalid,
}

impl RejectionReason {
    /// The canonical string name of this reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GroupNotFound => "GROUP_NOT_FOUND",
            Self::RootMismatch => "ROOT_MISMATCH",
            Self::ArtifactComputationError => "ARTIFACT_COMPUTATION_ERROR",
            Self::SerializationError => "SERIALIZATION_ERROR",
            Self::ProofInvalid => "PROOF_INVALID",
        }
    }

    /// The stage at which this rejection can occur.
    pub fn stage(&self) -> SubmissionState {
        match self {
            Self::GroupNotFound | Self::RootMismatch => SubmissionState::Received,
            Self::ArtifactComputationError => SubmissionState::RootValidated,
            Self::SerializationError => SubmissionState::ArtifactsComputed,
            Self::ProofInvalid => SubmissionState::SignalsAssembled,
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Error Types ──────────────────────────────────────────────────────

/// Errors during lifecycle transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// The requested transition is not allowed from the current state.
    #[error("invalid submission transition from {from} to {to}: {reason}")]
    InvalidTransition {
        /// Current state.
        from: SubmissionState,
        /// Attempted target state.
        to: SubmissionState,
        /// Human-readable reason for the rejection.
        reason: String,
    },
    /// The submission is already in a terminal state.
    #[error("submission {id} is in terminal state {state}")]
    AlreadyTerminal {
        /// The submission identifier.
        id: SubmissionId,
        /// The terminal state.
        state: SubmissionState,
    },
}

// ── Transition Record ────────────────────────────────────────────────

/// One accepted transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// State before.
    pub from: SubmissionState,
    /// State after.
    pub to: SubmissionState,
    /// Rejection reason, for transitions into `REJECTED`.
    pub reason: Option<RejectionReason>,
    /// When the transition happened.
    pub at: DateTime<Utc>,
}

// ── Submission Lifecycle ─────────────────────────────────────────────

/// The lifecycle of one submission.
#[derive(Debug, Clone)]
pub struct SubmissionLifecycle {
    id: SubmissionId,
    state: SubmissionState,
    rejection: Option<RejectionReason>,
    created_at: DateTime<Utc>,
    transitions: Vec<TransitionRecord>,
    recovering: bool,
}

impl SubmissionLifecycle {
    /// Start a new lifecycle in `RECEIVED`.
    pub fn new(id: SubmissionId) -> Self {
        Self {
            id,
            state: SubmissionState::Received,
            rejection: None,
            created_at: Utc::now(),
            transitions: Vec::new(),
            recovering: false,
        }
    }

    /// Start a recovery lifecycle in `PARTIAL_COMMIT`. Its only legal
    /// move is [`complete_recovery`](Self::complete_recovery).
    pub fn resume_partial(id: SubmissionId) -> Self {
        Self {
            state: SubmissionState::PartialCommit,
            recovering: true,
            ..Self::new(id)
        }
    }

    /// Submission identifier.
    pub fn id(&self) -> SubmissionId {
        self.id
    }

    /// Current state.
    pub fn state(&self) -> SubmissionState {
        self.state
    }

    /// Rejection reason, once rejected.
    pub fn rejection(&self) -> Option<RejectionReason> {
        self.rejection
    }

    /// When the lifecycle started.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Accepted transitions, oldest first.
    pub fn history(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    fn ensure_live(&self) -> Result<(), TransitionError> {
        if self.state.is_terminal() {
            return Err(TransitionError::AlreadyTerminal {
                id: self.id,
                state: self.state,
            });
        }
        Ok(())
    }

    fn record(&mut self, to: SubmissionState, reason: Option<RejectionReason>) {
        self.transitions.push(TransitionRecord {
            from: self.state,
            to,
            reason,
            at: Utc::now(),
        });
        self.state = to;
    }

    /// Advance to the next forward stage.
    pub fn advance(&mut self) -> Result<SubmissionState, TransitionError> {
        self.ensure_live()?;
        let next = self
            .state
            .next_forward_phase()
            .ok_or_else(|| TransitionError::InvalidTransition {
                from: self.state,
                to: self.state,
                reason: "no forward phase from current state".to_string(),
            })?;
        self.record(next, None);
        Ok(next)
    }

    /// Reject at the current stage.
    ///
    /// The reason must belong to the current stage: a root mismatch cannot
    /// be reported after the proof has been checked.
    pub fn reject(&mut self, reason: RejectionReason) -> Result<(), TransitionError> {
        self.ensure_live()?;
        if reason.stage() != self.state {
            return Err(TransitionError::InvalidTransition {
                from: self.state,
                to: SubmissionState::Rejected,
                reason: format!("{reason} is raised at {}, not here", reason.stage()),
            });
        }
        self.rejection = Some(reason);
        self.record(SubmissionState::Rejected, Some(reason));
        Ok(())
    }

    /// Artifact stored but record not written.
    pub fn mark_partial_commit(&mut self) -> Result<(), TransitionError> {
        self.ensure_live()?;
        if self.state != SubmissionState::ProofVerified {
            return Err(TransitionError::InvalidTransition {
                from: self.state,
                to: SubmissionState::PartialCommit,
                reason: "partial commit only follows PROOF_VERIFIED".to_string(),
            });
        }
        self.record(SubmissionState::PartialCommit, None);
        Ok(())
    }

    /// Finish a recovery lifecycle by writing the record.
    pub fn complete_recovery(&mut self) -> Result<(), TransitionError> {
        if !self.recovering || self.state != SubmissionState::PartialCommit {
            return Err(TransitionError::InvalidTransition {
                from: self.state,
                to: SubmissionState::Committed,
                reason: "only a resumed partial commit can be recovered".to_string(),
            });
        }
        self.record(SubmissionState::Committed, None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lifecycle() -> SubmissionLifecycle {
        SubmissionLifecycle::new(SubmissionId::new())
    }

    #[test]
    fn new_lifecycle_is_received() {
        let l = lifecycle();
        assert_eq!(l.state(), SubmissionState::Received);
        assert!(!l.state().is_terminal());
        assert!(l.history().is_empty());
    }

    #[test]
    fn advance_through_all_stages() {
        let mut l = lifecycle();
        assert_eq!(l.advance().unwrap(), SubmissionState::RootValidated);
        assert_eq!(l.advance().unwrap(), SubmissionState::ArtifactsComputed);
        assert_eq!(l.advance().unwrap(), SubmissionState::SignalsAssembled);
        assert_eq!(l.advance().unwrap(), SubmissionState::ProofVerified);
        assert_eq!(l.advance().unwrap(), SubmissionState::Committed);
        assert!(l.state().is_terminal());
        assert_eq!(l.history().len(), 5);
        assert_eq!(l.history()[0].from, SubmissionState::Received);
        assert_eq!(l.history()[4].to, SubmissionState::Committed);
    }

    #[test]
    fn advance_from_terminal_fails() {
        let mut l = lifecycle();
        for _ in 0..5 {
            l.advance().unwrap();
        }
        assert!(matches!(
            l.advance(),
            Err(TransitionError::AlreadyTerminal {
                state: SubmissionState::Committed,
                ..
            })
        ));
    }

    #[test]
    fn reject_at_matching_stage() {
        let mut l = lifecycle();
        l.reject(RejectionReason::RootMismatch).unwrap();
        assert_eq!(l.state(), SubmissionState::Rejected);
        assert_eq!(l.rejection(), Some(RejectionReason::RootMismatch));
        assert_eq!(l.history()[0].reason, Some(RejectionReason::RootMismatch));
        assert!(l.advance().is_err());
    }

    #[test]
    fn each_reason_rejects_from_its_stage() {
        for (steps, reason) in [
            (0, RejectionReason::GroupNotFound),
            (0, RejectionReason::RootMismatch),
            (1, RejectionReason::ArtifactComputationError),
            (2, RejectionReason::SerializationError),
            (3, RejectionReason::ProofInvalid),
        ] {
            let mut l = lifecycle();
            for _ in 0..steps {
                l.advance().unwrap();
            }
            l.reject(reason).unwrap();
            assert_eq!(l.rejection(), Some(reason));
        }
    }

    #[test]
    fn reject_at_wrong_stage_fails() {
        let mut l = lifecycle();
        l.advance().unwrap();
        let err = l.reject(RejectionReason::RootMismatch).unwrap_err();
        assert!(err.to_string().contains("ROOT_MISMATCH"));
        assert_eq!(l.state(), SubmissionState::RootValidated);
    }

    #[test]
    fn partial_commit_only_after_verification() {
        let mut l = lifecycle();
        assert!(l.mark_partial_commit().is_err());
        for _ in 0..4 {
            l.advance().unwrap();
        }
        l.mark_partial_commit().unwrap();
        assert_eq!(l.state(), SubmissionState::PartialCommit);
        assert!(l.state().is_terminal());
        assert!(l.advance().is_err());
        // The pipeline lifecycle cannot recover itself.
        assert!(l.complete_recovery().is_err());
    }

    #[test]
    fn resumed_partial_commit_recovers() {
        let mut l = SubmissionLifecycle::resume_partial(SubmissionId::new());
        assert_eq!(l.state(), SubmissionState::PartialCommit);
        l.complete_recovery().unwrap();
        assert_eq!(l.state(), SubmissionState::Committed);
        assert!(l.complete_recovery().is_err());
    }

    #[test]
    fn state_and_reason_names() {
        assert_eq!(SubmissionState::PartialCommit.to_string(), "PARTIAL_COMMIT");
        assert_eq!(
            serde_json::to_string(&SubmissionState::ProofVerified).unwrap(),
            "\"PROOF_VERIFIED\""
        );
        assert_eq!(
            serde_json::to_string(&RejectionReason::ArtifactComputationError).unwrap(),
            "\"ARTIFACT_COMPUTATION_ERROR\""
        );
        assert_eq!(RejectionReason::ProofInvalid.as_str(), "PROOF_INVALID");
    }
}
