//! # anonpost-state: Submission Lifecycle
//!
//! A submission moves through a fixed sequence of verification stages:
//!
//! ```text
//! RECEIVED → ROOT_VALIDATED → ARTIFACTS_COMPUTED → SIGNALS_ASSEMBLED
//!          → PROOF_VERIFIED → COMMITTED
//! ```
//!
//! Any non-terminal stage may end in `REJECTED` with a [`RejectionReason`].
//! `PROOF_VERIFIED` may also end in `PARTIAL_COMMIT` when the artifact was
//! stored but the record could not be written; a recovery lifecycle picks
//! up from there and can only move to `COMMITTED`.

pub mod submission;

pub use submission::{
    RejectionReason, SubmissionLifecycle, SubmissionState, TransitionError, TransitionRecord,
};
