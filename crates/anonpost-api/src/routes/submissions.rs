//! # Submission API
//!
//! Accepts anonymous group comments, completes partial commits, and serves
//! committed records by proof fingerprint.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use anonpost_core::{ProofFingerprint, Submission, SubmissionRecord};

use crate::error::{AppError, ErrorBody};
use crate::extractors::{extract_validated_json, Validate};
use crate::orchestration::SubmissionOutcome;
use crate::state::AppState;

/// A committed submission record.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub id: Uuid,
    /// SHA-256 of the canonical proof JSON.
    pub fingerprint: String,
    /// Content-store address of the committed artifact.
    pub artifact_address: String,
    pub comment_msg: String,
    pub group_id: i64,
    pub prop_id: u64,
    pub group_type: u64,
    pub created_at: DateTime<Utc>,
}

impl From<SubmissionRecord> for SubmissionResponse {
    fn from(record: SubmissionRecord) -> Self {
        Self {
            id: *record.id.as_uuid(),
            fingerprint: record.fingerprint.to_hex(),
            artifact_address: record.artifact_address,
            comment_msg: record.comment_msg,
            group_id: record.group_id.value(),
            prop_id: record.prop_id.value(),
            group_type: record.group_type.value(),
            created_at: record.created_at,
        }
    }
}

/// Request to finish a partial commit.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecoverRequest {
    /// Address returned in the `PARTIAL_COMMIT` error details.
    pub artifact_address: String,
}

impl Validate for RecoverRequest {
    fn validate(&self) -> Result<(), String> {
        if self.artifact_address.trim().is_empty() {
            return Err("artifactAddress must not be empty".to_string());
        }
        Ok(())
    }
}

fn committed(outcome: SubmissionOutcome) -> (StatusCode, Json<SubmissionResponse>) {
    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (status, Json(outcome.record.into()))
}

/// Build the submissions router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/submissions", post(create_submission))
        .route("/v1/submissions/recover", post(recover_submission))
        .route("/v1/submissions/{fingerprint}", get(get_submission))
}

/// POST /v1/submissions: Verify and commit a comment.
///
/// Body: `{root, proof, commentMsg, publicSignatureData}`.
#[utoipa::path(
    post,
    path = "/v1/submissions",
    request_body = Object,
    responses(
        (status = 201, description = "Committed", body = SubmissionResponse),
        (status = 200, description = "Proof already committed; existing record", body = SubmissionResponse),
        (status = 400, description = "Malformed body", body = ErrorBody),
        (status = 404, description = "GROUP_NOT_FOUND", body = ErrorBody),
        (status = 422, description = "ROOT_MISMATCH, ARTIFACT_COMPUTATION_ERROR, SERIALIZATION_ERROR or PROOF_INVALID", body = ErrorBody),
        (status = 502, description = "PARTIAL_COMMIT", body = ErrorBody),
    ),
    tag = "submissions"
)]
pub async fn create_submission(
    State(state): State<AppState>,
    body: Result<Json<Submission>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmissionResponse>), AppError> {
    let submission = extract_validated_json(body)?;
    let outcome = state.coordinator.submit(submission).await?;
    Ok(committed(outcome))
}

/// POST /v1/submissions/recover: Write the record for a stored artifact.
#[utoipa::path(
    post,
    path = "/v1/submissions/recover",
    request_body = RecoverRequest,
    responses(
        (status = 201, description = "Record written", body = SubmissionResponse),
        (status = 200, description = "Record already existed", body = SubmissionResponse),
        (status = 404, description = "No artifact at that address", body = ErrorBody),
        (status = 422, description = "Invalid address", body = ErrorBody),
        (status = 502, description = "Record insert failed again", body = ErrorBody),
    ),
    tag = "submissions"
)]
pub async fn recover_submission(
    State(state): State<AppState>,
    body: Result<Json<RecoverRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmissionResponse>), AppError> {
    let req = extract_validated_json(body)?;
    let outcome = state
        .coordinator
        .complete_commit(req.artifact_address.trim())
        .await?;
    Ok(committed(outcome))
}

/// GET /v1/submissions/{fingerprint}: Fetch a committed record.
#[utoipa::path(
    get,
    path = "/v1/submissions/{fingerprint}",
    params(("fingerprint" = String, Path, description = "Proof fingerprint (64 hex characters)")),
    responses(
        (status = 200, description = "Record found", body = SubmissionResponse),
        (status = 404, description = "No record for this fingerprint", body = ErrorBody),
        (status = 422, description = "Malformed fingerprint", body = ErrorBody),
    ),
    tag = "submissions"
)]
pub async fn get_submission(
    State(state): State<AppState>,
    Path(fingerprint): Path<String>,
) -> Result<Json<SubmissionResponse>, AppError> {
    let fingerprint = ProofFingerprint::from_hex(&fingerprint)?;
    let record = state
        .coordinator
        .find_record(&fingerprint)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("submission {fingerprint}")))?;
    Ok(Json(record.into()))
}
