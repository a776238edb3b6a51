//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps pipeline outcomes to HTTP status codes and JSON error bodies.
//!
//! | Outcome | Status | Code |
//! |---|---|---|
//! | Unknown `(propId, groupType)` | 404 | `GROUP_NOT_FOUND` |
//! | Other rejections | 422 | the rejection reason |
//! | Artifact stored, record not written | 502 | `PARTIAL_COMMIT` |
//! | Collaborator failure | 500 | `INTERNAL_ERROR` |
//!
//! Internal error details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use anonpost_state::RejectionReason;

use crate::orchestration::{CollaboratorError, SubmissionError};

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "ROOT_MISMATCH", "NOT_FOUND").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details. Present for partial commits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The pipeline rejected the submission (404 or 422).
    #[error("{message}")]
    Rejected {
        reason: RejectionReason,
        message: String,
    },

    /// Artifact stored without a record (502). Carries what recovery needs.
    #[error("artifact {address} stored but the submission record was not written")]
    PartialCommit { address: String, fingerprint: String },

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Rejected {
                reason: RejectionReason::GroupNotFound,
                ..
            } => (StatusCode::NOT_FOUND, RejectionReason::GroupNotFound.as_str()),
            Self::Rejected { reason, .. } => (StatusCode::UNPROCESSABLE_ENTITY, reason.as_str()),
            Self::PartialCommit { .. } => (StatusCode::BAD_GATEWAY, "PARTIAL_COMMIT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::PartialCommit {
                address,
                fingerprint,
            } => Some(serde_json::json!({
                "artifactAddress": address,
                "fingerprint": fingerprint,
            })),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<SubmissionError> for AppError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::Rejected { reason, detail } => Self::Rejected {
                reason,
                message: detail,
            },
            SubmissionError::PartialCommit {
                address,
                fingerprint,
            } => Self::PartialCommit {
                address,
                fingerprint: fingerprint.to_hex(),
            },
            SubmissionError::InvalidAddress(msg) => Self::Validation(msg),
            SubmissionError::ArtifactNotFound(address) => {
                Self::NotFound(format!("artifact {address}"))
            }
            e @ (SubmissionError::PersistenceFailure(_)
            | SubmissionError::CorruptArtifact(_)
            | SubmissionError::Internal(_)) => Self::Internal(e.to_string()),
        }
    }
}

impl From<CollaboratorError> for AppError {
    fn from(err: CollaboratorError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<anonpost_core::ValidationError> for AppError {
    fn from(err: anonpost_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anonpost_core::ProofFingerprint;
    use http_body_util::BodyExt;

    async fn response_parts(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn rejected(reason: RejectionReason) -> AppError {
        AppError::Rejected {
            reason,
            message: "because".into(),
        }
    }

    #[test]
    fn group_not_found_is_404() {
        let (status, code) = rejected(RejectionReason::GroupNotFound).status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "GROUP_NOT_FOUND");
    }

    #[test]
    fn other_rejections_are_422_with_reason_code() {
        for reason in [
            RejectionReason::RootMismatch,
            RejectionReason::ArtifactComputationError,
            RejectionReason::SerializationError,
            RejectionReason::ProofInvalid,
        ] {
            let (status, code) = rejected(reason).status_and_code();
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(code, reason.as_str());
        }
    }

    #[test]
    fn plain_status_codes() {
        assert_eq!(
            AppError::NotFound("x".into()).status_and_code(),
            (StatusCode::NOT_FOUND, "NOT_FOUND")
        );
        assert_eq!(
            AppError::Validation("x".into()).status_and_code(),
            (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR")
        );
        assert_eq!(
            AppError::BadRequest("x".into()).status_and_code(),
            (StatusCode::BAD_REQUEST, "BAD_REQUEST")
        );
        assert_eq!(
            AppError::Internal("x".into()).status_and_code(),
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        );
    }

    #[tokio::test]
    async fn partial_commit_body_carries_recovery_details() {
        let fingerprint = ProofFingerprint::from_hex(&"ab".repeat(32)).unwrap();
        let err: AppError = SubmissionError::PartialCommit {
            address: "cd".repeat(32),
            fingerprint,
        }
        .into();
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "PARTIAL_COMMIT");
        assert_eq!(body["error"]["details"]["artifactAddress"], "cd".repeat(32));
        assert_eq!(body["error"]["details"]["fingerprint"], "ab".repeat(32));
    }

    #[tokio::test]
    async fn rejection_body_uses_detail_as_message() {
        let err: AppError = SubmissionError::Rejected {
            reason: RejectionReason::RootMismatch,
            detail: "claimed root 0xdef does not match".into(),
        }
        .into();
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "ROOT_MISMATCH");
        assert_eq!(body["error"]["message"], "claimed root 0xdef does not match");
        assert!(body["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn internal_error_hides_message() {
        let err: AppError = SubmissionError::Internal("db password wrong".into()).into();
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "An internal error occurred");
        assert!(!body.to_string().contains("password"));
    }

    #[test]
    fn recovery_errors_map_to_client_statuses() {
        let err: AppError = SubmissionError::InvalidAddress("zz".into()).into();
        assert!(matches!(err, AppError::Validation(_)));
        let err: AppError = SubmissionError::ArtifactNotFound("00".into()).into();
        assert!(matches!(err, AppError::NotFound(_)));
        let err: AppError = SubmissionError::CorruptArtifact("bad".into()).into();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
