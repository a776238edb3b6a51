//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into a single OpenAPI 3.1
//! document served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI document for the API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "anonpost API",
        version = "0.1.0",
        description = "Verification and commit of anonymous group comments backed by Groth16 membership proofs.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        crate::routes::submissions::create_submission,
        crate::routes::submissions::recover_submission,
        crate::routes::submissions::get_submission,
        crate::routes::groups::get_group,
    ),
    components(schemas(
        crate::routes::submissions::SubmissionResponse,
        crate::routes::submissions::RecoverRequest,
        crate::routes::groups::GroupResponse,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "submissions", description = "Comment submission pipeline"),
        (name = "groups", description = "Published group roots"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let paths = doc["paths"].as_object().unwrap();
        for path in [
            "/v1/submissions",
            "/v1/submissions/recover",
            "/v1/submissions/{fingerprint}",
            "/v1/groups/{prop_id}/{group_type}",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
    }
}
