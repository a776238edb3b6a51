//! # Group API
//!
//! Read-only view of the published groups the pipeline validates against.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use anonpost_core::{Group, GroupType, PropId};

use crate::error::{AppError, ErrorBody};
use crate::orchestration::GroupRegistry;
use crate::state::AppState;

/// A published group.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    pub id: i64,
    pub prop_id: u64,
    pub type_id: u64,
    /// Membership root exactly as published.
    pub root: String,
}

impl From<Group> for GroupResponse {
    fn from(group: Group) -> Self {
        Self {
            id: group.id.value(),
            prop_id: group.prop_id.value(),
            type_id: group.type_id.value(),
            root: group.root.as_str().to_string(),
        }
    }
}

/// Build the groups router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/groups/{prop_id}/{group_type}", get(get_group))
}

/// GET /v1/groups/{prop_id}/{group_type}: Fetch a published group.
#[utoipa::path(
    get,
    path = "/v1/groups/{prop_id}/{group_type}",
    params(
        ("prop_id" = u64, Path, description = "Proposal identifier"),
        ("group_type" = u64, Path, description = "Group type identifier"),
    ),
    responses(
        (status = 200, description = "Group found", body = GroupResponse),
        (status = 404, description = "No group published for the pair", body = ErrorBody),
    ),
    tag = "groups"
)]
pub async fn get_group(
    State(state): State<AppState>,
    Path((prop_id, group_type)): Path<(u64, u64)>,
) -> Result<Json<GroupResponse>, AppError> {
    let group = state
        .groups()
        .find_group(PropId::new(prop_id), GroupType::new(group_type))
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("group for propId {prop_id}, groupType {group_type}"))
        })?;
    Ok(Json(group.into()))
}
