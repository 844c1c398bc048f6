// SPDX-License-Identifier: EUPL-1.2

//! Handler for ownership checks on accounts, games and campaigns.
//!
//! ## Endpoints
//!
//! - `POST /permissions/check` — May this profile edit/delete a resource assigned to someone?

use crate::{
    auth,
    db::AppState,
    error::GatewayError,
    models::{PermissionCheckRequest, PermissionCheckResponse},
    permissions,
};
use axum::{extract::State, http::HeaderMap, Json};
use std::sync::Arc;

/// `POST /permissions/check` — Evaluate an edit/delete action.
///
/// Body: `{ "profile_id": "...", "assigned_user_id": "...", "action": "delete",
/// "resource": "game", "resource_name": "Cool Game" }`
///
/// `assigned_user_id` must already be the governing account's assignee; for a
/// game or campaign that is the parent account's, not the row's own creator.
/// Unknown and deactivated profiles are refused like anonymous callers.
pub async fn check_permission(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<PermissionCheckRequest>,
) -> Result<Json<PermissionCheckResponse>, GatewayError> {
    auth::require_api_key(state.api_key.as_deref(), &headers)?;

    let subject = state
        .profiles
        .find_subject(&req.profile_id)
        .await?
        .filter(|subject| subject.is_active);

    let allowed = permissions::can_manage(subject.as_ref(), &req.assigned_user_id);
    let message = permissions::action_message(
        allowed,
        req.action,
        req.resource,
        req.resource_name.as_deref(),
    );

    tracing::info!(
        profile_id = %req.profile_id,
        action = %req.action,
        resource = %req.resource,
        allowed,
        "permission check"
    );

    Ok(Json(PermissionCheckResponse { allowed, message }))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
