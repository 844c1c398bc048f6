// SPDX-License-Identifier: EUPL-1.2

//! Axum route handlers for the AMPD gateway.

use crate::{
    cache,
    db::AppState,
    error::GatewayError,
    models::ResolveResponse,
    resolver::{self, region},
};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

// ── Health ────────────────────────────────────────────────────────────────────

/// `GET /health` — Health check
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "ampd-gateway",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ── Resolve ───────────────────────────────────────────────────────────────────

/// `POST /resolve-game-info` — Scrape name, package id and icon for a listing.
///
/// Body: `{ "url": "https://apps.apple.com/...", "region": "jp" }` (`region` optional)
///
/// Storefront fetch failures are logged and answered with whatever was known
/// before the failure, so the dashboard can always render something.
pub async fn resolve_game_info(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ResolveResponse>, GatewayError> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);

    let url = body
        .get("url")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or(GatewayError::MissingUrl)?;

    let target = match body.get("region") {
        None | Some(Value::Null) => url.to_string(),
        Some(Value::String(code)) if region::is_region_code(code) => {
            region::regional_url(url, code).unwrap_or_else(|| url.to_string())
        }
        Some(other) => return Err(GatewayError::InvalidRegion(other.to_string())),
    };

    if let Some(cache) = &state.cache {
        if let Some(hit) = cache::load(cache, &target).await {
            tracing::debug!(url = %target, resolved_at = %hit.resolved_at, "listing cache hit");
            return Ok(Json(ResolveResponse { data: hit.data }));
        }
    }

    // A panic during extraction surfaces here as a JoinError.
    let fetcher = state.fetcher.clone();
    let task_url = target.clone();
    let outcome = tokio::spawn(async move { resolver::resolve(fetcher.as_ref(), &task_url).await })
        .await
        .map_err(|e| GatewayError::ResolveFailed(e.to_string()))?;

    let data = match outcome {
        Ok(data) => {
            if let Some(cache) = &state.cache {
                cache::store(cache, &target, &data, state.cache_ttl_secs).await;
            }
            data
        }
        Err(e) => {
            tracing::error!(url = %target, "Error fetching game info: {e}");
            e.into_partial()
        }
    };

    Ok(Json(ResolveResponse { data }))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
