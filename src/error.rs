// SPDX-License-Identifier: EUPL-1.2

//! Error types for the AMPD gateway.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors returned by handlers.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("URL is required")]
    MissingUrl,

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Missing or invalid API key")]
    Unauthorized,

    /// The resolution task died before producing any result.
    #[error("Resolver failure: {0}")]
    ResolveFailed(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            GatewayError::MissingUrl => (StatusCode::BAD_REQUEST, "URL is required".into()),
            GatewayError::InvalidRegion(region) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid region: {region} (expected a two-letter storefront code)"),
            ),
            GatewayError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Missing or invalid X-Api-Key".into(),
            ),
            GatewayError::ResolveFailed(e) => {
                tracing::error!("game info resolution failed: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch game information".into(),
                )
            }
            GatewayError::Internal(e) => {
                tracing::error!("internal error: {e:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
