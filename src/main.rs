// SPDX-License-Identifier: EUPL-1.2

//! AMPD gateway — server-side helpers for the marketing-operations dashboard.
//!
//! Resolves storefront listings to display metadata (the browser cannot read
//! App Store / Google Play pages itself because of CORS) and answers ownership
//! checks for account, game and campaign actions.
//!
//! ## Endpoints
//!
//! - `GET  /health`              — Health check
//! - `POST /resolve-game-info`   — Name, package id and icon for a listing URL
//! - `POST /permissions/check`   — May a profile edit/delete an assigned resource

mod auth;
mod cache;
mod config;
mod db;
mod error;
mod handlers;
mod handlers_permissions;
mod models;
mod permissions;
mod profiles;
mod resolver;

use axum::{routing::{get, post}, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use db::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/resolve-game-info", post(handlers::resolve_game_info))
        .route("/permissions/check", post(handlers_permissions::check_permission))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "ampd_gateway=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = config::Settings::from_env();

    let state = AppState::connect(&settings).await?;
    let state = Arc::new(state);

    tracing::info!(
        timeout_secs = settings.fetch_timeout.as_secs(),
        cache_ttl_secs = state.cache_ttl_secs,
        "AMPD gateway configured"
    );

    let listener = tokio::net::TcpListener::bind(&settings.listen_addr).await?;
    tracing::info!("AMPD gateway listening on http://{}", settings.listen_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
