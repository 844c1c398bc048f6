// SPDX-License-Identifier: EUPL-1.2

//! Profile database, Redis cache, storefront fetcher and application state.

use redis::aio::ConnectionManager;

use crate::{
    cache,
    config::Settings,
    profiles::{PgProfileDirectory, Profiles},
    resolver::{Fetcher, HttpFetcher},
};

/// Shared application state injected into every Axum handler.
#[derive(Clone)]
pub struct AppState {
    /// Outbound transport for storefront pages and the App Store lookup API.
    pub fetcher: Fetcher,
    pub profiles: Profiles,
    /// `None` if `REDIS_URL` is not set; listings are then resolved on every request.
    pub cache: Option<ConnectionManager>,
    /// Optional API key for `POST /permissions/check`.
    /// When `Some`, callers must supply the matching value in `X-Api-Key`.
    pub api_key: Option<String>,
    pub cache_ttl_secs: u64,
}

impl AppState {
    /// Wire up PostgreSQL (lazy), Redis (optional) and the storefront client.
    pub async fn connect(settings: &Settings) -> anyhow::Result<Self> {
        let profiles = PgProfileDirectory::connect_lazy(&settings.database_url)?.shared();
        let cache = cache::connect(settings.redis_url.as_deref()).await;
        let fetcher = HttpFetcher::new(&settings.user_agent, settings.fetch_timeout)?.shared();

        if settings.api_key.is_some() {
            tracing::info!("AMPD_API_KEY set — POST /permissions/check is key-protected");
        } else {
            tracing::warn!("AMPD_API_KEY not set — POST /permissions/check is open (dev mode)");
        }

        Ok(Self {
            fetcher,
            profiles,
            cache,
            api_key: settings.api_key.clone(),
            cache_ttl_secs: settings.cache_ttl.as_secs(),
        })
    }
}
