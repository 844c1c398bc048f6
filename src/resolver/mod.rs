// SPDX-License-Identifier: EUPL-1.2

//! Storefront metadata resolver.
//!
//! Given an App Store or Google Play listing URL, fetch the listing and pull
//! out a display name, the platform package identifier and an icon URL.
//! Anything the markup does not expose is left empty; only a failed listing
//! fetch is reported as an error.

pub mod app_store;
pub mod extract;
pub mod fetch;
pub mod google_play;
pub mod region;

#[cfg(test)]
pub mod fake;

use std::fmt;

use thiserror::Error;

use crate::models::GameListingResult;
pub use fetch::{FetchError, Fetcher, HttpFetcher, ListingFetcher};

/// Which storefront a listing URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storefront {
    AppStore,
    GooglePlay,
    Unrecognized,
}

impl Storefront {
    pub fn classify(url: &str) -> Self {
        let url = url.to_ascii_lowercase();
        if url.contains("apps.apple.com") || url.contains("itunes.apple.com") {
            Storefront::AppStore
        } else if url.contains("play.google.com") {
            Storefront::GooglePlay
        } else {
            Storefront::Unrecognized
        }
    }
}

impl fmt::Display for Storefront {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Storefront::AppStore => "App Store",
            Storefront::GooglePlay => "Google Play",
            Storefront::Unrecognized => "unrecognized",
        })
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    /// The listing page itself could not be fetched. `partial` holds whatever
    /// was known before the fetch was attempted.
    #[error("failed to fetch {storefront} listing: {source}")]
    Transport {
        storefront: Storefront,
        partial: GameListingResult,
        #[source]
        source: FetchError,
    },
}

impl ResolveError {
    pub fn into_partial(self) -> GameListingResult {
        match self {
            ResolveError::Transport { partial, .. } => partial,
        }
    }
}

/// Resolve listing metadata for `url`.
///
/// Unrecognized URLs resolve to an empty result without any outbound request.
#[tracing::instrument(skip(fetcher))]
pub async fn resolve(
    fetcher: &dyn ListingFetcher,
    url: &str,
) -> Result<GameListingResult, ResolveError> {
    let result = match Storefront::classify(url) {
        Storefront::AppStore => app_store::resolve(fetcher, url).await?,
        Storefront::GooglePlay => google_play::resolve(fetcher, url).await?,
        Storefront::Unrecognized => {
            tracing::debug!("not a storefront listing URL");
            return Ok(GameListingResult::default());
        }
    };

    tracing::debug!(complete = result.is_complete(), "listing resolved");
    Ok(result)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
