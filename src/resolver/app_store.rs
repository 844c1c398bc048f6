// SPDX-License-Identifier: EUPL-1.2

//! Apple App Store listings.
//!
//! Sources in priority order: the public lookup API, JSON-LD blocks, then
//! heading/meta/script scraping of the listing page.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::{
    extract::{self, LdListing, Rule},
    fetch::ListingFetcher,
    region, ResolveError, Storefront,
};
use crate::models::GameListingResult;

const LOOKUP_ENDPOINT: &str = "https://itunes.apple.com/lookup";

static APP_ID_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"/id(\d+)").expect("invalid app id pattern"),
        Regex::new(r"[?&]id=(\d+)").expect("invalid app id pattern"),
        Regex::new(r"/app/id(\d+)").expect("invalid app id pattern"),
    ]
});

static TITLE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*[-–—]\s*app\s*store\s*$").expect("invalid suffix pattern"));

static TITLE_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::capture(
            "product-header__title",
            r#"(?is)<h1\b[^>]*class\s*=\s*["'][^"']*\bproduct-header__title\b[^"']*["'][^>]*>(.*?)</h1>"#,
        ),
        Rule::capture(
            "data-test=product-title",
            r#"(?is)<h1\b[^>]*data-test\s*=\s*["']product-title["'][^>]*>(.*?)</h1>"#,
        ),
        Rule::capture(
            "title heading span",
            r#"(?is)<h1\b[^>]*class\s*=\s*["'][^"']*title[^"']*["'][^>]*>\s*<span\b[^>]*>(.*?)</span>"#,
        ),
        Rule::meta("property", "og:title"),
        Rule::capture("title", r"(?is)<title\b[^>]*>(.*?)</title>"),
    ]
});

static BUNDLE_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::capture(
            "data-bundle-id",
            r#"(?i)data-bundle-id\s*=\s*["']([^"']+)["']"#,
        ),
        Rule::inline_scripts(
            "script bundle id",
            r#"(?i)["']?(?:bundleIdentifier|bundleId|bundle-id)["']?\s*[:=]\s*["']([^"']+)["']"#,
        ),
        Rule::capture("raw bundleId", r#""bundleId"\s*:\s*"([^"]+)""#),
    ]
});

static LOGO_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::meta("property", "og:image"),
        Rule::meta("name", "og:image"),
        Rule::capture(
            "product artwork picture",
            r#"(?is)<picture\b[^>]*class\s*=\s*["'][^"']*product-(?:hero|artwork)[^"']*["'][^>]*>.*?<img\b[^>]*\ssrc\s*=\s*["']([^"']+)["']"#,
        ),
        Rule::img("class", r"product-icon|app-icon"),
        Rule::srcset("img srcset", r#"(?is)<img\b[^>]*\ssrcset\s*=\s*["']([^"']+)["']"#),
    ]
});

/// Numeric app id from a listing URL.
pub fn app_id(url: &str) -> Option<&str> {
    APP_ID_PATTERNS.iter().find_map(|re| {
        re.captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    })
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    results: Vec<LookupApp>,
}

#[derive(Debug, Deserialize)]
struct LookupApp {
    #[serde(rename = "trackName")]
    track_name: Option<String>,
    #[serde(rename = "bundleId")]
    bundle_id: Option<String>,
    #[serde(rename = "artworkUrl512")]
    artwork_512: Option<String>,
    #[serde(rename = "artworkUrl100")]
    artwork_100: Option<String>,
    #[serde(rename = "artworkUrl60")]
    artwork_60: Option<String>,
}

impl LookupApp {
    fn artwork(&self) -> Option<String> {
        [&self.artwork_512, &self.artwork_100, &self.artwork_60]
            .into_iter()
            .find_map(|url| non_empty(url.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn lookup_url(app_id: &str, country: Option<&str>) -> String {
    match country {
        Some(country) => format!("{LOOKUP_ENDPOINT}?id={app_id}&country={country}"),
        None => format!("{LOOKUP_ENDPOINT}?id={app_id}"),
    }
}

/// Query the lookup API. Any failure just means no data from this source.
async fn lookup(
    fetcher: &dyn ListingFetcher,
    app_id: &str,
    country: Option<&str>,
) -> Option<LookupApp> {
    let url = lookup_url(app_id, country);
    let body = match fetcher.fetch_text(&url).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(app_id, error = %e, "App Store lookup failed, falling back to page markup");
            return None;
        }
    };

    match serde_json::from_str::<LookupResponse>(&body) {
        Ok(resp) => resp.results.into_iter().next(),
        Err(e) => {
            tracing::debug!(app_id, error = %e, "App Store lookup returned unexpected JSON");
            None
        }
    }
}

/// Fill name and image from every JSON-LD block, earliest block first.
fn apply_ld_json(result: GameListingResult, html: &str) -> GameListingResult {
    extract::ld_json_blocks(html)
        .filter_map(extract::parse_json)
        .map(|value| LdListing::from_value(&value))
        .fold(result, |result, ld| {
            result
                .or_game_name(|| ld.name)
                .or_logo_url(|| ld.image)
        })
}

fn accept_identifier(raw: &str) -> Option<String> {
    non_empty(Some(raw))
}

pub async fn resolve(
    fetcher: &dyn ListingFetcher,
    url: &str,
) -> Result<GameListingResult, ResolveError> {
    let html = fetcher
        .fetch_text(url)
        .await
        .map_err(|source| ResolveError::Transport {
            storefront: Storefront::AppStore,
            partial: GameListingResult::default(),
            source,
        })?;

    let mut result = GameListingResult::default();

    if let Some(id) = app_id(url) {
        let country = region::app_store_country(url);
        if let Some(app) = lookup(fetcher, id, country.as_deref()).await {
            let logo = app.artwork();
            result = result
                .or_game_name(|| non_empty(app.track_name.as_deref()))
                .or_package_identifier(|| non_empty(app.bundle_id.as_deref()))
                .or_logo_url(|| logo);
        }
    }

    let result = apply_ld_json(result, &html)
        .or_game_name(|| {
            extract::first_match(&TITLE_RULES, &html, |raw| {
                extract::clean_title(raw, &TITLE_SUFFIX)
            })
        })
        .or_package_identifier(|| extract::first_match(&BUNDLE_RULES, &html, accept_identifier))
        .or_logo_url(|| {
            extract::first_match(&LOGO_RULES, &html, |raw| {
                extract::normalize_image_url(raw, url)
            })
        });

    Ok(result)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
