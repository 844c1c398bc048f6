// SPDX-License-Identifier: EUPL-1.2

//! Google Play listings.
//!
//! The package name always comes from the `id` query parameter. Name and icon
//! come from the first JSON-LD block, then from headings and meta tags.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use super::{
    extract::{self, LdListing, Rule},
    fetch::ListingFetcher,
    ResolveError, Storefront,
};
use crate::models::GameListingResult;

static TITLE_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*[-–—]\s*(?:apps\s+on\s+)?google\s*play\s*$")
        .expect("invalid suffix pattern")
});

static TITLE_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::capture(
            "itemprop=name",
            r#"(?is)<h1\b[^>]*itemprop\s*=\s*["']name["'][^>]*>(.*?)</h1>"#,
        ),
        Rule::capture(
            "Fd93Bb heading",
            r#"(?is)<h1\b[^>]*class\s*=\s*["'][^"']*\bFd93Bb\b[^"']*["'][^>]*>(.*?)</h1>"#,
        ),
        Rule::meta("property", "og:title"),
        Rule::meta("name", "title"),
        Rule::capture("title", r"(?is)<title\b[^>]*>(.*?)</title>"),
    ]
});

static LOGO_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::meta("property", "og:image"),
        Rule::meta("name", "og:image"),
        Rule::img("alt", r"(?i)icon"),
        Rule::img("class", r"\bT75of\b"),
        Rule::srcset("img srcset", r#"(?is)<img\b[^>]*\ssrcset\s*=\s*["']([^"']+)["']"#),
    ]
});

/// Package name from the listing URL's `id` parameter.
pub fn package_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url)
        .or_else(|_| Url::parse(&format!("https://{url}")))
        .ok()?;

    parsed
        .query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub async fn resolve(
    fetcher: &dyn ListingFetcher,
    url: &str,
) -> Result<GameListingResult, ResolveError> {
    let result = GameListingResult::default().or_package_identifier(|| package_id(url));

    let html = match fetcher.fetch_text(url).await {
        Ok(html) => html,
        Err(source) => {
            return Err(ResolveError::Transport {
                storefront: Storefront::GooglePlay,
                partial: result,
                source,
            })
        }
    };

    // Only the first block is consulted on Play listings.
    let ld = extract::ld_json_blocks(&html)
        .next()
        .and_then(extract::parse_json)
        .map(|value| LdListing::from_value(&value))
        .unwrap_or_default();

    let result = result
        .or_game_name(|| ld.name)
        .or_logo_url(|| ld.image)
        .or_game_name(|| {
            extract::first_match(&TITLE_RULES, &html, |raw| {
                extract::clean_title(raw, &TITLE_SUFFIX)
            })
        })
        .or_logo_url(|| {
            extract::first_match(&LOGO_RULES, &html, |raw| {
                extract::normalize_image_url(raw, url)
            })
        });

    Ok(result)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::fake::FakeFetcher;

    const LISTING: &str = "https://play.google.com/store/apps/details?id=com.y.z&hl=en";

    #[test]
    fn package_from_query() {
        assert_eq!(package_id(LISTING).as_deref(), Some("com.y.z"));
        assert_eq!(
            package_id("https://play.google.com/store/apps/details?hl=en&id=com%2Eenc.app").as_deref(),
            Some("com.enc.app")
        );
        assert_eq!(
            package_id("play.google.com/store/apps/details?id=no.scheme").as_deref(),
            Some("no.scheme")
        );
        assert_eq!(package_id("https://play.google.com/store/apps"), None);
        assert_eq!(package_id("https://play.google.com/store/apps/details?id="), None);
    }

    #[tokio::test]
    async fn package_ignores_markup() {
        let html = r#"<script>var bundleId = "com.wrong";</script><div data-bundle-id="com.also.wrong"></div>"#;
        let fetcher = FakeFetcher::new().page(LISTING, html);

        let result = resolve(&fetcher, LISTING).await.unwrap();
        assert_eq!(result.package_identifier.as_deref(), Some("com.y.z"));
    }

    #[tokio::test]
    async fn first_ld_block_only() {
        let html = r#"
            <script type="application/ld+json">{"@type":"Organization"}</script>
            <script type="application/ld+json">{"name":"Second","image":"https://img/2.png"}</script>
            <h1 itemprop="name"><span>Heading &amp; Co</span></h1>
            <meta property="og:image" content="https://img/og.png">"#;
        let fetcher = FakeFetcher::new().page(LISTING, html);

        let result = resolve(&fetcher, LISTING).await.unwrap();
        assert_eq!(result.game_name.as_deref(), Some("Heading & Co"));
        assert_eq!(result.logo_url.as_deref(), Some("https://img/og.png"));
    }

    #[tokio::test]
    async fn ld_json_wins_over_markup() {
        let html = r#"
            <script type="application/ld+json">{"name":"LD Game","image":["https://img/ld.png"]}</script>
            <h1 itemprop="name">Heading</h1>
            <meta property="og:image" content="https://img/og.png">"#;
        let fetcher = FakeFetcher::new().page(LISTING, html);

        let result = resolve(&fetcher, LISTING).await.unwrap();
        assert_eq!(
            result,
            GameListingResult {
                game_name: Some("LD Game".into()),
                package_identifier: Some("com.y.z".into()),
                logo_url: Some("https://img/ld.png".into()),
            }
        );
    }

    #[tokio::test]
    async fn meta_and_title_fallbacks() {
        let html = r#"
            <head>
              <meta name="title" content="Meta Title – Google Play">
              <title>Tag Title - Apps on Google Play</title>
            </head>
            <img alt="Icon image" src="/icons/z.png">"#;
        let fetcher = FakeFetcher::new().page(LISTING, html);

        let result = resolve(&fetcher, LISTING).await.unwrap();
        assert_eq!(result.game_name.as_deref(), Some("Meta Title"));
        assert_eq!(
            result.logo_url.as_deref(),
            Some("https://play.google.com/icons/z.png")
        );
    }

    #[test]
    fn suffix_matches_any_dash_and_case() {
        for raw in [
            "Game - Google Play",
            "Game – Apps on Google Play",
            "Game — APPS ON GOOGLE PLAY",
            "Game -google play",
        ] {
            assert_eq!(
                extract::clean_title(raw, &TITLE_SUFFIX).as_deref(),
                Some("Game"),
                "{raw}"
            );
        }
    }

    #[tokio::test]
    async fn heading_and_og_title_rules() {
        let html = r#"
            <h1 class="Fd93Bb F5UCq"><span>Fd Game</span></h1>
            <meta property="og:title" content="Og Game">
            <title>Tag - Google Play</title>"#;
        let fetcher = FakeFetcher::new().page(LISTING, html);
        let result = resolve(&fetcher, LISTING).await.unwrap();
        assert_eq!(result.game_name.as_deref(), Some("Fd Game"));

        let html = r#"
            <meta property="og:title" content="Og Game — APPS ON GOOGLE PLAY">
            <meta name="title" content="Meta Game">"#;
        let fetcher = FakeFetcher::new().page(LISTING, html);
        let result = resolve(&fetcher, LISTING).await.unwrap();
        assert_eq!(result.game_name.as_deref(), Some("Og Game"));
    }

    #[tokio::test]
    async fn icon_alt_after_src() {
        let html = r#"<img src="/icons/late.png" alt="App icon"><img class="T75of" src="https://play-lh/t.png">"#;
        let fetcher = FakeFetcher::new().page(LISTING, html);
        let result = resolve(&fetcher, LISTING).await.unwrap();
        assert_eq!(
            result.logo_url.as_deref(),
            Some("https://play.google.com/icons/late.png")
        );
    }

    #[tokio::test]
    async fn class_image_then_srcset() {
        let html = r#"<img class="T75of nm4vBd" src="https://play-lh/icon=s240">"#;
        let fetcher = FakeFetcher::new().page(LISTING, html);
        let result = resolve(&fetcher, LISTING).await.unwrap();
        assert_eq!(result.logo_url.as_deref(), Some("https://play-lh/icon=s240"));

        let html = r#"<img srcset="//play-lh/a=w240 2x, //play-lh/b=w480 3x">"#;
        let fetcher = FakeFetcher::new().page(LISTING, html);
        let result = resolve(&fetcher, LISTING).await.unwrap();
        assert_eq!(result.logo_url.as_deref(), Some("https://play-lh/a=w240"));
        assert_eq!(result.game_name, None);
    }
}
