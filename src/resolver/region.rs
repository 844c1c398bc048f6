// SPDX-License-Identifier: EUPL-1.2

//! Regional storefront variants of a listing URL.

use url::Url;

use super::Storefront;

/// Two ASCII letters, e.g. `us`, `JP`.
pub fn is_region_code(region: &str) -> bool {
    region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic())
}

/// The same listing as seen from another storefront region.
///
/// App Store URLs carry the region as the first path segment; Google Play
/// carries it in the `gl` query parameter. Returns `None` for invalid region
/// codes and for URLs that are not storefront listings.
pub fn regional_url(url: &str, region: &str) -> Option<String> {
    if !is_region_code(region) {
        return None;
    }

    match Storefront::classify(url) {
        Storefront::AppStore => {
            let mut parsed = Url::parse(url).ok()?;
            let mut segments: Vec<String> = parsed
                .path_segments()
                .map(|s| s.filter(|s| !s.is_empty()).map(String::from).collect())
                .unwrap_or_default();

            let region = region.to_ascii_lowercase();
            if segments.first().is_some_and(|s| is_region_code(s)) {
                segments[0] = region;
            } else {
                segments.insert(0, region);
            }
            parsed.set_path(&format!("/{}", segments.join("/")));
            Some(parsed.into())
        }
        Storefront::GooglePlay => {
            let mut parsed = Url::parse(url).ok()?;
            let pairs: Vec<(String, String)> = parsed
                .query_pairs()
                .filter(|(k, _)| k != "gl")
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();

            parsed
                .query_pairs_mut()
                .clear()
                .extend_pairs(pairs)
                .append_pair("gl", &region.to_ascii_uppercase());
            Some(parsed.into())
        }
        Storefront::Unrecognized => None,
    }
}

/// Country segment of an App Store listing path, if it has one.
pub fn app_store_country(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let first = parsed.path_segments()?.next()?;
    is_region_code(first).then(|| first.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_codes() {
        assert!(is_region_code("us"));
        assert!(is_region_code("JP"));
        assert!(!is_region_code("usa"));
        assert!(!is_region_code("u1"));
        assert!(!is_region_code(""));
    }

    #[test]
    fn app_store_region_segment_is_replaced() {
        assert_eq!(
            regional_url("https://apps.apple.com/us/app/cool-game/id999", "JP").as_deref(),
            Some("https://apps.apple.com/jp/app/cool-game/id999")
        );
    }

    #[test]
    fn app_store_region_segment_is_inserted() {
        assert_eq!(
            regional_url("https://apps.apple.com/app/cool-game/id999", "de").as_deref(),
            Some("https://apps.apple.com/de/app/cool-game/id999")
        );
    }

    #[test]
    fn google_play_sets_gl_and_keeps_id() {
        let url = regional_url(
            "https://play.google.com/store/apps/details?id=com.y.z&hl=en&gl=US",
            "kr",
        )
        .unwrap();
        assert_eq!(
            url,
            "https://play.google.com/store/apps/details?id=com.y.z&hl=en&gl=KR"
        );
    }

    #[test]
    fn unsupported_inputs() {
        assert_eq!(regional_url("https://example.com/x", "us"), None);
        assert_eq!(regional_url("https://apps.apple.com/us/app/x/id1", "usa"), None);
    }

    #[test]
    fn country_from_path() {
        assert_eq!(
            app_store_country("https://apps.apple.com/GB/app/x/id1").as_deref(),
            Some("gb")
        );
        assert_eq!(app_store_country("https://apps.apple.com/app/x/id1"), None);
    }
}
