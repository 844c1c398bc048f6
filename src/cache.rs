// SPDX-License-Identifier: EUPL-1.2

//! Redis cache for resolved listings.
//!
//! Sits in front of the resolver at the HTTP layer. Cache errors are logged
//! and treated as a miss; the cache is never required for a correct answer.

use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};

use crate::models::GameListingResult;

const KEY_PREFIX: &str = "ampd:game-info:";

/// Connect to Redis, or run without a cache when unset or unreachable.
pub async fn connect(redis_url: Option<&str>) -> Option<ConnectionManager> {
    let Some(url) = redis_url else {
        tracing::info!("REDIS_URL not set — listing cache disabled");
        return None;
    };

    match redis::Client::open(url) {
        Ok(client) => match ConnectionManager::new(client).await {
            Ok(mgr) => {
                tracing::info!("Redis cache connected: {}", url);
                Some(mgr)
            }
            Err(e) => {
                tracing::warn!("Redis connect failed (cache disabled): {e}");
                None
            }
        },
        Err(e) => {
            tracing::warn!("Redis URL invalid (cache disabled): {e}");
            None
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CachedListing {
    pub data: GameListingResult,
    pub resolved_at: DateTime<Utc>,
}

pub fn cache_key(url: &str) -> String {
    format!("{KEY_PREFIX}{url}")
}

pub async fn load(cache: &ConnectionManager, url: &str) -> Option<CachedListing> {
    let mut conn = cache.clone();
    let raw: Option<String> = match redis::cmd("GET")
        .arg(cache_key(url))
        .query_async::<_, Option<String>>(&mut conn)
        .await
    {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(url, "listing cache read failed: {e}");
            return None;
        }
    };

    decode_entry(url, &raw?)
}

fn decode_entry(url: &str, raw: &str) -> Option<CachedListing> {
    match serde_json::from_str(raw) {
        Ok(entry) => Some(entry),
        Err(e) => {
            tracing::warn!(url, "listing cache entry undecodable, treating as miss: {e}");
            None
        }
    }
}

pub async fn store(cache: &ConnectionManager, url: &str, data: &GameListingResult, ttl_secs: u64) {
    if ttl_secs == 0 {
        return;
    }

    let entry = CachedListing {
        data: data.clone(),
        resolved_at: Utc::now(),
    };
    let payload = match serde_json::to_string(&entry) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(url, "listing cache encode failed: {e}");
            return;
        }
    };

    let mut conn = cache.clone();
    if let Err(e) = redis::cmd("SET")
        .arg(cache_key(url))
        .arg(payload)
        .arg("EX")
        .arg(ttl_secs)
        .query_async::<_, ()>(&mut conn)
        .await
    {
        tracing::warn!(url, "listing cache write failed: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced_per_url() {
        assert_eq!(
            cache_key("https://apps.apple.com/us/app/x/id1"),
            "ampd:game-info:https://apps.apple.com/us/app/x/id1"
        );
    }

    #[test]
    fn cached_entries_keep_nulls() {
        let raw = r#"{"data":{"game_name":"G","package_identifier":null,"logo_url":null},"resolved_at":"2026-01-01T00:00:00Z"}"#;
        let entry = decode_entry("u", raw).unwrap();
        assert_eq!(entry.data.game_name.as_deref(), Some("G"));
        assert_eq!(entry.data.package_identifier, None);
    }

    #[test]
    fn undecodable_entries_are_misses() {
        assert!(decode_entry("u", "not json").is_none());
        assert!(decode_entry("u", r#"{"game_name":"bare result"}"#).is_none());
    }
}
