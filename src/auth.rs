// SPDX-License-Identifier: EUPL-1.2

//! Shared-key check for service-to-service calls.
//!
//! The dashboard backend calls `POST /permissions/check` on behalf of an
//! already signed-in user. When `AMPD_API_KEY` is configured the caller must
//! present it in the `X-Api-Key` header.

use axum::http::HeaderMap;

use crate::error::GatewayError;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Accept the request if no key is configured or the header matches.
pub fn require_api_key(expected: Option<&str>, headers: &HeaderMap) -> Result<(), GatewayError> {
    let Some(expected) = expected else {
        return Ok(());
    };

    let presented = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if constant_time_eq(presented.as_bytes(), expected.as_bytes()) {
        Ok(())
    } else {
        Err(GatewayError::Unauthorized)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn open_when_unconfigured() {
        assert!(require_api_key(None, &HeaderMap::new()).is_ok());
    }

    #[test]
    fn key_must_match() {
        let mut headers = HeaderMap::new();
        assert!(require_api_key(Some("secret"), &headers).is_err());

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("secreT"));
        assert!(require_api_key(Some("secret"), &headers).is_err());

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("secret"));
        assert!(require_api_key(Some("secret"), &headers).is_ok());
    }
}
