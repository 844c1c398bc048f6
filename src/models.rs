// SPDX-License-Identifier: EUPL-1.2

//! Domain models for the AMPD gateway.

use serde::{Deserialize, Serialize};

use crate::permissions::{Action, ResourceKind};

/// Metadata scraped from a storefront listing.
///
/// Every field is optional: partial results are expected whenever the
/// storefront markup does not carry a field in any of the places we look.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameListingResult {
    pub game_name: Option<String>,
    /// iOS bundle id or Android package name.
    pub package_identifier: Option<String>,
    /// Absolute URL of a square icon image.
    pub logo_url: Option<String>,
}

impl GameListingResult {
    /// Fill `game_name` from `candidate` unless an earlier step already set it.
    ///
    /// The candidate is only evaluated when the field is still empty, so later
    /// extraction rules never run for fields a higher-priority rule produced.
    pub fn or_game_name(mut self, candidate: impl FnOnce() -> Option<String>) -> Self {
        if self.game_name.is_none() {
            self.game_name = candidate();
        }
        self
    }

    pub fn or_package_identifier(mut self, candidate: impl FnOnce() -> Option<String>) -> Self {
        if self.package_identifier.is_none() {
            self.package_identifier = candidate();
        }
        self
    }

    pub fn or_logo_url(mut self, candidate: impl FnOnce() -> Option<String>) -> Self {
        if self.logo_url.is_none() {
            self.logo_url = candidate();
        }
        self
    }

    pub fn is_complete(&self) -> bool {
        self.game_name.is_some() && self.package_identifier.is_some() && self.logo_url.is_some()
    }
}

/// Response envelope for `POST /resolve-game-info`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub data: GameListingResult,
}

/// Request body for `POST /permissions/check`.
#[derive(Debug, Deserialize)]
pub struct PermissionCheckRequest {
    /// Profile id of the caller (not the auth-provider user id).
    pub profile_id: String,
    /// Profile id the governing Account is assigned to.
    pub assigned_user_id: String,
    pub action: Action,
    pub resource: ResourceKind,
    /// Display name used in the confirmation copy.
    pub resource_name: Option<String>,
}

/// Response for `POST /permissions/check`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PermissionCheckResponse {
    pub allowed: bool,
    pub message: String,
}
