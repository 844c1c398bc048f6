// SPDX-License-Identifier: EUPL-1.2

//! Ownership checks for accounts, games and campaigns.
//!
//! A game or campaign is governed by its parent account's `assigned_user_id`.
//! Callers resolve which assignment applies before asking; nothing in here
//! knows about entity relationships.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Staff role stored on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    /// Account manager.
    Am,
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Parse a stored role string. Anything unrecognised maps to `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "admin" => Role::Admin,
            "am" => Role::Am,
            _ => Role::Unknown,
        }
    }
}

/// The caller, as returned by the profile lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationSubject {
    /// Profile id, distinct from the auth-provider user id.
    pub id: String,
    pub role: Role,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Account,
    Game,
    Campaign,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKind::Account => "account",
            ResourceKind::Game => "game",
            ResourceKind::Campaign => "campaign",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Edit,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Edit => "edit",
            Action::Delete => "delete",
        })
    }
}

/// Whether `subject` may edit or delete a resource assigned to `assigned_user_id`.
///
/// - no subject → `false`
/// - `admin` → `true` for every resource
/// - `am` → `true` only for resources assigned to the subject's own profile
/// - unknown role → `false`
///
/// The subject is assumed to have passed the active-account gate already.
pub fn can_manage(subject: Option<&AuthorizationSubject>, assigned_user_id: &str) -> bool {
    let Some(subject) = subject else {
        return false;
    };

    match subject.role {
        Role::Admin => true,
        Role::Am => subject.id == assigned_user_id,
        Role::Unknown => false,
    }
}

/// Dialog copy for an action, chosen from the result of [`can_manage`].
pub fn action_message(
    allowed: bool,
    action: Action,
    kind: ResourceKind,
    name: Option<&str>,
) -> String {
    if !allowed {
        return format!("You can only {action} {kind}s assigned to you.");
    }

    let target = match name {
        Some(name) if !name.trim().is_empty() => format!("{kind} \"{}\"", name.trim()),
        _ => format!("this {kind}"),
    };

    match action {
        Action::Delete => {
            format!("This will permanently delete {target}. This action cannot be undone.")
        }
        Action::Edit => format!("You are about to edit {target}."),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
