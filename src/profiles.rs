// SPDX-License-Identifier: EUPL-1.2

//! Lookup of the calling staff profile.
//!
//! Profiles live in the hosted Postgres owned by the BaaS; this service only
//! reads them and never runs migrations against that schema.

use std::sync::Arc;

use anyhow::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::permissions::{AuthorizationSubject, Role};

pub type Profiles = Arc<dyn ProfileDirectory>;

#[async_trait::async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// The subject for `profile_id`, or `None` if no such profile exists.
    async fn find_subject(&self, profile_id: &str) -> Result<Option<AuthorizationSubject>>;
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    role: String,
    is_active: bool,
}

impl From<ProfileRow> for AuthorizationSubject {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id.to_string(),
            role: Role::parse(&row.role),
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgProfileDirectory {
    pool: PgPool,
}

impl PgProfileDirectory {
    /// Build a pool without connecting; the first lookup opens a connection.
    pub fn connect_lazy(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    pub fn shared(self) -> Profiles {
        Arc::new(self)
    }
}

#[async_trait::async_trait]
impl ProfileDirectory for PgProfileDirectory {
    async fn find_subject(&self, profile_id: &str) -> Result<Option<AuthorizationSubject>> {
        let Ok(id) = Uuid::parse_str(profile_id) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT id, role, is_active FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }
}

#[cfg(test)]
pub use memory::MemoryProfiles;
