//! Tenant directory: resolves which tenant a verified identity belongs to.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use thiserror::Error;

use crate::auth::types::Identity;
use crate::db::{memberships, DbPool};

/// Outcome of a membership lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantLookup {
    Found(String),
    NotFound,
    /// Several active memberships, sorted by tenant id
    Ambiguous(Vec<String>),
}

impl TenantLookup {
    pub fn from_candidates(mut tenant_ids: Vec<String>) -> Self {
        tenant_ids.sort();
        tenant_ids.dedup();

        match tenant_ids.len() {
            0 => TenantLookup::NotFound,
            1 => TenantLookup::Found(tenant_ids.remove(0)),
            _ => TenantLookup::Ambiguous(tenant_ids),
        }
    }
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Resolve the active tenant memberships of an identity.
    async fn lookup_tenant(&self, identity: &Identity) -> Result<TenantLookup, DirectoryError>;
}

/// Directory backed by the `users` / `tenant_memberships` tables.
pub struct PgTenantDirectory {
    pool: DbPool,
}

impl PgTenantDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantDirectory for PgTenantDirectory {
    async fn lookup_tenant(&self, identity: &Identity) -> Result<TenantLookup, DirectoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .context("Failed to get DB connection")?;

        let tenant_ids =
            memberships::active_tenant_ids(&mut conn, &identity.issuer, &identity.subject).await?;

        Ok(TenantLookup::from_candidates(tenant_ids))
    }
}
