//! Session issuance: tenant resolution plus token signing.

use std::sync::Arc;

use crate::directory::{DirectoryError, TenantDirectory, TenantLookup};

use super::error::AuthError;
use super::jwt;
use super::types::{AuthConfig, Claims, Identity};

/// A freshly signed session token together with its claims.
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub access_token: String,
    pub claims: Claims,
}

pub struct SessionIssuer {
    config: Arc<AuthConfig>,
    directory: Arc<dyn TenantDirectory>,
}

impl SessionIssuer {
    pub fn new(config: Arc<AuthConfig>, directory: Arc<dyn TenantDirectory>) -> Self {
        Self { config, directory }
    }

    /// Resolve the identity's tenant and sign a session token for it.
    ///
    /// `requested_tenant` disambiguates identities with several memberships;
    /// it must name a tenant the identity is an active member of.
    pub async fn issue(
        &self,
        identity: &Identity,
        requested_tenant: Option<&str>,
    ) -> Result<SessionToken, AuthError> {
        let timeout = self.config.directory_timeout;
        let lookup = tokio::time::timeout(timeout, self.directory.lookup_tenant(identity))
            .await
            .map_err(|_| DirectoryError::Timeout(timeout))??;

        let tenant_id = select_tenant(lookup, requested_tenant)?;

        let (access_token, claims) =
            jwt::create_token(&self.config, &identity.subject, &tenant_id)
                .map_err(AuthError::Signing)?;

        tracing::info!(
            "Issued session for {} ({}) in tenant {}",
            identity.subject,
            identity.issuer,
            tenant_id
        );

        Ok(SessionToken {
            access_token,
            claims,
        })
    }
}

fn select_tenant(lookup: TenantLookup, requested: Option<&str>) -> Result<String, AuthError> {
    match (lookup, requested) {
        (TenantLookup::NotFound, _) => Err(AuthError::NoTenantMembership),
        (TenantLookup::Found(tenant), None) => Ok(tenant),
        (TenantLookup::Found(tenant), Some(requested)) if tenant == requested => Ok(tenant),
        (TenantLookup::Ambiguous(_), None) => Err(AuthError::MultipleTenantMemberships),
        (TenantLookup::Ambiguous(candidates), Some(requested)) => candidates
            .into_iter()
            .find(|c| c == requested)
            .ok_or(AuthError::NoTenantMembership),
        (TenantLookup::Found(_), Some(_)) => Err(AuthError::NoTenantMembership),
    }
}
