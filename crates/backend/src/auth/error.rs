//! Errors produced by the authentication boundary.

use thiserror::Error;

use crate::directory::DirectoryError;

#[derive(Debug, Error)]
pub enum AuthError {
    /// External token is malformed, badly signed, expired, or for another audience
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// The identity provider could not be reached or answered with a server error
    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("identity has no active tenant membership")]
    NoTenantMembership,

    #[error("identity belongs to several tenants and none was selected")]
    MultipleTenantMemberships,

    #[error("tenant directory unavailable: {0}")]
    DirectoryUnavailable(#[from] DirectoryError),

    /// Session token missing or invalid. Never carries the reason.
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("failed to sign session token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Whether the caller may retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AuthError::ProviderUnavailable(_) | AuthError::DirectoryUnavailable(_)
        )
    }
}
