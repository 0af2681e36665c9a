//! Auth-related types and configuration.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::Algorithm;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Session JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (identity provider subject id)
    pub sub: String,
    /// Tenant the session is scoped to
    pub tenant_id: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

impl Claims {
    pub fn new(
        subject: impl Into<String>,
        tenant_id: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            sub: subject.into(),
            tenant_id: tenant_id.into(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }
}

/// Identity verified by an external identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Issuer-assigned subject id, opaque to us
    pub subject: String,
    pub issuer: String,
    /// Only set when the provider marked the address as verified
    pub email: Option<String>,
}

/// Per-request authentication context derived from a valid session token.
///
/// Handlers must scope every data access to `tenant_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub tenant_id: String,
    pub subject_id: String,
}

impl From<Claims> for RequestContext {
    fn from(claims: Claims) -> Self {
        Self {
            tenant_id: claims.tenant_id,
            subject_id: claims.sub,
        }
    }
}

/// Auth configuration loaded from environment
#[derive(Debug)]
pub struct AuthConfig {
    pub jwt_secret: SecretString,
    /// HMAC algorithm used to sign session tokens
    pub algorithm: Algorithm,
    pub token_ttl: Duration,
    /// Clock skew tolerated on `exp`; zero means strict expiry
    pub leeway_secs: u64,
    pub cookie_name: String,
    pub secure_cookies: bool,
    /// Expected `aud` of Google ID tokens
    pub google_client_id: String,
    pub google_tokeninfo_url: String,
    pub provider_timeout: Duration,
    pub directory_timeout: Duration,
    /// Extra attempts when the identity provider is unavailable
    pub provider_retries: u32,
    pub provider_backoff: Duration,
}
