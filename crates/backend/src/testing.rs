//! Test doubles for the external collaborators of the auth boundary.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::Algorithm;
use secrecy::SecretString;

use crate::auth::types::{AuthConfig, Identity};
use crate::auth::{AuthError, CredentialVerifier, RequestAuthorizer, SessionIssuer};
use crate::db;
use crate::directory::{DirectoryError, TenantDirectory, TenantLookup};
use crate::AppState;

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: SecretString::from("test-secret-key-for-testing-only".to_string()),
        algorithm: Algorithm::HS256,
        token_ttl: Duration::from_secs(7 * 24 * 60 * 60),
        leeway_secs: 0,
        cookie_name: "auth_token".to_string(),
        secure_cookies: false,
        google_client_id: "test".to_string(),
        google_tokeninfo_url: "http://127.0.0.1:1/tokeninfo".to_string(),
        provider_timeout: Duration::from_secs(1),
        directory_timeout: Duration::from_secs(1),
        provider_retries: 2,
        provider_backoff: Duration::from_millis(1),
    }
}

pub fn google_identity(subject: &str) -> Identity {
    Identity {
        subject: subject.to_string(),
        issuer: "accounts.google.com".to_string(),
        email: None,
    }
}

/// Application state wired with fakes. The pool never connects unless a
/// handler actually asks it for a connection.
pub fn test_state(
    verifier: impl CredentialVerifier + 'static,
    directory: impl TenantDirectory + 'static,
) -> AppState {
    let config = Arc::new(test_auth_config());
    let pool = db::establish_connection_pool("postgres://localhost:1/unused")
        .expect("pool builds lazily");

    AppState {
        pool,
        auth_config: config.clone(),
        verifier: Arc::new(verifier),
        issuer: Arc::new(SessionIssuer::new(config.clone(), Arc::new(directory))),
        authorizer: RequestAuthorizer::new(config),
    }
}

/// Verifier that knows a fixed set of external tokens.
pub struct StaticVerifier {
    tokens: HashMap<String, Identity>,
    unavailable: bool,
}

impl StaticVerifier {
    /// Accepts `valid-google-token` as subject `user-42`.
    pub fn google() -> Self {
        let mut tokens = HashMap::new();
        tokens.insert("valid-google-token".to_string(), google_identity("user-42"));
        Self {
            tokens,
            unavailable: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            tokens: HashMap::new(),
            unavailable: true,
        }
    }
}

#[async_trait]
impl CredentialVerifier for StaticVerifier {
    async fn verify(&self, external_token: &str) -> Result<Identity, AuthError> {
        if self.unavailable {
            return Err(AuthError::ProviderUnavailable("connection refused".to_string()));
        }
        self.tokens
            .get(external_token)
            .cloned()
            .ok_or_else(|| AuthError::InvalidCredential("unknown token".to_string()))
    }
}

/// Fails with `ProviderUnavailable` for the first `failures` calls.
pub struct FlakyVerifier {
    failures: usize,
    pub calls: AtomicUsize,
}

impl FlakyVerifier {
    pub fn new(failures: usize) -> Self {
        Self {
            failures,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CredentialVerifier for FlakyVerifier {
    async fn verify(&self, external_token: &str) -> Result<Identity, AuthError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(AuthError::ProviderUnavailable("timeout".to_string()));
        }
        StaticVerifier::google().verify(external_token).await
    }
}

/// In-memory membership table keyed by subject.
#[derive(Default)]
pub struct StaticDirectory {
    memberships: HashMap<String, Vec<String>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, subject: &str, tenants: &[&str]) -> Self {
        self.memberships.insert(
            subject.to_string(),
            tenants.iter().map(|t| t.to_string()).collect(),
        );
        self
    }
}

#[async_trait]
impl TenantDirectory for StaticDirectory {
    async fn lookup_tenant(&self, identity: &Identity) -> Result<TenantLookup, DirectoryError> {
        let tenants = self
            .memberships
            .get(&identity.subject)
            .cloned()
            .unwrap_or_default();
        Ok(TenantLookup::from_candidates(tenants))
    }
}

pub enum FailingDirectory {
    /// Backend answers with an error
    Error,
    /// Backend never answers
    Hang,
}

#[async_trait]
impl TenantDirectory for FailingDirectory {
    async fn lookup_tenant(&self, _identity: &Identity) -> Result<TenantLookup, DirectoryError> {
        match self {
            FailingDirectory::Error => Err(anyhow::anyhow!("connection reset").into()),
            FailingDirectory::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}
