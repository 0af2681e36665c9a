//! Verification of identity tokens issued by an external provider.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use super::error::AuthError;
use super::types::{AuthConfig, Identity};

const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Turns an externally issued token into a verified [`Identity`].
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// # Errors
    ///
    /// - `InvalidCredential` if the token is empty, malformed, badly signed,
    ///   expired, or was issued for another audience
    /// - `ProviderUnavailable` if the provider could not be consulted
    async fn verify(&self, external_token: &str) -> Result<Identity, AuthError>;
}

/// Verifies Google ID tokens against Google's token-info endpoint.
pub struct GoogleVerifier {
    client: reqwest::Client,
    tokeninfo_url: String,
    client_id: String,
}

impl GoogleVerifier {
    pub fn new(config: &AuthConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.provider_timeout)
            .build()?;

        Ok(Self {
            client,
            tokeninfo_url: config.google_tokeninfo_url.clone(),
            client_id: config.google_client_id.clone(),
        })
    }
}

#[async_trait]
impl CredentialVerifier for GoogleVerifier {
    async fn verify(&self, external_token: &str) -> Result<Identity, AuthError> {
        let token = external_token.trim();
        if token.is_empty() {
            return Err(AuthError::InvalidCredential("empty token".to_string()));
        }

        let response = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", token)])
            .send()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            tracing::debug!("Token info endpoint rejected token: {}", status);
            return Err(AuthError::InvalidCredential(format!(
                "provider rejected token ({})",
                status
            )));
        }
        if !status.is_success() {
            return Err(AuthError::ProviderUnavailable(format!(
                "provider returned {}",
                status
            )));
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(format!("invalid token info: {}", e)))?;

        info.into_identity(&self.client_id, Utc::now().timestamp())
    }
}

/// Subset of Google's token-info payload. Google encodes most values as strings.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    iss: String,
    aud: String,
    sub: String,
    email: Option<String>,
    email_verified: Option<Value>,
    exp: Value,
}

impl TokenInfo {
    fn into_identity(self, client_id: &str, now: i64) -> Result<Identity, AuthError> {
        if self.aud != client_id {
            return Err(AuthError::InvalidCredential(
                "token issued for another audience".to_string(),
            ));
        }
        if !GOOGLE_ISSUERS.contains(&self.iss.as_str()) {
            return Err(AuthError::InvalidCredential(format!(
                "unexpected issuer {}",
                self.iss
            )));
        }
        match value_as_i64(&self.exp) {
            Some(exp) if exp > now => {}
            _ => return Err(AuthError::InvalidCredential("token expired".to_string())),
        }
        if self.sub.is_empty() {
            return Err(AuthError::InvalidCredential("missing subject".to_string()));
        }

        let email_verified = self.email_verified.as_ref().is_some_and(value_is_true);

        Ok(Identity {
            subject: self.sub,
            issuer: GOOGLE_ISSUERS[0].to_string(),
            email: self.email.filter(|_| email_verified),
        })
    }
}

fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn value_is_true(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s == "true",
        _ => false,
    }
}

/// Verify with bounded retries on `ProviderUnavailable`.
///
/// Backoff doubles after every failed attempt. Any other error is returned
/// immediately.
pub async fn verify_with_retry(
    verifier: &dyn CredentialVerifier,
    external_token: &str,
    retries: u32,
    backoff: Duration,
) -> Result<Identity, AuthError> {
    let mut attempt = 0;
    loop {
        match verifier.verify(external_token).await {
            Err(AuthError::ProviderUnavailable(reason)) if attempt < retries => {
                let delay = backoff.saturating_mul(2u32.saturating_pow(attempt));
                tracing::warn!(
                    "Identity provider unavailable (attempt {}/{}): {}; retrying in {:?}",
                    attempt + 1,
                    retries + 1,
                    reason,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}
