use std::time::Duration;

use anyhow::{bail, Context, Result};
use jsonwebtoken::Algorithm;
use secrecy::SecretString;

use crate::auth::types::AuthConfig;

const DEFAULT_TOKEN_TTL: &str = "7d";
const DEFAULT_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

#[derive(Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    /// `None` means permissive CORS
    pub cors_allowed_origins: Option<Vec<String>>,
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `DATABASE_URL`: PostgreSQL connection string
    /// - `JWT_SECRET`: Secret key for signing session tokens
    /// - `GOOGLE_CLIENT_ID`: Audience expected in Google ID tokens
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{} must be set", key))
        };

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        let auth = AuthConfig {
            jwt_secret: SecretString::from(required("JWT_SECRET")?),
            algorithm: parse_algorithm(lookup("JWT_ALGORITHM").as_deref().unwrap_or("HS256"))?,
            token_ttl: parse_ttl(
                lookup("JWT_EXPIRES_IN")
                    .as_deref()
                    .unwrap_or(DEFAULT_TOKEN_TTL),
            )?,
            leeway_secs: parse_or(&lookup, "JWT_LEEWAY_SECS", 0)?,
            cookie_name: lookup("AUTH_COOKIE_NAME").unwrap_or_else(|| "auth_token".to_string()),
            secure_cookies: lookup("RUST_ENV").as_deref() == Some("production"),
            google_client_id: required("GOOGLE_CLIENT_ID")?,
            google_tokeninfo_url: lookup("GOOGLE_TOKENINFO_URL")
                .unwrap_or_else(|| DEFAULT_TOKENINFO_URL.to_string()),
            provider_timeout: timeout_secs(&lookup, "PROVIDER_TIMEOUT_SECS")?,
            directory_timeout: timeout_secs(&lookup, "DIRECTORY_TIMEOUT_SECS")?,
            provider_retries: parse_or(&lookup, "PROVIDER_RETRIES", 2)?,
            provider_backoff: Duration::from_millis(parse_or(&lookup, "PROVIDER_BACKOFF_MS", 200)?),
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            port: parse_or(&lookup, "PORT", 3000)?,
            cors_allowed_origins,
            auth,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", key)),
        None => Ok(default),
    }
}

/// External calls always carry a timeout; zero is rejected.
fn timeout_secs(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Duration> {
    let secs: u64 = parse_or(lookup, key, 5)?;
    if secs == 0 {
        bail!("{} must be greater than zero", key);
    }
    Ok(Duration::from_secs(secs))
}

/// Parse a token lifetime such as `7d`, `12h`, `30m` or a bare number of seconds.
pub fn parse_ttl(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    let ttl = match raw.parse::<u64>() {
        Ok(secs) => Duration::from_secs(secs),
        Err(_) => humantime::parse_duration(raw)
            .with_context(|| format!("JWT_EXPIRES_IN has an invalid duration: {}", raw))?,
    };

    if ttl.is_zero() {
        bail!("JWT_EXPIRES_IN must be greater than zero");
    }
    Ok(ttl)
}

/// Only HMAC algorithms work with a shared secret.
pub fn parse_algorithm(raw: &str) -> Result<Algorithm> {
    let algorithm: Algorithm = raw
        .trim()
        .parse()
        .with_context(|| format!("JWT_ALGORITHM is not a known algorithm: {}", raw))?;

    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => bail!("JWT_ALGORITHM {:?} is not supported with a shared secret", other),
    }
}
