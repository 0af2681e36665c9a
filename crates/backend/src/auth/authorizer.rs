//! Per-request session validation.

use std::sync::Arc;

use super::error::AuthError;
use super::jwt;
use super::types::{AuthConfig, RequestContext};

#[derive(Clone)]
pub struct RequestAuthorizer {
    config: Arc<AuthConfig>,
}

impl RequestAuthorizer {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        Self { config }
    }

    /// Validate a raw session token and derive the request context.
    ///
    /// Every failure collapses into `Unauthenticated`; the reason is only logged.
    pub fn authorize(&self, raw_token: &str) -> Result<RequestContext, AuthError> {
        let raw_token = raw_token.trim();
        if raw_token.is_empty() {
            return Err(AuthError::Unauthenticated);
        }

        let claims = jwt::validate_token(&self.config, raw_token).map_err(|e| {
            tracing::debug!("Rejected session token: {}", e);
            AuthError::Unauthenticated
        })?;

        Ok(RequestContext::from(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::issuer::SessionIssuer;
    use crate::auth::types::Claims;
    use crate::testing::{google_identity, test_auth_config, StaticDirectory};
    use chrono::{Duration, Utc};
    use secrecy::SecretString;

    fn authorizer() -> RequestAuthorizer {
        RequestAuthorizer::new(Arc::new(test_auth_config()))
    }

    #[tokio::test]
    async fn test_issue_then_authorize_round_trip() {
        let config = Arc::new(test_auth_config());
        let issuer = SessionIssuer::new(
            config.clone(),
            Arc::new(StaticDirectory::new().with("user-42", &["tenant123"])),
        );
        let session = issuer
            .issue(&google_identity("user-42"), None)
            .await
            .expect("should issue");

        let ctx = RequestAuthorizer::new(config)
            .authorize(&session.access_token)
            .expect("should authorize");
        assert_eq!(
            ctx,
            RequestContext {
                subject_id: "user-42".to_string(),
                tenant_id: "tenant123".to_string(),
            }
        );
    }

    #[test]
    fn test_expired_token_unauthenticated() {
        let config = test_auth_config();
        let now = Utc::now();
        let claims = Claims {
            sub: "user-42".to_string(),
            tenant_id: "tenant123".to_string(),
            iat: (now - Duration::days(7)).timestamp(),
            exp: (now - Duration::seconds(1)).timestamp(),
        };
        let token = jwt::sign_claims(&config, &claims).expect("should sign");

        let result = authorizer().authorize(&token);
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[test]
    fn test_malformed_token_unauthenticated() {
        let result = authorizer().authorize("not-a-token");
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[test]
    fn test_empty_token_unauthenticated() {
        let result = authorizer().authorize("");
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[test]
    fn test_foreign_secret_unauthenticated() {
        let mut foreign = test_auth_config();
        foreign.jwt_secret = SecretString::from("some-other-service-secret".to_string());
        let (token, _) =
            jwt::create_token(&foreign, "user-42", "tenant123").expect("should create token");

        let result = authorizer().authorize(&token);
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }
}
