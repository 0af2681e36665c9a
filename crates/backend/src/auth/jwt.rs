//! Session JWT signing and validation.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;

use super::types::{AuthConfig, Claims};

/// Create a new session token for a subject within a tenant.
pub fn create_token(
    config: &AuthConfig,
    subject: &str,
    tenant_id: &str,
) -> Result<(String, Claims), jsonwebtoken::errors::Error> {
    let claims = Claims::new(subject, tenant_id, Utc::now(), config.token_ttl);
    let token = sign_claims(config, &claims)?;
    Ok((token, claims))
}

/// Sign an arbitrary set of claims with the process-wide secret.
pub fn sign_claims(
    config: &AuthConfig,
    claims: &Claims,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::new(config.algorithm),
        claims,
        &EncodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes()),
    )
}

/// Validate a session token and return claims.
///
/// Checks signature, algorithm and `exp` (with the configured leeway only).
pub fn validate_token(
    config: &AuthConfig,
    token: &str,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(config.algorithm);
    validation.leeway = config.leeway_secs;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_auth_config;
    use chrono::Duration;
    use jsonwebtoken::Algorithm;
    use secrecy::SecretString;

    #[test]
    fn test_create_and_validate_token() {
        let config = test_auth_config();
        let (token, issued) =
            create_token(&config, "user-42", "tenant123").expect("should create token");

        let claims = validate_token(&config, &token).expect("should validate token");
        assert_eq!(claims, issued);
        assert_eq!(claims.sub, "user-42");
        assert_eq!(claims.tenant_id, "tenant123");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_invalid_token_rejected() {
        let config = test_auth_config();
        let result = validate_token(&config, "invalid-token");
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let config = test_auth_config();
        let (token, _) = create_token(&config, "user-42", "tenant123").expect("should create token");

        let mut wrong_config = config;
        wrong_config.jwt_secret = SecretString::from("wrong-secret".to_string());

        let result = validate_token(&wrong_config, &token);
        assert!(result.is_err());
    }

    #[test]
    fn test_expired_token_rejected_without_leeway() {
        let config = test_auth_config();
        let now = Utc::now();
        let claims = Claims {
            sub: "user-42".to_string(),
            tenant_id: "tenant123".to_string(),
            iat: (now - Duration::hours(1)).timestamp(),
            exp: (now - Duration::seconds(1)).timestamp(),
        };
        let token = sign_claims(&config, &claims).expect("should sign");

        assert!(validate_token(&config, &token).is_err());
    }

    #[test]
    fn test_configured_leeway_accepts_recently_expired() {
        let mut config = test_auth_config();
        config.leeway_secs = 60;
        let now = Utc::now();
        let claims = Claims {
            sub: "user-42".to_string(),
            tenant_id: "tenant123".to_string(),
            iat: (now - Duration::hours(1)).timestamp(),
            exp: (now - Duration::seconds(5)).timestamp(),
        };
        let token = sign_claims(&config, &claims).expect("should sign");

        assert!(validate_token(&config, &token).is_ok());
    }

    #[test]
    fn test_algorithm_mismatch_rejected() {
        let config = test_auth_config();
        let (token, _) = create_token(&config, "user-42", "tenant123").expect("should create token");

        let mut other = test_auth_config();
        other.algorithm = Algorithm::HS512;

        assert!(validate_token(&other, &token).is_err());
    }

    #[test]
    fn test_token_without_tenant_rejected() {
        #[derive(serde::Serialize)]
        struct NoTenant {
            sub: String,
            iat: i64,
            exp: i64,
        }

        let config = test_auth_config();
        let now = Utc::now();
        let token = encode(
            &Header::new(config.algorithm),
            &NoTenant {
                sub: "user-42".to_string(),
                iat: now.timestamp(),
                exp: (now + Duration::hours(1)).timestamp(),
            },
            &EncodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes()),
        )
        .expect("should encode");

        assert!(validate_token(&config, &token).is_err());
    }
}
