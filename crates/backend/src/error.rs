//! Unified error handling for the backend API.
//!
//! This module provides a centralized error type that implements `IntoResponse`,
//! allowing handlers to use `?` operator naturally while returning appropriate
//! HTTP status codes and error messages.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::AuthError;

/// API error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Unified error type for API handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Database connection pool error
    #[error("Database connection error")]
    ConnectionPool(#[source] diesel_async::pooled_connection::deadpool::PoolError),

    /// Database query error
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    /// Generic database/anyhow error
    #[error("{0}")]
    Internal(#[from] anyhow::Error),

    /// Request body could not be parsed
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Authentication boundary failure
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl From<diesel_async::pooled_connection::deadpool::PoolError> for ApiError {
    fn from(err: diesel_async::pooled_connection::deadpool::PoolError) -> Self {
        ApiError::ConnectionPool(err)
    }
}

fn auth_status(err: &AuthError) -> (StatusCode, String) {
    match err {
        AuthError::InvalidCredential(reason) => {
            tracing::info!("Rejected external credential: {}", reason);
            (StatusCode::UNAUTHORIZED, "Invalid credential".to_string())
        }
        AuthError::Unauthenticated => (StatusCode::UNAUTHORIZED, "Unauthenticated".to_string()),
        AuthError::NoTenantMembership => (
            StatusCode::FORBIDDEN,
            "No active tenant membership".to_string(),
        ),
        AuthError::MultipleTenantMemberships => (
            StatusCode::FORBIDDEN,
            "Multiple tenant memberships; select a tenant_id".to_string(),
        ),
        AuthError::ProviderUnavailable(reason) => {
            tracing::warn!("Identity provider unavailable: {}", reason);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "Identity provider unavailable".to_string(),
            )
        }
        AuthError::DirectoryUnavailable(e) => {
            tracing::error!("Tenant directory unavailable: {:?}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "Tenant directory unavailable".to_string(),
            )
        }
        AuthError::Signing(e) => {
            tracing::error!("Session signing failed: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let retryable = matches!(&self, ApiError::Auth(e) if e.is_retryable());
        let (status, error_message, details) = match &self {
            ApiError::ConnectionPool(e) => {
                tracing::error!("Connection pool error: {:?}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Database connection unavailable".to_string(),
                    None,
                )
            }
            ApiError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                match e {
                    diesel::result::Error::NotFound => (
                        StatusCode::NOT_FOUND,
                        "Resource not found".to_string(),
                        None,
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Database operation failed".to_string(),
                        None,
                    ),
                }
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            ApiError::BadRequest(details) => (
                StatusCode::BAD_REQUEST,
                "Bad request".to_string(),
                Some(details.clone()),
            ),
            ApiError::Auth(e) => {
                let (status, message) = auth_status(e);
                (status, message, None)
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
            details,
        });

        let mut response = (status, body).into_response();
        if retryable {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
        }
        response
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::DirectoryError;
    use std::time::Duration;

    fn status_of(err: AuthError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_auth_error_status_mapping() {
        assert_eq!(
            status_of(AuthError::InvalidCredential("bad".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(AuthError::Unauthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::NoTenantMembership), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(AuthError::MultipleTenantMemberships),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AuthError::ProviderUnavailable("down".to_string())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(AuthError::DirectoryUnavailable(DirectoryError::Timeout(
                Duration::from_secs(5)
            ))),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_retryable_errors_carry_retry_after() {
        let response =
            ApiError::from(AuthError::ProviderUnavailable("down".to_string())).into_response();
        assert!(response.headers().contains_key(header::RETRY_AFTER));

        let response = ApiError::from(AuthError::Unauthenticated).into_response();
        assert!(!response.headers().contains_key(header::RETRY_AFTER));
    }

    #[tokio::test]
    async fn test_bad_request_has_json_details() {
        let response = ApiError::BadRequest("expected value".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("should read body");
        let body: ErrorResponse = serde_json::from_slice(&bytes).expect("should be json");
        assert_eq!(body.error, "Bad request");
        assert_eq!(body.details.as_deref(), Some("expected value"));
    }

    #[test]
    fn test_retryable_errors() {
        assert!(AuthError::ProviderUnavailable("down".to_string()).is_retryable());
        assert!(!AuthError::Unauthenticated.is_retryable());
        assert!(!AuthError::NoTenantMembership.is_retryable());
    }
}
