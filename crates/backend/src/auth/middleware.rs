//! Authentication middleware layer for protecting routes.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::AppState;

use super::error::AuthError;
use super::types::RequestContext;

/// Middleware function that requires authentication.
///
/// On success the [`RequestContext`] is stored in the request extensions.
/// This can be used with `axum::middleware::from_fn_with_state` to protect routes.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    // An explicit Authorization header wins over the session cookie
    let token = extract_token_from_header(request.headers())
        .or_else(|| {
            extract_token_from_cookie(request.headers(), &state.auth_config.cookie_name)
        });

    let Some(token) = token else {
        tracing::debug!("Missing session token on {}", request.uri().path());
        return ApiError::from(AuthError::Unauthenticated).into_response();
    };

    match state.authorizer.authorize(&token) {
        Ok(ctx) => {
            request.extensions_mut().insert(ctx);
            next.run(request).await
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    /// Fails closed: a handler mounted without `require_auth` never sees a context.
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("No request context on protected route {}", parts.uri.path());
                AuthError::Unauthenticated.into()
            })
    }
}

fn extract_token_from_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;

    for cookie_str in cookie_header.split(';') {
        if let Ok(cookie) = cookie::Cookie::parse(cookie_str.trim()) {
            if cookie.name() == cookie_name && !cookie.value().is_empty() {
                return Some(cookie.value().to_string());
            }
        }
    }

    None
}

fn extract_token_from_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|s| s.trim().to_string())
}

/// Build an auth cookie string.
pub fn build_auth_cookie(name: &str, value: &str, max_age_secs: u64, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
        name, value, max_age_secs, secure
    )
}
