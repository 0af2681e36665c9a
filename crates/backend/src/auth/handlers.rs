//! Authentication HTTP handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use shared_types::{AccessTokenResponse, AuthUserResponse, GoogleLoginRequest};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

use super::{
    build_auth_cookie, error::AuthError, types::RequestContext, verifier::verify_with_retry,
};

/// Exchange a Google ID token for a tenant-scoped session token.
///
/// The token is returned in the body and also set as an HTTP-only cookie.
pub async fn google_login(
    State(state): State<AppState>,
    payload: Result<Json<GoogleLoginRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(payload) = payload.map_err(login_body_error)?;
    let config = &state.auth_config;

    let identity = verify_with_retry(
        state.verifier.as_ref(),
        &payload.token,
        config.provider_retries,
        config.provider_backoff,
    )
    .await?;

    tracing::info!("Google login attempt from {}", identity.subject);
    tracing::debug!(
        "Verified email for {}: {}",
        identity.subject,
        identity.email.as_deref().unwrap_or("none")
    );

    let session = state
        .issuer
        .issue(&identity, payload.tenant_id.as_deref())
        .await?;

    tracing::debug!(
        "Session for tenant {} expires at {}",
        session.claims.tenant_id,
        session.claims.exp
    );

    let cookie = build_auth_cookie(
        &config.cookie_name,
        &session.access_token,
        config.token_ttl.as_secs(),
        config.secure_cookies,
    );

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(AccessTokenResponse {
            access_token: session.access_token,
        }),
    )
        .into_response())
}

/// JSON that lacks a usable `token` is a malformed credential; anything else
/// that fails to parse is a bad request.
fn login_body_error(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(e) => {
            AuthError::InvalidCredential(format!("login body: {}", e.body_text())).into()
        }
        other => ApiError::BadRequest(other.body_text()),
    }
}

/// Get the subject and tenant of the current session.
pub async fn auth_me(ctx: RequestContext) -> Json<AuthUserResponse> {
    Json(AuthUserResponse {
        subject_id: ctx.subject_id,
        tenant_id: ctx.tenant_id,
    })
}

/// Logout - clear auth cookie.
pub async fn auth_logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = build_auth_cookie(
        &state.auth_config.cookie_name,
        "",
        0,
        state.auth_config.secure_cookies,
    );

    (StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)])
}
