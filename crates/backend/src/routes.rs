use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{auth, handlers, AppState};

/// Explicit route table. Everything in `protected` goes through `require_auth`.
pub fn api_routes(state: AppState) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(auth::auth_me))
        .route("/calendar/events", get(handlers::list_calendar_events))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        // Auth routes
        .route("/auth/google", post(auth::google_login))
        .route("/auth/logout", post(auth::auth_logout))
        .merge(protected)
        .with_state(state)
}
