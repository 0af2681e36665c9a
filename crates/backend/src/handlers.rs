use axum::extract::{Json, State};
use shared_types::{ApiInfoResponse, CalendarEvent, HealthResponse};

use crate::auth::types::RequestContext;
use crate::db::calendar_events;
use crate::error::ApiResult;
use crate::AppState;

pub async fn root() -> Json<ApiInfoResponse> {
    Json(ApiInfoResponse {
        message: "Calendar Management API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        docs: "/api-docs".to_string(),
        health: "/health".to_string(),
    })
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

// Calendar handlers. The tenant always comes from the session, never from the request.
pub async fn list_calendar_events(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> ApiResult<Json<Vec<CalendarEvent>>> {
    let mut conn = state.pool.get().await?;

    let events = calendar_events::list_for_tenant(&mut conn, &ctx.tenant_id).await?;
    tracing::debug!(
        "Listed {} calendar events for tenant {}",
        events.len(),
        ctx.tenant_id
    );

    Ok(Json(events))
}
