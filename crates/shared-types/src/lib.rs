use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Calendar data
// ============================================================================

/// Calendar event matching database column order exactly.
/// Always owned by exactly one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "diesel", derive(diesel::Queryable))]
pub struct CalendarEvent {
    pub id: Uuid,
    pub tenant_id: String,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Auth API types
// ============================================================================

/// Body of `POST /auth/google`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleLoginRequest {
    /// Google ID token obtained by the client
    pub token: String,
    /// Tenant to sign into when the user belongs to several
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
}

/// Response of `GET /auth/me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUserResponse {
    pub subject_id: String,
    pub tenant_id: String,
}

// ============================================================================
// Misc
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiInfoResponse {
    pub message: String,
    pub version: String,
    pub docs: String,
    pub health: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
