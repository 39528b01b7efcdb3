//! Session field endpoints.
//!
//! The session is identified by the configured cookie only; these routes
//! never take an identifier in the path or body.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, ServerError};
use crate::state::AppState;

/// Longest accepted field name.
const MAX_KEY_LEN: usize = 256;

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// A single session field.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FieldResponse {
    /// Field name.
    pub key: String,
    /// Field value.
    pub value: String,
}

/// Body for writing a field.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetFieldRequest {
    /// New value.
    pub value: String,
}

/// Store statistics.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    /// Live sessions.
    pub sessions: usize,
    /// Fields across all sessions.
    pub fields: usize,
    /// Session idle lifetime in seconds.
    pub max_age_secs: u64,
    /// Sweep period in seconds.
    pub sweep_interval_secs: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/session/{key} - Read a field from the caller's session.
#[utoipa::path(
    get,
    path = "/api/v1/session/{key}",
    params(("key" = String, Path, description = "Field name")),
    responses(
        (status = 200, description = "Field value", body = FieldResponse),
        (status = 401, description = "No session cookie", body = ErrorResponse),
        (status = 404, description = "Unknown session or field", body = ErrorResponse),
    ),
    tag = "session"
)]
pub async fn get_field_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(key): Path<String>,
) -> Result<Json<FieldResponse>, ServerError> {
    let value = state.manager.get(&headers, &key)?;
    Ok(Json(FieldResponse { key, value }))
}

/// PUT /api/v1/session/{key} - Write a field, creating a session if needed.
#[utoipa::path(
    put,
    path = "/api/v1/session/{key}",
    params(("key" = String, Path, description = "Field name")),
    request_body = SetFieldRequest,
    responses(
        (status = 204, description = "Field stored; Set-Cookie carries the session"),
        (status = 400, description = "Malformed cookie or key", body = ErrorResponse),
        (status = 404, description = "Cookie names an unknown session", body = ErrorResponse),
    ),
    tag = "session"
)]
pub async fn set_field_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(key): Path<String>,
    Json(body): Json<SetFieldRequest>,
) -> Result<Response, ServerError> {
    if key.len() > MAX_KEY_LEN {
        return Err(ServerError::BadRequest(format!(
            "key exceeds {MAX_KEY_LEN} bytes"
        )));
    }

    let mut response = StatusCode::NO_CONTENT.into_response();
    state
        .manager
        .set(response.headers_mut(), &headers, key, body.value)?;
    Ok(response)
}

/// DELETE /api/v1/session - End the caller's session.
#[utoipa::path(
    delete,
    path = "/api/v1/session",
    responses(
        (status = 204, description = "Session removed; Set-Cookie expires the cookie"),
        (status = 400, description = "Malformed cookie", body = ErrorResponse),
    ),
    tag = "session"
)]
pub async fn destroy_session_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let mut response = StatusCode::NO_CONTENT.into_response();
    let removed = state.manager.destroy(response.headers_mut(), &headers)?;
    debug!(removed, "Session destroy requested");
    Ok(response)
}

/// GET /api/v1/stats - Store statistics.
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    responses(
        (status = 200, description = "Store statistics", body = StatsResponse),
    ),
    tag = "session"
)]
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.manager.stats();
    Json(StatsResponse {
        sessions: stats.sessions,
        fields: stats.fields,
        max_age_secs: stats.max_age.as_secs(),
        sweep_interval_secs: stats.sweep_interval.as_secs(),
    })
}
