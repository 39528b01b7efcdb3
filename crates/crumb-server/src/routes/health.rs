//! Liveness endpoint.

use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// Liveness report with a glance at the session store.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// `ok` while the background sweep is running, `degraded` once it has stopped.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Live sessions in the store.
    pub sessions: usize,
    /// Whether idle sessions are still being swept.
    pub sweeping: bool,
}

/// GET /health - Service liveness and store summary.
///
/// A stopped sweep means idle sessions are no longer reclaimed, so the
/// status reads `degraded` while requests are still served.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    ),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let sweeping = state.manager.is_expunging();
    Json(HealthResponse {
        status: if sweeping { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sessions: state.manager.len(),
        sweeping,
    })
}

/// Routes outside the versioned API.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use crumb_session::Manager;
    use tower::ServiceExt;

    use crate::config::ServerConfig;

    async fn fetch(state: AppState) -> HealthResponse {
        let app = health_routes().with_state(state);
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_reports_live_sessions() {
        let manager = Manager::new("sid");
        let state = AppState::new(manager.clone(), ServerConfig::new());

        let empty = fetch(state.clone()).await;
        assert_eq!(empty.status, "ok");
        assert_eq!(empty.sessions, 0);
        assert!(empty.sweeping);

        let request = Request::builder().uri("/").body(()).unwrap();
        let mut headers = axum::http::HeaderMap::new();
        manager.set(&mut headers, &request, "foo", "bar").unwrap();
        assert!(headers.contains_key(header::SET_COOKIE));

        assert_eq!(fetch(state).await.sessions, 1);
    }

    #[tokio::test]
    async fn test_stopped_sweep_is_degraded() {
        let manager = Manager::new("sid");
        manager.stop_expunge();

        let health = fetch(AppState::new(manager, ServerConfig::new())).await;
        assert_eq!(health.status, "degraded");
        assert!(!health.sweeping);
        assert!(!health.version.is_empty());
    }
}
