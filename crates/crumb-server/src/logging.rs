//! Request logging middleware.

use std::time::Instant;

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tracing::Level;

use crate::state::AppState;

/// Log level for a finished request.
fn level_for(status: StatusCode) -> Level {
    if status.is_server_error() {
        Level::ERROR
    } else if status.is_client_error() {
        Level::WARN
    } else {
        Level::INFO
    }
}

/// Emit one `request` event per response, at [`level_for`] its status.
pub async fn request_logging_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.config.request_logging {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    // `event!` needs a constant level, hence the dispatch.
    macro_rules! request_event {
        ($level:expr) => {
            tracing::event!(
                $level,
                %method,
                %path,
                status = status.as_u16(),
                elapsed_ms,
                "request"
            )
        };
    }
    let level = level_for(status);
    if level == Level::ERROR {
        request_event!(Level::ERROR);
    } else if level == Level::WARN {
        request_event!(Level::WARN);
    } else {
        request_event!(Level::INFO);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_follows_status_class() {
        assert_eq!(level_for(StatusCode::OK), Level::INFO);
        assert_eq!(level_for(StatusCode::NO_CONTENT), Level::INFO);
        assert_eq!(level_for(StatusCode::UNAUTHORIZED), Level::WARN);
        assert_eq!(level_for(StatusCode::NOT_FOUND), Level::WARN);
        assert_eq!(level_for(StatusCode::INTERNAL_SERVER_ERROR), Level::ERROR);
    }
}
