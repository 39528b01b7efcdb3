//! OpenAPI documentation configuration.

use axum::Json;
use utoipa::OpenApi;

use super::{health, session};
use crate::error::ErrorResponse;

/// OpenAPI documentation for the Crumb API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Crumb API",
        description = "HTTP API for the Crumb cookie session store",
        version = "1.0.0",
        license(name = "MIT"),
    ),
    servers(
        (url = "/", description = "Local server"),
    ),
    paths(
        health::health,
        session::get_field_handler,
        session::set_field_handler,
        session::destroy_session_handler,
        session::stats_handler,
    ),
    components(schemas(
        health::HealthResponse,
        session::FieldResponse,
        session::SetFieldRequest,
        session::StatsResponse,
        ErrorResponse,
    )),
    tags(
        (name = "health", description = "Liveness"),
        (name = "session", description = "Cookie-keyed session fields"),
    )
)]
pub struct ApiDoc;

/// GET /api/v1/openapi.json - The API description.
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
