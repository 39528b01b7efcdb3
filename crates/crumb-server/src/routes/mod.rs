//! API routes.

pub mod health;
pub mod openapi;
pub mod session;

pub use health::health_routes;
pub use openapi::{ApiDoc, openapi_handler};
pub use session::{
    FieldResponse, SetFieldRequest, StatsResponse, destroy_session_handler, get_field_handler,
    set_field_handler, stats_handler,
};
