//! HTTP API server for Crumb.
//!
//! Exposes a [`crumb_session::Manager`] over a small REST surface. The
//! session is always resolved from the configured cookie; writes answer
//! with a `Set-Cookie` header carrying the identifier.
//!
//! # Example
//!
//! ```ignore
//! use crumb_server::{Server, ServerConfig};
//! use crumb_session::Manager;
//!
//! let config = ServerConfig::new().with_bind_address("127.0.0.1:8080".parse()?);
//! let server = Server::new(Manager::new("sid"), config);
//! server.run().await?;
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{ErrorResponse, Result, ServerError};
pub use logging::request_logging_middleware;
pub use routes::{FieldResponse, SetFieldRequest, StatsResponse};
pub use state::AppState;

use std::future::Future;
use std::net::SocketAddr;

use axum::{Router, extract::DefaultBodyLimit, middleware};
use crumb_session::Manager;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// The Crumb HTTP server.
pub struct Server {
    /// Application state.
    state: AppState,
}

impl Server {
    /// Create a new server around a session manager.
    pub fn new(manager: Manager, config: ServerConfig) -> Self {
        Self {
            state: AppState::new(manager, config),
        }
    }

    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        Router::new()
            .merge(routes::health_routes())
            .nest("/api/v1", self.api_routes())
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                logging::request_logging_middleware,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// API routes (v1).
    fn api_routes(&self) -> Router<AppState> {
        use axum::routing::{delete, get};

        Router::new()
            .route(
                "/session/{key}",
                get(routes::get_field_handler).put(routes::set_field_handler),
            )
            .route("/session", delete(routes::destroy_session_handler))
            .route("/stats", get(routes::stats_handler))
            .route("/openapi.json", get(routes::openapi_handler))
            .layer(DefaultBodyLimit::max(self.state.config.max_body_size))
    }

    /// Run the server until the process is stopped.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.bind_address;
        self.run_on(addr, std::future::pending()).await
    }

    /// Run the server on a specific address until `shutdown` resolves.
    ///
    /// The session sweep is stopped once the listener has drained.
    pub async fn run_on<F>(self, addr: SocketAddr, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;
        let local = listener
            .local_addr()
            .map_err(|e| ServerError::Internal(format!("Failed to read address: {}", e)))?;

        info!(
            addr = %local,
            cookie = %self.state.manager.config().cookie_name,
            "Starting server"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        self.state.manager.shutdown().await;
        info!("Server stopped");

        Ok(())
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }

    /// The session manager behind this server.
    pub fn manager(&self) -> &Manager {
        &self.state.manager
    }
}
