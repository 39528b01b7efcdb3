//! Application state shared across handlers.

use std::sync::Arc;

use crumb_session::Manager;

use crate::config::ServerConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The session store.
    pub manager: Manager,

    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(manager: Manager, config: ServerConfig) -> Self {
        Self {
            manager,
            config: Arc::new(config),
        }
    }
}
