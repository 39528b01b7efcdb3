//! CLI command handlers.

pub mod config;
pub mod start;

use std::path::PathBuf;

use crumb_config::LoadedConfig;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
    /// Explicit config directory, if given on the command line.
    pub config_dir: Option<PathBuf>,
    /// Configuration loaded at startup.
    pub loaded: LoadedConfig,
}
