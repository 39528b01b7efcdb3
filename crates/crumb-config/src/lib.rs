//! Configuration system for Crumb.
//!
//! Provides TOML-based configuration with:
//! - `[server]`, `[session]` and `[logging]` sections, all optional
//! - Config file layering (XDG user config + project-local overrides)
//! - Conversion of the `[session]` section into a manager configuration

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    LoadedConfig, load_config, load_config_file, load_config_with_options, save_config,
    xdg_config_dir, xdg_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
