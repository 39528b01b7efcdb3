//! Configuration types mapping to the TOML schema.
//!
//! Top-level config:
//! ```toml
//! [server]     # HTTP listener settings
//! [session]    # cookie and expiry settings
//! [logging]    # log file settings
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crumb_session::{MAX_KEY_SIZE, MIN_KEY_SIZE, ManagerConfig, UnknownSessionPolicy};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g., project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrumbConfig {
    /// Server configuration.
    pub server: Option<ServerConfig>,

    /// Session store configuration.
    pub session: Option<SessionConfig>,

    /// Logging configuration.
    pub logging: Option<LoggingConfig>,
}

impl CrumbConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Sections replace whole; fields are not merged individually.
    pub fn merge(&mut self, other: CrumbConfig) {
        if other.server.is_some() {
            self.server = other.server;
        }

        if other.session.is_some() {
            self.session = other.session;
        }

        if other.logging.is_some() {
            self.logging = other.logging;
        }
    }

    /// Server section, or defaults.
    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    /// Session section, or defaults.
    pub fn session(&self) -> SessionConfig {
        self.session.clone().unwrap_or_default()
    }

    /// Logging section, or defaults.
    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Default port for the HTTP listener.
pub const DEFAULT_PORT: u16 = 8080;

/// Default bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Default max request body size (64 KB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 64 * 1024;

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Address to bind to.
    pub bind: String,
    /// Enable per-request trace logging.
    pub request_logging: bool,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            request_logging: true,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// How a write treats a cookie naming an unknown session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownSession {
    /// Fail the write.
    #[default]
    Reject,
    /// Create a session under the presented identifier.
    Adopt,
}

impl From<UnknownSession> for UnknownSessionPolicy {
    fn from(value: UnknownSession) -> Self {
        match value {
            UnknownSession::Reject => UnknownSessionPolicy::Reject,
            UnknownSession::Adopt => UnknownSessionPolicy::Adopt,
        }
    }
}

/// Session store configuration.
///
/// ```toml
/// [session]
/// cookie_name = "sid"
/// key_size = 32
/// max_age_secs = 2419200
/// sweep_interval_secs = 3600   # default: max_age / 4
/// unknown_session = "reject"   # or "adopt"
/// secure = false
/// path = "/"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Random bytes per identifier.
    pub key_size: usize,
    /// Idle lifetime in seconds.
    pub max_age_secs: u64,
    /// Sweep period in seconds. Unset means a quarter of the lifetime.
    pub sweep_interval_secs: Option<u64>,
    /// Policy for unknown identifiers on write.
    pub unknown_session: UnknownSession,
    /// Mark the cookie `Secure`.
    pub secure: bool,
    /// Cookie `Path` attribute.
    pub path: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "sid".to_string(),
            key_size: crumb_session::DEFAULT_KEY_SIZE,
            max_age_secs: crumb_session::DEFAULT_MAX_AGE.as_secs(),
            sweep_interval_secs: None,
            unknown_session: UnknownSession::default(),
            secure: false,
            path: None,
        }
    }
}

impl SessionConfig {
    /// Check that the values can back a working manager.
    pub fn validate(&self) -> Result<()> {
        if self.cookie_name.is_empty() || !self.cookie_name.chars().all(is_cookie_token_char) {
            return Err(ConfigError::Invalid {
                field: "session.cookie_name".to_string(),
                reason: format!("'{}' is not a valid cookie name", self.cookie_name),
            });
        }
        if !(MIN_KEY_SIZE..=MAX_KEY_SIZE).contains(&self.key_size) {
            return Err(ConfigError::Invalid {
                field: "session.key_size".to_string(),
                reason: format!(
                    "{} is outside {}..={} bytes",
                    self.key_size, MIN_KEY_SIZE, MAX_KEY_SIZE
                ),
            });
        }
        if self.max_age_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "session.max_age_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.sweep_interval_secs == Some(0) {
            return Err(ConfigError::Invalid {
                field: "session.sweep_interval_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Build the manager configuration, validating first.
    pub fn to_manager_config(&self) -> Result<ManagerConfig> {
        self.validate()?;

        let mut config = ManagerConfig::new(self.cookie_name.clone())
            .with_key_size(self.key_size)
            .with_max_age(Duration::from_secs(self.max_age_secs))
            .with_unknown_session(self.unknown_session.into())
            .with_secure(self.secure);
        if let Some(secs) = self.sweep_interval_secs {
            config = config.with_sweep_interval(Duration::from_secs(secs));
        }
        if let Some(ref path) = self.path {
            config = config.with_path(path.clone());
        }
        Ok(config)
    }
}

/// RFC 6265 cookie-name token characters.
fn is_cookie_token_char(c: char) -> bool {
    c.is_ascii_graphic() && !"()<>@,;:\\\"/[]?={}".contains(c)
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write a daily-rotated JSON log file.
    pub file: bool,
    /// Directory for log files. Default: `<config dir>/logs`.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: true,
            dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config() {
        let config = CrumbConfig::from_toml("").unwrap();
        assert_eq!(config, CrumbConfig::new());
        assert_eq!(config.session().cookie_name, "sid");
        assert_eq!(config.server().port, 8080);
        assert!(config.logging().file);
    }

    #[test]
    fn test_parse_session_section() {
        let config = CrumbConfig::from_toml(
            r#"
            [session]
            cookie_name = "buster"
            max_age_secs = 3600
            unknown_session = "adopt"
            secure = true
            "#,
        )
        .unwrap();

        let session = config.session();
        assert_eq!(session.cookie_name, "buster");
        assert_eq!(session.max_age_secs, 3600);
        assert_eq!(session.key_size, 32);
        assert_eq!(session.unknown_session, UnknownSession::Adopt);
        assert!(session.secure);
    }

    #[test]
    fn test_unknown_policy_value_rejected() {
        let result = CrumbConfig::from_toml(
            r#"
            [session]
            unknown_session = "maybe"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_merge_overrides_sections() {
        let mut base = CrumbConfig::from_toml(
            r#"
            [server]
            port = 9000

            [session]
            cookie_name = "base"
            "#,
        )
        .unwrap();
        let overlay = CrumbConfig::from_toml(
            r#"
            [session]
            cookie_name = "overlay"
            "#,
        )
        .unwrap();

        base.merge(overlay);
        assert_eq!(base.server().port, 9000);
        assert_eq!(base.session().cookie_name, "overlay");
    }

    #[test]
    fn test_toml_roundtrip_preserves_values() {
        let mut config = CrumbConfig::new();
        config.session = Some(SessionConfig {
            sweep_interval_secs: Some(60),
            path: Some("/".to_string()),
            ..SessionConfig::default()
        });

        let parsed = CrumbConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_to_manager_config() {
        let session = SessionConfig {
            cookie_name: "buster".to_string(),
            key_size: 16,
            max_age_secs: 40,
            sweep_interval_secs: Some(5),
            unknown_session: UnknownSession::Adopt,
            secure: true,
            path: Some("/".to_string()),
        };

        let manager = session.to_manager_config().unwrap();
        assert_eq!(manager.cookie_name, "buster");
        assert_eq!(manager.key_size, 16);
        assert_eq!(manager.max_age, Duration::from_secs(40));
        assert_eq!(manager.effective_sweep_interval(), Duration::from_secs(5));
        assert_eq!(manager.unknown_session, UnknownSessionPolicy::Adopt);
        assert!(manager.secure);
        assert_eq!(manager.path.as_deref(), Some("/"));
    }

    #[test]
    fn test_validate_rejects_bad_cookie_name() {
        for name in ["", "my session", "a;b", "x=y"] {
            let session = SessionConfig {
                cookie_name: name.to_string(),
                ..SessionConfig::default()
            };
            assert!(
                matches!(session.validate(), Err(ConfigError::Invalid { .. })),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_rejects_bad_numbers() {
        let tiny_key = SessionConfig {
            key_size: 4,
            ..SessionConfig::default()
        };
        assert!(tiny_key.validate().is_err());

        let huge_key = SessionConfig {
            key_size: MAX_KEY_SIZE + 1,
            ..SessionConfig::default()
        };
        assert!(huge_key.validate().is_err());

        // Every size the config accepts survives the builder unchanged.
        for key_size in [MIN_KEY_SIZE, 16, MAX_KEY_SIZE] {
            let session = SessionConfig {
                key_size,
                ..SessionConfig::default()
            };
            assert_eq!(session.to_manager_config().unwrap().key_size, key_size);
        }

        let no_lifetime = SessionConfig {
            max_age_secs: 0,
            ..SessionConfig::default()
        };
        assert!(no_lifetime.validate().is_err());

        let no_interval = SessionConfig {
            sweep_interval_secs: Some(0),
            ..SessionConfig::default()
        };
        assert!(no_interval.validate().is_err());

        assert!(SessionConfig::default().validate().is_ok());
    }
}
