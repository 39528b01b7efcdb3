//! Configuration for the session manager.

use std::time::Duration;

/// Default number of random bytes in a session identifier.
pub const DEFAULT_KEY_SIZE: usize = 32;

/// Smallest accepted identifier length in bytes.
pub const MIN_KEY_SIZE: usize = 8;

/// Largest accepted identifier length in bytes.
pub const MAX_KEY_SIZE: usize = 1024;

/// Default idle lifetime of a session (28 days).
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(2_419_200);

/// What `Manager::set` does with a cookie naming an unknown identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownSessionPolicy {
    /// Fail with `Error::InvalidSession`.
    #[default]
    Reject,
    /// Create a fresh session bound to the presented identifier.
    Adopt,
}

/// Configuration for the session manager.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Name of the cookie carrying the session identifier.
    pub cookie_name: String,

    /// Bytes of randomness per identifier. The cookie value is twice this long.
    pub key_size: usize,

    /// Sessions not accessed within this duration are swept.
    pub max_age: Duration,

    /// Sweep period. `None` means a quarter of `max_age`.
    pub sweep_interval: Option<Duration>,

    /// Handling of unrecognised identifiers on write.
    pub unknown_session: UnknownSessionPolicy,

    /// Mark the cookie `Secure`.
    pub secure: bool,

    /// Optional `Path` attribute for the cookie.
    pub path: Option<String>,
}

impl ManagerConfig {
    /// Create a configuration with default values for the given cookie name.
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            key_size: DEFAULT_KEY_SIZE,
            max_age: DEFAULT_MAX_AGE,
            sweep_interval: None,
            unknown_session: UnknownSessionPolicy::default(),
            secure: false,
            path: None,
        }
    }

    /// Set the identifier length in bytes, clamped to
    /// [`MIN_KEY_SIZE`]`..=`[`MAX_KEY_SIZE`].
    pub fn with_key_size(mut self, key_size: usize) -> Self {
        self.key_size = key_size.clamp(MIN_KEY_SIZE, MAX_KEY_SIZE);
        self
    }

    /// Set the session idle lifetime.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Override the sweep period.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = Some(interval);
        self
    }

    /// Set the policy for unknown identifiers on write.
    pub fn with_unknown_session(mut self, policy: UnknownSessionPolicy) -> Self {
        self.unknown_session = policy;
        self
    }

    /// Mark the cookie `Secure`.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set the cookie `Path` attribute.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Effective sweep period.
    ///
    /// Never zero, so a zero `max_age` cannot spin the sweep task.
    pub fn effective_sweep_interval(&self) -> Duration {
        let interval = self.sweep_interval.unwrap_or(self.max_age / 4);
        interval.max(Duration::from_millis(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ManagerConfig::new("sid");
        assert_eq!(config.cookie_name, "sid");
        assert_eq!(config.key_size, 32);
        assert_eq!(config.max_age, Duration::from_secs(2_419_200));
        assert_eq!(config.unknown_session, UnknownSessionPolicy::Reject);
        assert_eq!(config.effective_sweep_interval(), Duration::from_secs(604_800));
    }

    #[test]
    fn test_sweep_interval_override() {
        let config = ManagerConfig::new("sid")
            .with_max_age(Duration::from_secs(40))
            .with_sweep_interval(Duration::from_secs(3));
        assert_eq!(config.effective_sweep_interval(), Duration::from_secs(3));
    }

    #[test]
    fn test_zero_max_age_keeps_interval_positive() {
        let config = ManagerConfig::new("sid").with_max_age(Duration::ZERO);
        assert!(config.effective_sweep_interval() > Duration::ZERO);
    }

    #[test]
    fn test_key_size_clamped_to_bounds() {
        assert_eq!(ManagerConfig::new("sid").with_key_size(0).key_size, MIN_KEY_SIZE);
        assert_eq!(ManagerConfig::new("sid").with_key_size(4).key_size, 8);
        assert_eq!(ManagerConfig::new("sid").with_key_size(16).key_size, 16);
        assert_eq!(
            ManagerConfig::new("sid").with_key_size(4096).key_size,
            MAX_KEY_SIZE
        );
    }
}
