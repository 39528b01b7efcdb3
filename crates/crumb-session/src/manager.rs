//! Cookie-keyed session manager with background expiry.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{Level, debug, trace};

use crate::config::{ManagerConfig, UnknownSessionPolicy};
use crate::error::{Error, Result};
use crate::key;
use crate::session::Session;
use crate::transport::{CookieSink, CookieSource, SessionCookie};

/// Identifier → session table.
type SessionTable = HashMap<String, Arc<Session>>;

/// Shared state behind every [`Manager`] handle.
struct ManagerInner {
    /// Session table. Only touched while locked; shared with the sweep task.
    table: Arc<Mutex<SessionTable>>,

    config: ManagerConfig,

    /// Stops the sweep task.
    cancel: CancellationToken,

    /// Sweep task handle, taken by [`Manager::shutdown`].
    sweep: Mutex<Option<JoinHandle<()>>>,

    /// Cancels the sweep when the last handle drops.
    _sweep_guard: DropGuard,
}

/// Maps cookie identifiers to sessions and expires idle ones.
///
/// Locking is two-level: the table lock covers lookup, insert, and removal,
/// and is released before a session's fields are read or written. A session
/// found by lookup is touched while the table lock is still held, so a sweep
/// running between lookup and access cannot evict it. The sweep also checks
/// sessions under the table lock, so the lock order is always table → session.
///
/// Cloning yields another handle to the same store. The background sweep
/// runs until [`Manager::stop_expunge`] is called or the last handle drops.
#[derive(Clone)]
pub struct Manager {
    inner: Arc<ManagerInner>,
}

impl Manager {
    /// Create a manager with default settings for the given cookie name.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime, which hosts the sweep task.
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self::with_config(ManagerConfig::new(cookie_name))
    }

    /// Create a manager from a full configuration and start its sweep.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime, which hosts the sweep task.
    pub fn with_config(config: ManagerConfig) -> Self {
        let table = Arc::new(Mutex::new(SessionTable::new()));
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(run_expunge(
            Arc::clone(&table),
            config.max_age,
            config.effective_sweep_interval(),
            cancel.clone(),
        ));

        debug!(
            cookie = %config.cookie_name,
            max_age_secs = config.max_age.as_secs(),
            sweep_interval_ms = config.effective_sweep_interval().as_millis() as u64,
            "Session manager started"
        );

        Self {
            inner: Arc::new(ManagerInner {
                table,
                _sweep_guard: cancel.clone().drop_guard(),
                cancel,
                sweep: Mutex::new(Some(handle)),
                config,
            }),
        }
    }

    /// Get the manager configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.inner.config
    }

    /// Read field `key` from the session named by the request's cookie.
    ///
    /// A successful read refreshes the session's idle clock.
    pub fn get<R>(&self, request: &R, key: &str) -> Result<String>
    where
        R: CookieSource + ?Sized,
    {
        let id = request.cookie(&self.inner.config.cookie_name)?;
        let session = self.lookup(&id).ok_or_else(|| {
            trace!(session_id = %key::short(&id), "Unknown session on get");
            Error::InvalidSession
        })?;
        session.get(key).ok_or(Error::InvalidKey)
    }

    /// Write field `key` into the caller's session and emit the session cookie.
    ///
    /// A request without a session cookie gets a freshly minted identifier.
    /// A cookie naming an unknown identifier fails with
    /// [`Error::InvalidSession`] unless the manager is configured with
    /// [`UnknownSessionPolicy::Adopt`].
    pub fn set<W, R>(
        &self,
        response: &mut W,
        request: &R,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()>
    where
        W: CookieSink + ?Sized,
        R: CookieSource + ?Sized,
    {
        if tracing::enabled!(Level::TRACE) {
            trace!(state = %self.state(), "State before set");
        }

        let presented = match request.cookie(&self.inner.config.cookie_name) {
            Ok(id) => Some(id),
            Err(Error::CookieNotFound) => None,
            Err(e) => return Err(e),
        };

        let (id, session) = match presented {
            None => self.create()?,
            Some(id) => {
                let session = self.resolve(&id)?;
                (id, session)
            }
        };

        session.set(key, value);
        response.set_cookie(&self.cookie_for(&id))?;

        if tracing::enabled!(Level::TRACE) {
            trace!(state = %self.state(), "State after set");
        }
        Ok(())
    }

    /// Drop the caller's session and tell the client to forget its cookie.
    ///
    /// Returns whether a live session was removed. A request without a
    /// session cookie is not an error; the expiring cookie is still sent.
    pub fn destroy<W, R>(&self, response: &mut W, request: &R) -> Result<bool>
    where
        W: CookieSink + ?Sized,
        R: CookieSource + ?Sized,
    {
        let removed = match request.cookie(&self.inner.config.cookie_name) {
            Ok(id) => self.remove(&id),
            Err(Error::CookieNotFound) => false,
            Err(e) => return Err(e),
        };

        let cookie = SessionCookie::expired(self.inner.config.cookie_name.clone())
            .with_secure(self.inner.config.secure)
            .with_path(self.inner.config.path.clone());
        response.set_cookie(&cookie)?;
        Ok(removed)
    }

    /// Remove a session by identifier. Returns whether it existed.
    pub fn remove(&self, id: &str) -> bool {
        let removed = self.inner.table.lock().remove(id).is_some();
        if removed {
            debug!(session_id = %key::short(id), "Session removed");
        }
        removed
    }

    /// Check whether a live session exists for `id`. Does not refresh it.
    pub fn contains(&self, id: &str) -> bool {
        self.inner.table.lock().contains_key(id)
    }

    /// Number of sessions in the table.
    pub fn len(&self) -> usize {
        self.inner.table.lock().len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.table.lock().is_empty()
    }

    /// Run one sweep pass now. Returns the number of sessions removed.
    pub fn expunge_expired(&self) -> usize {
        expunge(&self.inner.table, self.inner.config.max_age)
    }

    /// Signal the background sweep to stop.
    ///
    /// A pass already in progress completes first. Idempotent.
    pub fn stop_expunge(&self) {
        self.inner.cancel.cancel();
    }

    /// Whether the background sweep is still scheduled.
    pub fn is_expunging(&self) -> bool {
        !self.inner.cancel.is_cancelled()
    }

    /// Stop the sweep and wait for its task to exit.
    pub async fn shutdown(&self) {
        self.stop_expunge();
        let handle = self.inner.sweep.lock().take();
        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            debug!(error = %e, "Session sweep task ended abnormally");
        }
    }

    /// Snapshot of the store's size and timing.
    pub fn stats(&self) -> ManagerStats {
        let sessions: Vec<Arc<Session>> = self.inner.table.lock().values().cloned().collect();
        ManagerStats {
            sessions: sessions.len(),
            fields: sessions.iter().map(|s| s.len()).sum(),
            max_age: self.inner.config.max_age,
            sweep_interval: self.inner.config.effective_sweep_interval(),
        }
    }

    /// Human-readable dump of the table for trace logging.
    ///
    /// Identifiers are shortened and field values are omitted.
    pub fn state(&self) -> String {
        let sessions: Vec<(String, Arc<Session>)> = self
            .inner
            .table
            .lock()
            .iter()
            .map(|(id, s)| (id.clone(), Arc::clone(s)))
            .collect();

        let mut out = String::new();
        let _ = writeln!(out, "name: {}", self.inner.config.cookie_name);
        let _ = writeln!(out, "max-age: {}s", self.inner.config.max_age.as_secs());
        let _ = writeln!(out, "sessions: {}", sessions.len());
        for (id, session) in sessions {
            let mut keys = session.keys();
            keys.sort();
            let _ = writeln!(out, "\t{}: [{}]", key::short(&id), keys.join(", "));
        }
        out
    }

    /// Look up a session and mark it accessed under the table lock.
    fn lookup(&self, id: &str) -> Option<Arc<Session>> {
        let table = self.inner.table.lock();
        let session = table.get(id)?;
        session.touch();
        Some(Arc::clone(session))
    }

    /// Mint an identifier and register an empty session for it.
    fn create(&self) -> Result<(String, Arc<Session>)> {
        let id = key::generate(self.inner.config.key_size).inspect_err(|e| {
            tracing::error!(error = %e, "Cannot mint session identifier");
        })?;
        let session = Arc::new(Session::new());
        self.inner
            .table
            .lock()
            .insert(id.clone(), Arc::clone(&session));
        debug!(session_id = %key::short(&id), "Session created");
        Ok((id, session))
    }

    /// Resolve a presented identifier according to the unknown-session policy.
    fn resolve(&self, id: &str) -> Result<Arc<Session>> {
        let mut table = self.inner.table.lock();
        if let Some(session) = table.get(id) {
            session.touch();
            return Ok(Arc::clone(session));
        }
        match self.inner.config.unknown_session {
            UnknownSessionPolicy::Reject => {
                trace!(session_id = %key::short(id), "Unknown session on set");
                Err(Error::InvalidSession)
            }
            UnknownSessionPolicy::Adopt => {
                let session = Arc::new(Session::new());
                table.insert(id.to_string(), Arc::clone(&session));
                debug!(session_id = %key::short(id), "Adopted presented session identifier");
                Ok(session)
            }
        }
    }

    fn cookie_for(&self, id: &str) -> SessionCookie {
        let config = &self.inner.config;
        SessionCookie::new(config.cookie_name.clone(), id, config.max_age)
            .with_secure(config.secure)
            .with_path(config.path.clone())
    }
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("config", &self.inner.config)
            .field("sessions", &self.len())
            .finish()
    }
}

/// Store statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerStats {
    /// Live sessions in the table.
    pub sessions: usize,

    /// Fields across all sessions.
    pub fields: usize,

    /// Configured idle lifetime.
    pub max_age: Duration,

    /// Sweep period.
    pub sweep_interval: Duration,
}

/// Remove every session idle longer than `ttl`.
fn expunge(table: &Mutex<SessionTable>, ttl: Duration) -> usize {
    let now = Instant::now();
    let mut table = table.lock();
    let before = table.len();

    table.retain(|id, session| {
        let expired = session.is_expired(ttl, now);
        if expired {
            trace!(session_id = %key::short(id), "Expunging idle session");
        }
        !expired
    });

    let count = before - table.len();
    if count > 0 {
        debug!(count, remaining = table.len(), "Expunged expired sessions");
    }
    count
}

/// Sweep loop. Checks for cancellation between ticks only.
async fn run_expunge(
    table: Arc<Mutex<SessionTable>>,
    ttl: Duration,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                expunge(&table, ttl);
            }
        }
    }

    debug!("Session sweep stopped");
}
