//! Cookie-keyed session store with TTL expiry.
//!
//! This crate maps an unguessable identifier, carried in an HTTP cookie,
//! to a small bag of string fields:
//! - Identifiers are 32 random bytes from the OS RNG, hex encoded
//! - Each session has its own lock; the table lock only guards lookups
//! - A background sweep evicts sessions idle past their TTL
//! - HTTP access goes through the [`CookieSource`] / [`CookieSink`] seams
//!
//! # Example
//!
//! ```rust,ignore
//! use crumb_session::Manager;
//!
//! let manager = Manager::new("sid");
//!
//! // In a handler:
//! manager.set(&mut response, &request, "user", "alice")?;
//! let user = manager.get(&request, "user")?;
//! ```

mod config;
mod error;
pub mod key;
mod manager;
mod session;
mod transport;

pub use config::{
    DEFAULT_KEY_SIZE, DEFAULT_MAX_AGE, MAX_KEY_SIZE, MIN_KEY_SIZE, ManagerConfig,
    UnknownSessionPolicy,
};
pub use error::{Error, Result};
pub use manager::{Manager, ManagerStats};
pub use session::Session;
pub use transport::{CookieSink, CookieSource, SessionCookie};
