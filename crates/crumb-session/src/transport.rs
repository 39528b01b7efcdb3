//! HTTP transport seams.
//!
//! The manager never touches HTTP types directly. It reads the session
//! identifier through [`CookieSource`] and hands a [`SessionCookie`] to a
//! [`CookieSink`]. Implementations are provided for the `http` crate's
//! request, response, and header map types.

use std::time::Duration;

use cookie::Cookie;
use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue, Request, Response};
use tracing::trace;

use crate::error::{Error, Result};

/// Something a named cookie can be read from (an inbound request).
pub trait CookieSource {
    /// Return the value of cookie `name`.
    ///
    /// Fails with [`Error::CookieNotFound`] when absent and
    /// [`Error::InvalidRequest`] when the cookie header is unreadable.
    fn cookie(&self, name: &str) -> Result<String>;
}

/// Something a `Set-Cookie` header can be attached to (an outbound response).
pub trait CookieSink {
    /// Attach `cookie` as a `Set-Cookie` header.
    fn set_cookie(&mut self, cookie: &SessionCookie) -> Result<()>;
}

/// Descriptor of the cookie the manager emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub max_age: Duration,
    pub http_only: bool,
    pub secure: bool,
    pub path: Option<String>,
}

impl SessionCookie {
    /// An HTTP-only cookie carrying `value` for `max_age`.
    pub fn new(name: impl Into<String>, value: impl Into<String>, max_age: Duration) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            max_age,
            http_only: true,
            secure: false,
            path: None,
        }
    }

    /// A cookie that tells the client to drop `name` immediately.
    pub fn expired(name: impl Into<String>) -> Self {
        Self::new(name, "", Duration::ZERO)
    }

    /// Mark the cookie `Secure`.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set the `Path` attribute.
    pub fn with_path(mut self, path: Option<String>) -> Self {
        self.path = path;
        self
    }

    /// Render as a `Set-Cookie` header value.
    pub fn to_header_value(&self) -> String {
        let max_age = i64::try_from(self.max_age.as_secs()).unwrap_or(i64::MAX);
        let mut builder = Cookie::build((self.name.clone(), self.value.clone()))
            .max_age(cookie::time::Duration::seconds(max_age))
            .http_only(self.http_only)
            .secure(self.secure);
        if let Some(path) = &self.path {
            builder = builder.path(path.clone());
        }
        builder.build().to_string()
    }
}

/// Find cookie `name` across every `Cookie` header in `headers`.
fn find_cookie(headers: &HeaderMap, name: &str) -> Result<String> {
    for header in headers.get_all(COOKIE) {
        let raw = header
            .to_str()
            .map_err(|e| Error::InvalidRequest(format!("unreadable cookie header: {e}")))?;

        for parsed in Cookie::split_parse(raw) {
            let cookie = match parsed {
                Ok(cookie) => cookie,
                Err(e) => {
                    trace!(error = %e, "Skipping unparsable cookie pair");
                    continue;
                }
            };
            if cookie.name() != name {
                continue;
            }
            let value = cookie.value_trimmed();
            if value.is_empty() {
                return Err(Error::InvalidRequest(format!("cookie '{name}' is empty")));
            }
            return Ok(value.to_string());
        }
    }
    Err(Error::CookieNotFound)
}

fn append_cookie(headers: &mut HeaderMap, cookie: &SessionCookie) -> Result<()> {
    let value = HeaderValue::from_str(&cookie.to_header_value())
        .map_err(|e| Error::Transport(format!("invalid Set-Cookie header: {e}")))?;
    headers.append(SET_COOKIE, value);
    Ok(())
}

impl CookieSource for HeaderMap {
    fn cookie(&self, name: &str) -> Result<String> {
        find_cookie(self, name)
    }
}

impl<B> CookieSource for Request<B> {
    fn cookie(&self, name: &str) -> Result<String> {
        find_cookie(self.headers(), name)
    }
}

impl CookieSink for HeaderMap {
    fn set_cookie(&mut self, cookie: &SessionCookie) -> Result<()> {
        append_cookie(self, cookie)
    }
}

impl<B> CookieSink for Response<B> {
    fn set_cookie(&mut self, cookie: &SessionCookie) -> Result<()> {
        append_cookie(self.headers_mut(), cookie)
    }
}
