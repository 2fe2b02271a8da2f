//! Backend session cookies relayed on behalf of a visitor.
//!
//! The backend authenticates with its own cookie. Browsers never see it: the
//! storefront keeps it in the visitor's session and attaches it to every
//! session-scoped backend call.

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, SET_COOKIE};
use serde::{Deserialize, Serialize};
use tower_sessions::cookie::Cookie;
use tower_sessions::cookie::time::OffsetDateTime;

/// Name/value pairs received from the backend via `Set-Cookie`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieJar {
    cookies: BTreeMap<String, String>,
    #[serde(skip)]
    dirty: bool,
}

impl CookieJar {
    /// Value for a `Cookie` request header, or `None` when the jar is empty.
    #[must_use]
    pub fn header_value(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Apply every `Set-Cookie` header in a backend response.
    ///
    /// Expired cookies (`Max-Age<=0`, past `Expires`, or an empty value) are
    /// removed. Malformed headers are skipped.
    pub fn absorb(&mut self, headers: &HeaderMap) {
        for raw in headers.get_all(SET_COOKIE) {
            let Ok(raw) = raw.to_str() else {
                continue;
            };
            let Ok(cookie) = Cookie::parse(raw) else {
                tracing::debug!("Ignoring malformed Set-Cookie header from backend");
                continue;
            };
            self.apply(&cookie);
        }
    }

    fn apply(&mut self, cookie: &Cookie<'_>) {
        let expired = cookie.value().is_empty()
            || cookie
                .max_age()
                .is_some_and(|age| age.is_zero() || age.is_negative())
            || cookie
                .expires_datetime()
                .is_some_and(|at| at <= OffsetDateTime::now_utc());

        let changed = if expired {
            self.cookies.remove(cookie.name()).is_some()
        } else {
            self.cookies.insert(cookie.name().to_string(), cookie.value().to_string())
                != Some(cookie.value().to_string())
        };
        self.dirty |= changed;
    }

    /// Drop every cookie (logout).
    pub fn clear(&mut self) {
        if !self.cookies.is_empty() {
            self.cookies.clear();
            self.dirty = true;
        }
    }

    /// Whether the jar holds no cookies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Whether the jar changed since it was loaded and must be saved.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Value of a single cookie.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}
