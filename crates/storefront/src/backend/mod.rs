//! HandyHub backend REST API client.
//!
//! # Architecture
//!
//! - The backend owns every record; the storefront makes direct calls and
//!   keeps no local copy beyond a short-lived catalog cache (`moka`)
//! - JSON over HTTPS; every response is wrapped in `{ success, data?, error? }`
//! - Session-scoped endpoints (cart, orders, addresses, auth, admin) are
//!   authenticated by the backend's own cookie, which the storefront relays
//!   through a [`CookieJar`] kept in the visitor's session
//! - No retries and no request deduplication: a failed call is reported once
//!   and the page degrades
//!
//! # Example
//!
//! ```rust,ignore
//! use handyhub_storefront::backend::{BackendClient, CookieJar};
//!
//! let client = BackendClient::new(&config.backend)?;
//! let categories = client.list_categories().await?;
//!
//! let mut jar = CookieJar::default();
//! let cart = client.add_to_cart(&mut jar, service_id, 1).await?;
//! ```

mod addresses;
mod admin;
mod auth;
mod cache;
mod cart;
mod catalog;
mod cookies;
mod coupons;
mod offers;
mod orders;
mod settings;

pub use auth::{LoginRequest, RegisterRequest};
pub use cookies::CookieJar;

use std::sync::Arc;

use handyhub_core::ApiEnvelope;
use moka::future::Cache;
use reqwest::header::{COOKIE, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::BackendConfig;

use cache::{CacheKey, CacheValue};

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with `success: false` or a non-2xx status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The session cookie is missing or expired.
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated, but not allowed (e.g. non-admin on an admin endpoint).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The response body was not a valid envelope.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A successful response carried no `data` where some was required.
    #[error("Missing data in response: {0}")]
    MissingData(&'static str),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl BackendError {
    /// Whether the message is meant for the customer (validation failures,
    /// expired coupons) rather than an operational failure.
    ///
    /// A `success: false` envelope on a 2xx response counts as user-facing.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status < 500)
    }

    /// Message safe to show the customer.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } if self.is_user_facing() => message.clone(),
            Self::Unauthorized => "Please sign in to continue.".to_string(),
            Self::Forbidden(_) => "You are not allowed to do that.".to_string(),
            Self::NotFound(_) => "We couldn't find what you were looking for.".to_string(),
            Self::RateLimited(_) => "Too many requests, please try again shortly.".to_string(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the HandyHub backend API.
///
/// Cheap to clone. Catalog and settings reads are cached for the configured
/// TTL; everything session-scoped goes straight to the backend.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("handyhub-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.catalog_cache_ttl)
            .support_invalidation_closures()
            .build();

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.api_url.clone(),
                cache,
            }),
        })
    }

    /// Build an absolute URL for an API path such as `api/cart/3`.
    fn url(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.inner
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// Send a request and unwrap the envelope.
    ///
    /// When a jar is given, its cookies are sent and any `Set-Cookie` in the
    /// response is absorbed back into it, whatever the status.
    async fn dispatch<T: DeserializeOwned>(
        &self,
        mut request: RequestBuilder,
        jar: Option<&mut CookieJar>,
    ) -> Result<Option<T>, BackendError> {
        if let Some(cookie) = jar.as_ref().and_then(|jar| jar.header_value()) {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await?;
        let status = response.status();

        if let Some(jar) = jar {
            jar.absorb(response.headers());
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
            tracing::warn!(
                status = %status,
                message = %message,
                "Backend returned non-success status"
            );
            return Err(match status {
                StatusCode::UNAUTHORIZED => BackendError::Unauthorized,
                StatusCode::FORBIDDEN => BackendError::Forbidden(message),
                StatusCode::NOT_FOUND => BackendError::NotFound(message),
                _ => BackendError::Api {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let envelope: ApiEnvelope<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "Failed to parse backend response"
                );
                return Err(BackendError::Parse(e));
            }
        };

        envelope.into_result().map_err(|message| {
            debug!(message = %message, "Backend reported failure");
            BackendError::Api {
                status: status.as_u16(),
                message,
            }
        })
    }

    /// `GET` returning required data.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        jar: Option<&mut CookieJar>,
        what: &'static str,
    ) -> Result<T, BackendError> {
        let url = self.url(path)?;
        self.dispatch(self.request(Method::GET, url), jar)
            .await?
            .ok_or(BackendError::MissingData(what))
    }

    /// `GET` with query parameters returning required data.
    async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        jar: Option<&mut CookieJar>,
        what: &'static str,
    ) -> Result<T, BackendError> {
        let mut url = self.url(path)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        self.dispatch(self.request(Method::GET, url), jar)
            .await?
            .ok_or(BackendError::MissingData(what))
    }

    /// Request with a JSON body; the response payload is optional.
    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        jar: Option<&mut CookieJar>,
    ) -> Result<Option<T>, BackendError> {
        let url = self.url(path)?;
        self.dispatch(self.request(method, url).json(body), jar)
            .await
    }

    /// Request without a body; the response payload is optional.
    async fn send_empty<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        jar: Option<&mut CookieJar>,
    ) -> Result<Option<T>, BackendError> {
        let url = self.url(path)?;
        self.dispatch(self.request(method, url), jar).await
    }

    /// Whether the backend answers its health endpoint.
    pub async fn is_reachable(&self) -> bool {
        let Ok(url) = self.url("api/health") else {
            return false;
        };
        match self.request(Method::GET, url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!(error = %e, "Backend health check failed");
                false
            }
        }
    }
}

/// Pull the `error` field out of an error response body, if it is an envelope.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiEnvelope<serde_json::Value>>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .filter(|message| !message.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_envelope() {
        assert_eq!(
            error_message(r#"{"success":false,"error":"Cart item not found"}"#).as_deref(),
            Some("Cart item not found")
        );
        assert_eq!(error_message("<html>Bad Gateway</html>"), None);
        assert_eq!(error_message(r#"{"success":false,"error":"  "}"#), None);
    }

    #[test]
    fn test_user_facing_errors() {
        let err = BackendError::Api {
            status: 400,
            message: "Coupon has expired".to_string(),
        };
        assert!(err.is_user_facing());
        assert_eq!(err.user_message(), "Coupon has expired");

        let err = BackendError::Api {
            status: 200,
            message: "Minimum order amount not met".to_string(),
        };
        assert!(err.is_user_facing());

        let err = BackendError::Api {
            status: 500,
            message: "relation \"carts\" does not exist".to_string(),
        };
        assert!(!err.is_user_facing());
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            BackendError::RateLimited(30).to_string(),
            "Rate limited, retry after 30 seconds"
        );
        assert_eq!(
            BackendError::MissingData("cart").to_string(),
            "Missing data in response: cart"
        );
    }
}
