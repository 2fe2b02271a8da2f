//! Integration tests for the HandyHub storefront.
//!
//! Each test starts a [`FakeBackend`] and a real storefront pointed at it,
//! both in-process on ephemeral ports, and drives the storefront over HTTP
//! with a cookie-keeping client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p handyhub-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_catalog` - Pages, search, health
//! - `storefront_cart` - Cart fragments, badge, coupons
//! - `storefront_booking` - Sign-in, addresses, checkout, orders
//! - `storefront_admin_api` - Admin JSON envelope

pub mod fake_backend;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use axum::ServiceExt;
use axum::extract::Request;
use handyhub_core::CurrencyCode;
use handyhub_storefront::config::{BackendConfig, StorefrontConfig};
use handyhub_storefront::state::AppState;
use reqwest::redirect::Policy;
use secrecy::SecretString;
use url::Url;

pub use fake_backend::{ADMIN_EMAIL, CUSTOMER_EMAIL, FakeBackend, PASSWORD};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A running storefront, its fake backend, and a browser-like client.
pub struct TestContext {
    pub client: reqwest::Client,
    pub storefront_url: String,
    pub backend: FakeBackend,
}

impl TestContext {
    /// Start a fake backend and a storefront in front of it.
    ///
    /// # Errors
    ///
    /// Returns an error if either server fails to start.
    pub async fn new() -> Result<Self, BoxError> {
        let backend = FakeBackend::start().await?;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let storefront_url = format!("http://{addr}");

        let config = StorefrontConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: addr.port(),
            base_url: storefront_url.clone(),
            session_secret: SecretString::from("q8Zr!v2LmP0#xT5wK9bN3cY7@hJ4sD6f"),
            currency: CurrencyCode::INR,
            backend: BackendConfig {
                api_url: Url::parse(&backend.api_url())?,
                timeout: Duration::from_secs(5),
                catalog_cache_ttl: Duration::from_secs(300),
            },
            sentry_dsn: None,
            sentry_environment: None,
        };

        let app = handyhub_storefront::app(AppState::new(config)?);
        let service = ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app);
        tokio::spawn(async move {
            let _ = axum::serve(listener, service).await;
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            client,
            storefront_url,
            backend,
        })
    }

    /// Absolute storefront URL for a path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }

    /// `GET` a storefront page.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client.get(self.url(path)).send().await
    }

    /// `POST` a urlencoded form, as a plain browser submit.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn post_form(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> reqwest::Result<reqwest::Response> {
        self.client.post(self.url(path)).form(form).send().await
    }

    /// `POST` a urlencoded form the way HTMX does.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn htmx_post(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> reqwest::Result<reqwest::Response> {
        self.client
            .post(self.url(path))
            .header("HX-Request", "true")
            .form(form)
            .send()
            .await
    }

    /// Sign in through the login form.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn sign_in(&self, email: &str) -> reqwest::Result<reqwest::Response> {
        self.post_form("/auth/login", &[("email", email), ("password", PASSWORD)])
            .await
    }
}

/// The `Location` header of a redirect, if any.
#[must_use]
pub fn location(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
