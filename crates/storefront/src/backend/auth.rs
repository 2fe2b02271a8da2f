//! Customer authentication against the backend.
//!
//! A successful login or registration makes the backend set its session
//! cookie, which lands in the caller's [`CookieJar`].

use handyhub_core::User;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::instrument;

use super::{BackendClient, BackendError, CookieJar};

/// Login credentials.
#[derive(Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: SecretString,
}

/// Registration details.
#[derive(Debug)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: SecretString,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    name: &'a str,
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    password: &'a str,
}

impl BackendClient {
    /// Log in and return the account.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` (or `Api`) for bad credentials.
    #[instrument(skip(self, jar, request), fields(email = %request.email))]
    pub async fn login(
        &self,
        jar: &mut CookieJar,
        request: &LoginRequest,
    ) -> Result<User, BackendError> {
        let body = LoginBody {
            email: &request.email,
            password: request.password.expose_secret(),
        };
        self.send_json::<_, User>(Method::POST, "api/auth/login", &body, Some(jar))
            .await?
            .ok_or(BackendError::MissingData("user"))
    }

    /// Create an account; the backend logs the new customer in.
    ///
    /// # Errors
    ///
    /// Returns `Api` when the email is taken or the input is rejected.
    #[instrument(skip(self, jar, request), fields(email = %request.email))]
    pub async fn register(
        &self,
        jar: &mut CookieJar,
        request: &RegisterRequest,
    ) -> Result<User, BackendError> {
        let body = RegisterBody {
            name: &request.name,
            email: &request.email,
            phone: request.phone.as_deref(),
            password: request.password.expose_secret(),
        };
        self.send_json::<_, User>(Method::POST, "api/auth/register", &body, Some(jar))
            .await?
            .ok_or(BackendError::MissingData("user"))
    }

    /// End the backend session and forget its cookies.
    ///
    /// The jar is cleared even when the backend call fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, jar))]
    pub async fn logout(&self, jar: &mut CookieJar) -> Result<(), BackendError> {
        let result = self
            .send_empty::<serde_json::Value>(Method::POST, "api/auth/logout", Some(jar))
            .await;
        jar.clear();
        result.map(|_| ())
    }

    /// The account behind the jar's session, if still valid.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` when the backend session has expired.
    #[instrument(skip(self, jar))]
    pub async fn current_user(&self, jar: &mut CookieJar) -> Result<User, BackendError> {
        self.get("api/auth/me", Some(jar), "user").await
    }
}
