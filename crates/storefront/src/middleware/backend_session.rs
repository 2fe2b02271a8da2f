//! Per-visitor backend cookie jar, loaded from and saved to the session.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::backend::{BackendError, CookieJar};
use crate::error::AppError;
use crate::middleware::clear_current_user;
use crate::models::session_keys;

/// The visitor's backend cookies.
///
/// Pass [`BackendSession::jar`] to session-scoped client calls, then hand
/// the result to [`BackendSession::settle`] so cookies the backend set (a new
/// guest cart, a login) survive to the next request, and a lapsed backend
/// session signs the visitor out here too.
///
/// # Example
///
/// ```rust,ignore
/// async fn cart(State(state): State<AppState>, mut backend: BackendSession) -> impl IntoResponse {
///     let result = state.backend().get_cart(backend.jar()).await;
///     let cart = backend.settle(result).await;
///     // ...
/// }
/// ```
pub struct BackendSession {
    session: Session,
    jar: CookieJar,
}

impl BackendSession {
    /// Mutable access to the jar for a backend call.
    pub fn jar(&mut self) -> &mut CookieJar {
        &mut self.jar
    }

    /// The underlying tower session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Persist the jar if a backend response changed it.
    ///
    /// Failures are logged; the next request simply starts without the new
    /// cookies.
    pub async fn save(&self) {
        if !self.jar.is_dirty() {
            return;
        }
        let result = if self.jar.is_empty() {
            self.session
                .remove::<CookieJar>(session_keys::BACKEND_COOKIES)
                .await
                .map(|_| ())
        } else {
            self.session
                .insert(session_keys::BACKEND_COOKIES, &self.jar)
                .await
        };
        if let Err(e) = result {
            tracing::error!(error = %e, "Failed to save backend cookies to session");
        }
    }

    /// Persist the jar and pass the call's result through.
    ///
    /// A backend `401` means its session is gone: the stale cookies and the
    /// signed-in user are dropped so the login form is reachable again.
    pub async fn settle<T>(&mut self, result: Result<T, BackendError>) -> Result<T, BackendError> {
        if matches!(result, Err(BackendError::Unauthorized)) {
            self.expire().await;
        } else {
            self.save().await;
        }
        result
    }

    /// Forget the backend session and the signed-in user.
    pub async fn expire(&mut self) {
        tracing::info!("Backend session expired; signing visitor out");
        self.jar.clear();
        self.save().await;
        if let Err(e) = clear_current_user(&self.session).await {
            tracing::error!(error = %e, "Failed to clear expired user from session");
        }
    }
}

impl<S> FromRequestParts<S> for BackendSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let jar = session
            .get::<CookieJar>(session_keys::BACKEND_COOKIES)
            .await?
            .unwrap_or_default();

        Ok(Self { session, jar })
    }
}
