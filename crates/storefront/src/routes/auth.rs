//! Authentication route handlers.
//!
//! Login and registration go through the backend's `/api/auth/*` endpoints.
//! The backend's session cookie lands in the visitor's [`BackendSession`] jar;
//! a copy of the account is kept in the storefront session for the header and
//! route guards.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use handyhub_core::Email;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::instrument;

use super::views::PageContext;
use crate::backend::{BackendError, LoginRequest, RegisterRequest};
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{BackendSession, OptionalAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
    #[serde(default)]
    pub next: Option<String>,
}

impl RegisterForm {
    fn to_request(&self) -> Result<RegisterRequest, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Please enter your name.".to_string());
        }
        let email =
            Email::parse(&self.email).map_err(|_| "Please enter a valid email address.".to_string())?;
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters."
            ));
        }
        if self.password != self.password_confirm {
            return Err("Passwords do not match.".to_string());
        }
        let phone = self.phone.trim();

        Ok(RegisterRequest {
            name: name.to_string(),
            email: email.into(),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
            password: SecretString::from(self.password.clone()),
        })
    }
}

// =============================================================================
// Query Types
// =============================================================================

/// Where to go after signing in.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Keep post-login redirects on this site.
///
/// Only absolute local paths are accepted; anything else (including
/// protocol-relative `//host` URLs) falls back to the home page.
#[must_use]
pub fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.starts_with("/auth/") =>
        {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub email: String,
    pub next: String,
    pub error: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub next: String,
    pub error: Option<String>,
}

/// Store the signed-in account and go on.
async fn complete_sign_in(
    backend_session: &BackendSession,
    user: &handyhub_core::User,
    next: &str,
) -> Response {
    backend_session.save().await;

    let current = CurrentUser::from(user);
    if let Err(e) = set_current_user(backend_session.session(), &current).await {
        tracing::error!(error = %e, "Failed to set session");
        return Redirect::to("/auth/login").into_response();
    }
    set_sentry_user(&current.id, Some(&current.email));
    add_breadcrumb("auth", "Signed in", None);

    Redirect::to(next).into_response()
}

/// Whether a visitor the session thinks is signed in still is on the backend.
///
/// Refreshes the stored account on success. An expired backend session is
/// cleared (see [`BackendSession::settle`]) so the auth forms show again.
async fn still_signed_in(state: &AppState, backend_session: &mut BackendSession) -> bool {
    let result = state.backend().current_user(backend_session.jar()).await;
    match backend_session.settle(result).await {
        Ok(user) => {
            let current = CurrentUser::from(&user);
            if let Err(e) = backend_session
                .session()
                .insert(session_keys::CURRENT_USER, &current)
                .await
            {
                tracing::error!(error = %e, "Failed to refresh session user");
            }
            true
        }
        Err(BackendError::Unauthorized) => false,
        Err(e) => {
            tracing::warn!(error = %e, "Could not confirm backend session");
            true
        }
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
///
/// Visitors who are still signed in on the backend go straight on.
#[instrument(skip(state, page, query, current, backend_session))]
pub async fn login_page(
    State(state): State<AppState>,
    OptionalAuth(current): OptionalAuth,
    Query(query): Query<NextQuery>,
    mut backend_session: BackendSession,
    mut page: PageContext,
) -> Response {
    let next = safe_next(query.next.as_deref());
    if current.is_some() {
        if still_signed_in(&state, &mut backend_session).await {
            return Redirect::to(&next).into_response();
        }
        page.user = None;
    }

    LoginTemplate {
        page,
        email: String::new(),
        next,
        error: None,
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, page, backend_session, form))]
pub async fn login(
    State(state): State<AppState>,
    page: PageContext,
    mut backend_session: BackendSession,
    Form(form): Form<LoginForm>,
) -> Response {
    let next = safe_next(form.next.as_deref());
    let request = LoginRequest {
        email: form.email.trim().to_lowercase(),
        password: SecretString::from(form.password),
    };

    let result = state.backend().login(backend_session.jar(), &request).await;
    match result {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "Login succeeded");
            complete_sign_in(&backend_session, &user, &next).await
        }
        Err(e) => {
            backend_session.save().await;
            tracing::warn!(error = %e, "Login failed");
            let error = match e {
                BackendError::Unauthorized => "Incorrect email or password.".to_string(),
                other => other.user_message(),
            };
            (
                StatusCode::UNAUTHORIZED,
                LoginTemplate {
                    page,
                    email: request.email,
                    next,
                    error: Some(error),
                },
            )
                .into_response()
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
#[instrument(skip(state, page, query, current, backend_session))]
pub async fn register_page(
    State(state): State<AppState>,
    OptionalAuth(current): OptionalAuth,
    Query(query): Query<NextQuery>,
    mut backend_session: BackendSession,
    mut page: PageContext,
) -> Response {
    let next = safe_next(query.next.as_deref());
    if current.is_some() {
        if still_signed_in(&state, &mut backend_session).await {
            return Redirect::to(&next).into_response();
        }
        page.user = None;
    }

    RegisterTemplate {
        page,
        name: String::new(),
        email: String::new(),
        phone: String::new(),
        next,
        error: None,
    }
    .into_response()
}

/// Handle registration form submission.
///
/// The backend signs the new customer in, so success goes straight on.
#[instrument(skip(state, page, backend_session, form))]
pub async fn register(
    State(state): State<AppState>,
    page: PageContext,
    mut backend_session: BackendSession,
    Form(form): Form<RegisterForm>,
) -> Response {
    let next = safe_next(form.next.as_deref());
    let rejected = |page: PageContext, error: String| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            RegisterTemplate {
                page,
                name: form.name.clone(),
                email: form.email.clone(),
                phone: form.phone.clone(),
                next: next.clone(),
                error: Some(error),
            },
        )
            .into_response()
    };

    let request = match form.to_request() {
        Ok(request) => request,
        Err(error) => return rejected(page, error),
    };

    let result = state
        .backend()
        .register(backend_session.jar(), &request)
        .await;
    match result {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "Registration succeeded");
            complete_sign_in(&backend_session, &user, &next).await
        }
        Err(e) => {
            backend_session.save().await;
            tracing::warn!(error = %e, "Registration failed");
            rejected(page, e.user_message())
        }
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Ends the backend session (best effort) and then the storefront session.
#[instrument(skip(state, backend_session))]
pub async fn logout(State(state): State<AppState>, mut backend_session: BackendSession) -> Response {
    if let Err(e) = state.backend().logout(backend_session.jar()).await {
        tracing::warn!(error = %e, "Backend logout failed");
    }
    backend_session.save().await;

    let session = backend_session.session();
    if let Err(e) = clear_current_user(session).await {
        tracing::error!(error = %e, "Failed to clear session");
    }
    if let Err(e) = session.flush().await {
        tracing::error!(error = %e, "Failed to flush session");
    }
    clear_sentry_user();

    Redirect::to("/").into_response()
}
