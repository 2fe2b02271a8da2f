//! Contact page and message form.
//!
//! Messages are forwarded to the backend, which notifies the support team.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use handyhub_core::{ContactMessage, ContactSettings, Email};
use serde::Deserialize;
use tracing::instrument;

use super::views::PageContext;
use crate::error::add_breadcrumb;
use crate::filters;
use crate::state::AppState;

/// Maximum message length accepted by the form.
const MAX_MESSAGE_LENGTH: usize = 2000;

/// Contact form data.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
}

impl ContactForm {
    fn to_message(&self) -> Result<ContactMessage, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Please tell us your name.".to_string());
        }
        let email = Email::parse(&self.email).map_err(|_| "Please enter a valid email address.".to_string())?;
        let message = self.message.trim();
        if message.is_empty() {
            return Err("Please enter a message.".to_string());
        }
        if message.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(format!(
                "Messages are limited to {MAX_MESSAGE_LENGTH} characters."
            ));
        }
        let phone = self.phone.trim();

        Ok(ContactMessage {
            name: name.to_string(),
            email: email.into(),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
            message: message.to_string(),
        })
    }
}

/// Query flag set after a successful submission.
#[derive(Debug, Default, Deserialize)]
pub struct ContactQuery {
    pub sent: Option<u8>,
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub page: PageContext,
    pub address: Option<String>,
    pub working_hours: Option<String>,
    pub form: ContactForm,
    pub sent: bool,
    pub error: Option<String>,
}

async fn render(
    state: &AppState,
    page: PageContext,
    form: ContactForm,
    sent: bool,
    error: Option<String>,
) -> Response {
    let settings = state
        .backend()
        .contact_settings()
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load contact settings");
            std::sync::Arc::new(ContactSettings::default())
        });

    let status = if error.is_some() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };

    (
        status,
        ContactTemplate {
            page,
            address: settings.address.clone(),
            working_hours: settings.working_hours.clone(),
            form,
            sent,
            error,
        },
    )
        .into_response()
}

/// Display contact details and the message form.
#[instrument(skip(state, page, query))]
pub async fn show(
    State(state): State<AppState>,
    Query(query): Query<ContactQuery>,
    page: PageContext,
) -> Response {
    render(&state, page, ContactForm::default(), query.sent.is_some(), None).await
}

/// Send a message to the support team.
#[instrument(skip(state, page, form))]
pub async fn submit(
    State(state): State<AppState>,
    page: PageContext,
    Form(form): Form<ContactForm>,
) -> Response {
    let message = match form.to_message() {
        Ok(message) => message,
        Err(error) => return render(&state, page, form, false, Some(error)).await,
    };

    match state.backend().send_contact_message(&message).await {
        Ok(()) => {
            add_breadcrumb("contact", "Message sent", None);
            Redirect::to("/contact?sent=1").into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to send contact message");
            let error = e.user_message();
            render(&state, page, form, false, Some(error)).await
        }
    }
}
