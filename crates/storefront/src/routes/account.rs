//! Account route handlers: the address book.
//!
//! These routes require authentication. Addresses live on the backend; the
//! forms here only normalize and pre-validate before sending.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use handyhub_core::{AddressId, AddressInput};
use serde::Deserialize;
use tracing::instrument;

use super::views::{AddressView, PageContext};
use crate::backend::BackendError;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{BackendSession, RequireAuth};
use crate::state::AppState;

/// Address form data.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AddressForm {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub landmark: String,
    /// Checkbox: present when ticked.
    #[serde(default)]
    pub is_default: Option<String>,
}

impl AddressForm {
    /// Normalized, validated request body.
    fn to_input(&self) -> std::result::Result<AddressInput, String> {
        let input = AddressInput {
            label: Some(self.label.clone()),
            full_name: self.full_name.clone(),
            phone: self.phone.clone(),
            address_line1: self.address_line1.clone(),
            address_line2: Some(self.address_line2.clone()),
            city: self.city.clone(),
            state: self.state.clone(),
            pincode: self.pincode.clone(),
            landmark: Some(self.landmark.clone()),
            is_default: self.is_default.is_some(),
        }
        .normalized();
        input.validate().map_err(|e| e.to_string())?;
        Ok(input)
    }
}

/// Flash message query parameter set after a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct AddressesQuery {
    pub saved: Option<u8>,
}

/// Address book template.
#[derive(Template, WebTemplate)]
#[template(path = "account/addresses.html")]
pub struct AddressesTemplate {
    pub page: PageContext,
    pub addresses: Vec<AddressView>,
    pub form: AddressForm,
    pub message: Option<String>,
    pub error: Option<String>,
}

async fn render(
    state: &AppState,
    page: PageContext,
    backend_session: &mut BackendSession,
    form: AddressForm,
    message: Option<String>,
    error: Option<String>,
) -> Result<Response> {
    let result = state.backend().list_addresses(backend_session.jar()).await;
    let addresses = match backend_session.settle(result).await {
        Ok(addresses) => addresses.iter().map(AddressView::from).collect(),
        Err(BackendError::Unauthorized) => return Err(BackendError::Unauthorized.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load addresses");
            Vec::new()
        }
    };

    let status = if error.is_some() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        AddressesTemplate {
            page,
            addresses,
            form,
            message,
            error,
        },
    )
        .into_response())
}

/// Redirect back to the address book, or map the failure.
fn back_to_addresses(result: std::result::Result<(), BackendError>) -> Result<Response> {
    match result {
        Ok(()) => Ok(Redirect::to("/account/addresses?saved=1").into_response()),
        Err(BackendError::NotFound(_)) => Err(AppError::NotFound("Address".to_string())),
        Err(e) => Err(e.into()),
    }
}

/// Display the address book with an empty "new address" form.
#[instrument(skip(state, page, backend_session, query, user), fields(user_id = %user.id))]
pub async fn addresses(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<AddressesQuery>,
    page: PageContext,
    mut backend_session: BackendSession,
) -> Result<Response> {
    let message = query.saved.map(|_| "Address book updated".to_string());
    render(
        &state,
        page,
        &mut backend_session,
        AddressForm::default(),
        message,
        None,
    )
    .await
}

/// Save a new address.
#[instrument(skip(state, page, backend_session, user, form), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
    mut backend_session: BackendSession,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    let input = match form.to_input() {
        Ok(input) => input,
        Err(message) => {
            return render(&state, page, &mut backend_session, form, None, Some(message)).await;
        }
    };

    let result = state
        .backend()
        .create_address(backend_session.jar(), &input)
        .await;

    match backend_session.settle(result).await {
        Ok(address) => {
            tracing::info!(address_id = %address.id, "Address saved");
            Ok(Redirect::to("/account/addresses?saved=1").into_response())
        }
        Err(e) if e.is_user_facing() => {
            let message = e.user_message();
            render(&state, page, &mut backend_session, form, None, Some(message)).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Replace an existing address.
#[instrument(skip(state, page, backend_session, user, form), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<AddressId>,
    page: PageContext,
    mut backend_session: BackendSession,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    let input = match form.to_input() {
        Ok(input) => input,
        Err(message) => {
            return render(&state, page, &mut backend_session, form, None, Some(message)).await;
        }
    };

    let result = state
        .backend()
        .update_address(backend_session.jar(), id, &input)
        .await
        .map(|_| ());
    back_to_addresses(backend_session.settle(result).await)
}

/// Delete an address.
#[instrument(skip(state, backend_session, user), fields(user_id = %user.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<AddressId>,
    mut backend_session: BackendSession,
) -> Result<Response> {
    let result = state
        .backend()
        .delete_address(backend_session.jar(), id)
        .await;
    back_to_addresses(backend_session.settle(result).await)
}

/// Make an address the default for bookings.
#[instrument(skip(state, backend_session, user), fields(user_id = %user.id))]
pub async fn set_default(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<AddressId>,
    mut backend_session: BackendSession,
) -> Result<Response> {
    let result = state
        .backend()
        .set_default_address(backend_session.jar(), id)
        .await;
    back_to_addresses(backend_session.settle(result).await)
}
