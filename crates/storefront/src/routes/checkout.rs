//! Checkout: turn the cart into a booking.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{Local, NaiveDate};
use handyhub_core::{AddressId, BookingRequest, PaymentMethod};
use serde::Deserialize;
use tracing::instrument;

use super::views::{AddressView, CartView, PageContext};
use crate::backend::BackendError;
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::{BackendSession, RequireAuth, login_url};
use crate::state::AppState;

/// Time slots offered for a booking.
pub const TIME_SLOTS: [&str; 6] = [
    "08:00 - 10:00",
    "10:00 - 12:00",
    "12:00 - 14:00",
    "14:00 - 16:00",
    "16:00 - 18:00",
    "18:00 - 20:00",
];

/// Booking form data.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutForm {
    pub address_id: Option<AddressId>,
    #[serde(default)]
    pub scheduled_date: String,
    #[serde(default)]
    pub time_slot: String,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub notes: String,
}

impl CheckoutForm {
    /// Build and validate the booking request.
    fn to_booking(&self, today: NaiveDate) -> Result<BookingRequest, String> {
        let address_id = self
            .address_id
            .ok_or_else(|| "Please choose a service address".to_string())?;
        let scheduled_date = NaiveDate::parse_from_str(self.scheduled_date.trim(), "%Y-%m-%d")
            .map_err(|_| "Please choose a date".to_string())?;
        if !TIME_SLOTS.contains(&self.time_slot.as_str()) {
            return Err("Please choose a time slot".to_string());
        }
        let notes = self.notes.trim();

        let booking = BookingRequest {
            address_id,
            scheduled_date,
            time_slot: self.time_slot.clone(),
            payment_method: self.payment_method,
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        };
        booking.validate(today).map_err(|e| e.to_string())?;
        Ok(booking)
    }
}

/// Time slot option for the form.
#[derive(Clone, Debug)]
pub struct SlotOption {
    pub value: String,
    pub selected: bool,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub cart: CartView,
    pub addresses: Vec<AddressView>,
    pub selected_address: i32,
    pub slots: Vec<SlotOption>,
    pub min_date: String,
    pub scheduled_date: String,
    pub pay_online: bool,
    pub notes: String,
    pub error: Option<String>,
}

/// Today's date for booking validation, in the server's timezone.
fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Render the form, or send the customer elsewhere when there is nothing to book.
async fn render(
    state: &AppState,
    page: PageContext,
    backend_session: &mut BackendSession,
    form: &CheckoutForm,
    error: Option<String>,
) -> Response {
    let backend = state.backend();
    let cart = backend.get_cart(backend_session.jar()).await;
    let cart = backend_session.settle(cart).await;
    let addresses = backend.list_addresses(backend_session.jar()).await;
    let addresses = match backend_session.settle(addresses).await {
        Err(BackendError::Unauthorized) => {
            return Redirect::to(&login_url("/checkout")).into_response();
        }
        other => other,
    };

    let cart = match cart {
        Ok(cart) if !cart.is_empty() => cart,
        Ok(_) => return Redirect::to("/cart").into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch cart for checkout");
            return Redirect::to("/cart").into_response();
        }
    };

    let addresses: Vec<AddressView> = addresses
        .map(|list| list.iter().map(AddressView::from).collect())
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to fetch addresses for checkout");
            Vec::new()
        });

    // Saved choice first, then the default address (listed first)
    let selected_address = form
        .address_id
        .map(|id| id.as_i32())
        .or_else(|| addresses.first().map(|a| a.id))
        .unwrap_or(0);

    let status = if error.is_some() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };

    (
        status,
        CheckoutTemplate {
            page,
            cart: CartView::new(&cart, state.currency()),
            addresses,
            selected_address,
            slots: TIME_SLOTS
                .iter()
                .map(|slot| SlotOption {
                    value: (*slot).to_string(),
                    selected: form.time_slot == *slot,
                })
                .collect(),
            min_date: today().format("%Y-%m-%d").to_string(),
            scheduled_date: form.scheduled_date.clone(),
            pay_online: form.payment_method == PaymentMethod::Online,
            notes: form.notes.clone(),
            error,
        },
    )
        .into_response()
}

/// Display the booking form.
#[instrument(skip(state, page, backend_session, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
    mut backend_session: BackendSession,
) -> Response {
    render(&state, page, &mut backend_session, &CheckoutForm::default(), None).await
}

/// Place the order and go to its confirmation page.
#[instrument(skip(state, page, backend_session, user, form), fields(user_id = %user.id))]
pub async fn place(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
    mut backend_session: BackendSession,
    Form(form): Form<CheckoutForm>,
) -> Response {
    let booking = match form.to_booking(today()) {
        Ok(booking) => booking,
        Err(message) => {
            return render(&state, page, &mut backend_session, &form, Some(message)).await;
        }
    };

    let result = state
        .backend()
        .create_order(backend_session.jar(), &booking)
        .await;

    match backend_session.settle(result).await {
        Ok(order) => {
            add_breadcrumb(
                "checkout",
                "Order placed",
                Some(&[("order", order.order_number.as_str())]),
            );
            Redirect::to(&format!("/orders/{}?placed=1", order.id)).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Order creation failed");
            let message = e.user_message();
            render(&state, page, &mut backend_session, &form, Some(message)).await
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(date: &str, slot: &str) -> CheckoutForm {
        CheckoutForm {
            address_id: Some(AddressId::new(4)),
            scheduled_date: date.to_string(),
            time_slot: slot.to_string(),
            payment_method: PaymentMethod::Cash,
            notes: "  Ring the bell twice ".to_string(),
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_to_booking_valid() {
        let booking = form("2026-03-14", "10:00 - 12:00")
            .to_booking(day("2026-03-10"))
            .unwrap();
        assert_eq!(booking.address_id, AddressId::new(4));
        assert_eq!(booking.notes.as_deref(), Some("Ring the bell twice"));
    }

    #[test]
    fn test_to_booking_rejects_bad_input() {
        let today = day("2026-03-10");
        assert!(form("2026-03-09", "10:00 - 12:00").to_booking(today).is_err());
        assert!(form("", "10:00 - 12:00").to_booking(today).is_err());
        assert!(form("2026-03-14", "03:00 - 04:00").to_booking(today).is_err());

        let mut no_address = form("2026-03-14", "10:00 - 12:00");
        no_address.address_id = None;
        assert_eq!(
            no_address.to_booking(today).unwrap_err(),
            "Please choose a service address"
        );
    }
}
