//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself lives on the backend, keyed by the backend cookie kept in
//! the visitor's session; every total shown here is the backend's.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use handyhub_core::{
    Cart, CartItemId, Coupon, CouponValidation, CurrencyCode, ServiceId, format_amount,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use super::views::{CartView, PageContext};
use crate::backend::BackendError;
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::BackendSession;
use crate::state::AppState;

/// HTMX event fired whenever the cart changes; the header badge listens for it.
pub const CART_UPDATED_TRIGGER: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub service_id: ServiceId,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: CartItemId,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: CartItemId,
}

/// Coupon form data.
#[derive(Debug, Deserialize)]
pub struct CouponForm {
    #[serde(default)]
    pub code: String,
}

/// Coupon display data.
#[derive(Clone, Debug)]
pub struct CouponView {
    pub code: String,
    pub label: String,
    pub description: String,
    pub min_order: Option<String>,
    pub valid_until: Option<String>,
    /// Display hint only; the backend decides when the coupon is applied.
    pub eligible: bool,
}

impl CouponView {
    fn new(coupon: &Coupon, subtotal: Option<Decimal>, currency: CurrencyCode) -> Self {
        Self {
            code: coupon.code.clone(),
            label: coupon.label(currency),
            description: coupon.description.clone().unwrap_or_default(),
            min_order: coupon.min_order_amount.map(|m| format_amount(m, currency)),
            valid_until: coupon
                .valid_until
                .map(|until| until.format("%d %b %Y").to_string()),
            eligible: subtotal.is_some_and(|s| coupon.meets_minimum(s)),
        }
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub page: PageContext,
    pub cart: CartView,
    pub message: Option<String>,
    pub error: Option<String>,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
    pub message: Option<String>,
    pub error: Option<String>,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Inline error fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/flash_error.html")]
pub struct FlashErrorTemplate {
    pub message: String,
}

/// Coupon dry-run result fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/coupon_check.html")]
pub struct CouponCheckTemplate {
    pub valid: bool,
    pub message: String,
}

impl CouponCheckTemplate {
    fn new(code: &str, validation: &CouponValidation, currency: CurrencyCode) -> Self {
        if !validation.valid {
            return Self {
                valid: false,
                message: validation
                    .message
                    .clone()
                    .unwrap_or_else(|| format!("{code} does not apply to your cart")),
            };
        }
        let saves = format_amount(validation.discount_amount, currency);
        let message = match validation.final_amount {
            Some(total) => format!(
                "{code} saves {saves}; you would pay {}",
                format_amount(total, currency)
            ),
            None => format!("{code} saves {saves}"),
        };
        Self {
            valid: true,
            message,
        }
    }
}

/// Coupon listing template.
#[derive(Template, WebTemplate)]
#[template(path = "coupons.html")]
pub struct CouponsTemplate {
    pub page: PageContext,
    pub coupons: Vec<CouponView>,
    pub cart_subtotal: Option<String>,
}

fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

/// Status for an HTMX error fragment. HTMX only swaps 2xx responses unless
/// told otherwise, so user-facing rejections stay 200 and operational
/// failures surface as errors.
fn fragment_status(err: &BackendError) -> StatusCode {
    if err.is_user_facing() {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    }
}

/// Items fragment for a changed cart, firing `cart-updated`.
fn items_fragment(cart: &Cart, currency: CurrencyCode, message: Option<String>) -> Response {
    (
        AppendHeaders([CART_UPDATED_TRIGGER]),
        CartItemsTemplate {
            cart: CartView::new(cart, currency),
            message,
            error: None,
        },
    )
        .into_response()
}

/// Items fragment showing an error next to the current cart.
async fn items_error_fragment(
    state: &AppState,
    backend_session: &mut BackendSession,
    err: &BackendError,
) -> Response {
    let currency = state.currency();
    let result = state.backend().get_cart(backend_session.jar()).await;
    let cart = match backend_session.settle(result).await {
        Ok(cart) => CartView::new(&cart, currency),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to reload cart after error");
            CartView::empty(currency)
        }
    };

    (
        fragment_status(err),
        CartItemsTemplate {
            cart,
            message: None,
            error: Some(err.user_message()),
        },
    )
        .into_response()
}

/// Display cart page.
#[instrument(skip(state, page, backend_session))]
pub async fn show(
    State(state): State<AppState>,
    page: PageContext,
    mut backend_session: BackendSession,
) -> impl IntoResponse {
    let currency = state.currency();
    let result = state.backend().get_cart(backend_session.jar()).await;
    let cart = match backend_session.settle(result).await {
        Ok(cart) => CartView::new(&cart, currency),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch cart");
            CartView::empty(currency)
        }
    };

    CartShowTemplate {
        page,
        cart,
        message: None,
        error: None,
    }
}

/// Add a service to the cart (HTMX).
///
/// Returns the updated count badge plus a `cart-updated` trigger. Plain form
/// posts are redirected to the cart page.
#[instrument(skip(state, headers, backend_session))]
pub async fn add(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut backend_session: BackendSession,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let quantity = form.quantity.unwrap_or(1).max(1);
    let result = state
        .backend()
        .add_to_cart(backend_session.jar(), form.service_id, quantity)
        .await;

    match backend_session.settle(result).await {
        Ok(cart) => {
            let service_id = form.service_id.to_string();
            add_breadcrumb("cart", "Added service", Some(&[("service_id", service_id.as_str())]));

            if !is_htmx(&headers) {
                return Redirect::to("/cart").into_response();
            }
            (
                AppendHeaders([CART_UPDATED_TRIGGER]),
                CartCountTemplate {
                    count: cart.total_quantity(),
                },
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, service_id = %form.service_id, "Failed to add service to cart");
            if !is_htmx(&headers) {
                return Redirect::to("/cart").into_response();
            }
            (
                fragment_status(&e),
                FlashErrorTemplate {
                    message: e.user_message(),
                },
            )
                .into_response()
        }
    }
}

/// Update cart line quantity (HTMX). Zero removes the line.
#[instrument(skip(state, backend_session))]
pub async fn update(
    State(state): State<AppState>,
    mut backend_session: BackendSession,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let result = state
        .backend()
        .update_cart_item(backend_session.jar(), form.item_id, form.quantity)
        .await;

    match backend_session.settle(result).await {
        Ok(cart) => items_fragment(&cart, state.currency(), None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to update cart");
            items_error_fragment(&state, &mut backend_session, &e).await
        }
    }
}

/// Remove a cart line (HTMX).
#[instrument(skip(state, backend_session))]
pub async fn remove(
    State(state): State<AppState>,
    mut backend_session: BackendSession,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let result = state
        .backend()
        .remove_cart_item(backend_session.jar(), form.item_id)
        .await;

    match backend_session.settle(result).await {
        Ok(cart) => items_fragment(&cart, state.currency(), None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to remove from cart");
            items_error_fragment(&state, &mut backend_session, &e).await
        }
    }
}

/// Cart count badge (HTMX): the sum of line quantities.
#[instrument(skip(state, backend_session))]
pub async fn count(
    State(state): State<AppState>,
    mut backend_session: BackendSession,
) -> impl IntoResponse {
    let result = state.backend().get_cart(backend_session.jar()).await;
    let count = backend_session
        .settle(result)
        .await
        .map(|cart| cart.total_quantity())
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to fetch cart for badge");
            0
        });

    CartCountTemplate { count }
}

/// Apply a coupon to the cart (HTMX).
///
/// A rejected code re-renders the cart with the backend's reason.
#[instrument(skip(state, backend_session))]
pub async fn apply_coupon(
    State(state): State<AppState>,
    mut backend_session: BackendSession,
    Form(form): Form<CouponForm>,
) -> Response {
    let result = state
        .backend()
        .apply_coupon(backend_session.jar(), &form.code)
        .await;

    match backend_session.settle(result).await {
        Ok(cart) => {
            let message = cart
                .coupon_code
                .as_ref()
                .map(|code| format!("Coupon {code} applied"));
            items_fragment(&cart, state.currency(), message)
        }
        Err(e) => {
            tracing::info!(error = %e, "Coupon rejected");
            items_error_fragment(&state, &mut backend_session, &e).await
        }
    }
}

/// Remove the coupon from the cart (HTMX).
#[instrument(skip(state, backend_session))]
pub async fn remove_coupon(
    State(state): State<AppState>,
    mut backend_session: BackendSession,
) -> Response {
    let result = state.backend().remove_coupon(backend_session.jar()).await;

    match backend_session.settle(result).await {
        Ok(cart) => items_fragment(&cart, state.currency(), Some("Coupon removed".to_string())),
        Err(e) => {
            tracing::error!(error = %e, "Failed to remove coupon");
            items_error_fragment(&state, &mut backend_session, &e).await
        }
    }
}

/// Empty the cart (HTMX). Plain form posts are redirected to the cart page.
#[instrument(skip(state, headers, backend_session))]
pub async fn clear(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut backend_session: BackendSession,
) -> Response {
    let result = state.backend().clear_cart(backend_session.jar()).await;

    match backend_session.settle(result).await {
        Ok(()) => {
            add_breadcrumb("cart", "Cleared cart", None);
            if !is_htmx(&headers) {
                return Redirect::to("/cart").into_response();
            }
            items_fragment(&Cart::empty(), state.currency(), Some("Cart cleared".to_string()))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to clear cart");
            items_error_fragment(&state, &mut backend_session, &e).await
        }
    }
}

/// Check a coupon against the current cart without applying it (HTMX).
#[instrument(skip(state, backend_session))]
pub async fn check_coupon(
    State(state): State<AppState>,
    mut backend_session: BackendSession,
    Form(form): Form<CouponForm>,
) -> Response {
    let backend = state.backend();
    let code = form.code.trim().to_uppercase();

    let cart = backend.get_cart(backend_session.jar()).await;
    let subtotal = match backend_session.settle(cart).await {
        Ok(cart) if !cart.is_empty() => cart.subtotal,
        Ok(_) => {
            return CouponCheckTemplate {
                valid: false,
                message: "Add a service to your cart to check this coupon".to_string(),
            }
            .into_response();
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch cart for coupon check");
            return (
                fragment_status(&e),
                FlashErrorTemplate {
                    message: e.user_message(),
                },
            )
                .into_response();
        }
    };

    let result = backend
        .validate_coupon(backend_session.jar(), &code, subtotal)
        .await;
    match backend_session.settle(result).await {
        Ok(validation) => CouponCheckTemplate::new(&code, &validation, state.currency()).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Coupon check failed");
            (
                fragment_status(&e),
                FlashErrorTemplate {
                    message: e.user_message(),
                },
            )
                .into_response()
        }
    }
}

/// Display live coupons with a hint of which the current cart qualifies for.
#[instrument(skip(state, page, backend_session))]
pub async fn coupons(
    State(state): State<AppState>,
    page: PageContext,
    mut backend_session: BackendSession,
) -> impl IntoResponse {
    let currency = state.currency();
    let backend = state.backend();

    let (coupons, cart) = tokio::join!(backend.list_coupons(), backend.get_cart(backend_session.jar()));
    let cart = backend_session.settle(cart).await;

    let subtotal = cart.ok().filter(|c| !c.is_empty()).map(|c| c.subtotal);

    let coupons = coupons.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load coupons");
        Vec::new()
    });

    CouponsTemplate {
        page,
        coupons: coupons
            .iter()
            .map(|c| CouponView::new(c, subtotal, currency))
            .collect(),
        cart_subtotal: subtotal.map(|s| format_amount(s, currency)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn coupon(min: Option<&str>) -> Coupon {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "code": "SAVE20",
            "discountType": "percentage",
            "discountValue": "20",
            "minOrderAmount": min,
        }))
        .unwrap()
    }

    #[test]
    fn test_coupon_view_eligibility_hint() {
        let subtotal = Some(Decimal::from_str("799").unwrap());

        let view = CouponView::new(&coupon(Some("500")), subtotal, CurrencyCode::INR);
        assert!(view.eligible);
        assert_eq!(view.label, "20% off");
        assert_eq!(view.min_order.as_deref(), Some("₹500.00"));

        let view = CouponView::new(&coupon(Some("999")), subtotal, CurrencyCode::INR);
        assert!(!view.eligible);

        let view = CouponView::new(&coupon(None), None, CurrencyCode::INR);
        assert!(!view.eligible);
    }

    #[test]
    fn test_coupon_check_messages() {
        let accepted = CouponValidation {
            valid: true,
            discount_amount: Decimal::from(100),
            final_amount: Some(Decimal::from(1899)),
            message: None,
        };
        let check = CouponCheckTemplate::new("FIRST100", &accepted, CurrencyCode::INR);
        assert!(check.valid);
        assert_eq!(check.message, "FIRST100 saves ₹100.00; you would pay ₹1899.00");

        let refused = CouponValidation {
            valid: false,
            discount_amount: Decimal::ZERO,
            final_amount: None,
            message: Some("Minimum order amount is 500".to_string()),
        };
        let check = CouponCheckTemplate::new("FIRST100", &refused, CurrencyCode::INR);
        assert!(!check.valid);
        assert_eq!(check.message, "Minimum order amount is 500");
    }

    #[test]
    fn test_fragment_status() {
        let rejected = BackendError::Api {
            status: 400,
            message: "Coupon has expired".to_string(),
        };
        assert_eq!(fragment_status(&rejected), StatusCode::OK);
        assert_eq!(
            fragment_status(&BackendError::MissingData("cart")),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_is_htmx() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));
        headers.insert("hx-request", "true".parse().unwrap());
        assert!(is_htmx(&headers));
    }
}
