//! Display data shared by page templates.
//!
//! Templates never format money themselves: every price arrives here as a
//! ready-to-print string in the configured currency.

use axum::{extract::FromRequestParts, http::request::Parts};
use handyhub_core::{
    Cart, CartItem, Category, CurrencyCode, OfferPlan, Order, OrderItem, Service, UserAddress,
    format_amount,
};
use rust_decimal::Decimal;
use tower_sessions::Session;

use crate::middleware::CspNonce;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

// =============================================================================
// Layout
// =============================================================================

/// Data every page needs for the shared layout (header, footer, scripts).
#[derive(Clone, Debug, Default)]
pub struct PageContext {
    /// CSP nonce for inline scripts.
    pub nonce: String,
    /// Signed-in user, if any.
    pub user: Option<CurrentUser>,
    /// Support phone shown in the footer.
    pub support_phone: Option<String>,
    /// Support email shown in the footer.
    pub support_email: Option<String>,
    /// `wa.me` link for the floating WhatsApp button.
    pub whatsapp_link: Option<String>,
}

impl PageContext {
    /// Greeting name for the header.
    #[must_use]
    pub fn user_name(&self) -> Option<&str> {
        self.user.as_ref().map(CurrentUser::first_name)
    }

    /// Whether the signed-in user is an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_admin)
    }
}

impl FromRequestParts<AppState> for PageContext {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let nonce = parts
            .extensions
            .get::<CspNonce>()
            .map(|n| n.0.clone())
            .unwrap_or_default();

        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        let settings = match state.backend().contact_settings().await {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load contact settings for layout");
                None
            }
        };

        Ok(Self {
            nonce,
            user,
            support_phone: settings.as_ref().and_then(|s| s.phone.clone()),
            support_email: settings.as_ref().and_then(|s| s.email.clone()),
            whatsapp_link: settings.as_ref().and_then(|s| s.whatsapp_link()),
        })
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Category tile.
#[derive(Clone, Debug)]
pub struct CategoryCard {
    pub id: i32,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
}

impl From<&Category> for CategoryCard {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.as_i32(),
            slug: category.slug.clone(),
            name: category.name.clone(),
            description: category.description.clone().unwrap_or_default(),
            image_url: category.image_url.clone(),
        }
    }
}

/// Service tile and detail data.
#[derive(Clone, Debug)]
pub struct ServiceCard {
    pub id: i32,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    /// Price actually charged.
    pub price: String,
    /// List price, shown struck through when discounted.
    pub original_price: Option<String>,
    pub discount_percent: Option<u32>,
    pub duration: Option<String>,
    pub rating: Option<String>,
    pub review_count: u32,
}

impl ServiceCard {
    #[must_use]
    pub fn new(service: &Service, currency: CurrencyCode) -> Self {
        let discounted = service.effective_price() < service.price;
        Self {
            id: service.id.as_i32(),
            slug: service.slug.clone(),
            name: service.name.clone(),
            description: service.description.clone().unwrap_or_default(),
            image_url: service.image_url.clone(),
            price: format_amount(service.effective_price(), currency),
            original_price: discounted.then(|| format_amount(service.price, currency)),
            discount_percent: service.discount_percent(),
            duration: service.duration_minutes.map(format_duration),
            rating: service.rating.map(|r| format!("{r:.1}")),
            review_count: service.review_count,
        }
    }
}

/// `90` → `1 hr 30 min`.
#[must_use]
pub fn format_duration(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h} hr"),
        (h, m) => format!("{h} hr {m} min"),
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Cart line display data.
#[derive(Clone, Debug)]
pub struct CartItemView {
    pub id: i32,
    pub service_id: i32,
    pub name: String,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub unit_price: String,
    pub line_price: String,
}

impl CartItemView {
    fn new(item: &CartItem, currency: CurrencyCode) -> Self {
        Self {
            id: item.id.as_i32(),
            service_id: item.service_id.as_i32(),
            name: item.service_name.clone(),
            image_url: item.image_url.clone(),
            quantity: item.quantity,
            unit_price: format_amount(item.unit_price, currency),
            line_price: format_amount(item.total_price, currency),
        }
    }
}

/// Cart display data. Every amount is the backend's, formatted.
#[derive(Clone, Debug)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    /// Present only when a discount applies.
    pub discount: Option<String>,
    /// The backend's `finalAmount`.
    pub total: String,
    pub coupon_code: Option<String>,
    pub item_count: u32,
}

impl CartView {
    #[must_use]
    pub fn new(cart: &Cart, currency: CurrencyCode) -> Self {
        Self {
            items: cart
                .items
                .iter()
                .map(|item| CartItemView::new(item, currency))
                .collect(),
            subtotal: format_amount(cart.subtotal, currency),
            discount: (cart.discount_amount > Decimal::ZERO)
                .then(|| format_amount(cart.discount_amount, currency)),
            total: format_amount(cart.final_amount, currency),
            coupon_code: cart.coupon_code.clone(),
            item_count: cart.total_quantity(),
        }
    }

    /// An empty cart, shown when the backend is unreachable.
    #[must_use]
    pub fn empty(currency: CurrencyCode) -> Self {
        Self::new(&Cart::empty(), currency)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Orders & addresses
// =============================================================================

/// Address display data.
#[derive(Clone, Debug)]
pub struct AddressView {
    pub id: i32,
    pub label: String,
    pub full_name: String,
    pub phone: String,
    pub line: String,
    pub landmark: Option<String>,
    pub is_default: bool,
}

impl From<&UserAddress> for AddressView {
    fn from(address: &UserAddress) -> Self {
        Self {
            id: address.id.as_i32(),
            label: address
                .label
                .clone()
                .unwrap_or_else(|| "Address".to_string()),
            full_name: address.full_name.clone(),
            phone: address.phone.clone(),
            line: address.one_line(),
            landmark: address.landmark.clone(),
            is_default: address.is_default,
        }
    }
}

/// Order line display data.
#[derive(Clone, Debug)]
pub struct OrderItemView {
    pub name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_price: String,
}

impl OrderItemView {
    fn new(item: &OrderItem, currency: CurrencyCode) -> Self {
        Self {
            name: item.service_name.clone(),
            quantity: item.quantity,
            unit_price: format_amount(item.unit_price, currency),
            line_price: format_amount(item.total_price, currency),
        }
    }
}

/// Order display data.
#[derive(Clone, Debug)]
pub struct OrderView {
    pub id: i32,
    pub number: String,
    pub status: String,
    /// `snake_case` status for CSS hooks.
    pub status_key: String,
    pub payment_status: String,
    pub payment_method: String,
    pub items: Vec<OrderItemView>,
    pub subtotal: String,
    pub discount: Option<String>,
    pub total: String,
    pub coupon_code: Option<String>,
    pub address: Option<AddressView>,
    pub scheduled_for: Option<String>,
    pub notes: Option<String>,
    pub placed_on: String,
    pub can_cancel: bool,
}

impl OrderView {
    #[must_use]
    pub fn new(order: &Order, currency: CurrencyCode) -> Self {
        let scheduled_for = match (order.scheduled_date, order.time_slot.as_deref()) {
            (Some(date), Some(slot)) => Some(format!("{}, {slot}", date.format("%a, %d %b %Y"))),
            (Some(date), None) => Some(date.format("%a, %d %b %Y").to_string()),
            (None, _) => None,
        };
        Self {
            id: order.id.as_i32(),
            number: order.order_number.clone(),
            status: order.status.label().to_string(),
            status_key: order.status.as_str().to_string(),
            payment_status: order.payment_status.label().to_string(),
            payment_method: order.payment_method.label().to_string(),
            items: order
                .items
                .iter()
                .map(|item| OrderItemView::new(item, currency))
                .collect(),
            subtotal: format_amount(order.subtotal, currency),
            discount: (!order.discount_amount.is_zero())
                .then(|| format_amount(order.discount_amount, currency)),
            total: format_amount(order.final_amount, currency),
            coupon_code: order.coupon_code.clone(),
            address: order.address.as_ref().map(AddressView::from),
            scheduled_for,
            notes: order.notes.clone(),
            placed_on: order.created_at.format("%d %b %Y").to_string(),
            can_cancel: order.status.is_cancellable(),
        }
    }
}

// =============================================================================
// Offers
// =============================================================================

/// Offer plan display data.
#[derive(Clone, Debug)]
pub struct OfferView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: String,
    pub original_price: Option<String>,
    pub savings: Option<String>,
    pub validity: Option<String>,
    pub features: Vec<String>,
    pub is_popular: bool,
}

impl OfferView {
    #[must_use]
    pub fn new(plan: &OfferPlan, currency: CurrencyCode) -> Self {
        Self {
            id: plan.id.as_i32(),
            name: plan.name.clone(),
            description: plan.description.clone().unwrap_or_default(),
            price: format_amount(plan.price, currency),
            original_price: plan.original_price.map(|p| format_amount(p, currency)),
            savings: plan.savings().map(|s| format_amount(s, currency)),
            validity: plan.validity_days.map(|d| format!("Valid for {d} days")),
            features: plan.features.clone(),
            is_popular: plan.is_popular,
        }
    }
}
