//! The server-held cart as mirrored by the storefront.
//!
//! Totals are computed by the backend. The storefront never recomputes
//! `subtotal`, `discount_amount` or `final_amount`; it only displays them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CartId, CartItemId, ServiceId};

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub service_id: ServiceId,
    pub service_name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// A cart with backend-computed pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default)]
    pub id: Option<CartId>,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub subtotal: Decimal,
    #[serde(default)]
    pub discount_amount: Decimal,
    #[serde(default)]
    pub final_amount: Decimal,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

impl Cart {
    /// A cart with no items, used when the backend has none or is unreachable.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sum of item quantities, shown in the header badge.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether a coupon is currently applied.
    #[must_use]
    pub fn has_coupon(&self) -> bool {
        self.coupon_code.as_deref().is_some_and(|c| !c.is_empty())
    }

    /// Find the line for a given service.
    #[must_use]
    pub fn item_for_service(&self, service_id: ServiceId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.service_id == service_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CART_JSON: &str = r#"{
        "id": 12,
        "items": [
            {"id": 1, "serviceId": 4, "serviceName": "AC Service", "quantity": 2,
             "unitPrice": "499.00", "totalPrice": "998.00"},
            {"id": 2, "serviceId": 9, "serviceName": "Tap Repair", "quantity": 1,
             "unitPrice": 149, "totalPrice": 149}
        ],
        "subtotal": "1147.00",
        "discountAmount": "100.00",
        "finalAmount": "1047.00",
        "couponCode": "FIRST100"
    }"#;

    #[test]
    fn test_deserialize_cart() {
        let cart: Cart = serde_json::from_str(CART_JSON).unwrap();
        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.final_amount, Decimal::new(1047, 0));
        assert!(cart.has_coupon());
    }

    #[test]
    fn test_total_quantity_sums_items() {
        let cart: Cart = serde_json::from_str(CART_JSON).unwrap();
        assert_eq!(cart.total_quantity(), 3);
    }

    #[test]
    fn test_empty_cart_defaults() {
        let cart: Cart = serde_json::from_str("{}").unwrap();
        assert_eq!(cart, Cart::empty());
        assert!(cart.is_empty());
        assert_eq!(cart.total_quantity(), 0);
        assert!(!cart.has_coupon());
    }

    #[test]
    fn test_item_for_service() {
        let cart: Cart = serde_json::from_str(CART_JSON).unwrap();
        assert_eq!(
            cart.item_for_service(ServiceId::new(9)).map(|i| i.quantity),
            Some(1)
        );
        assert!(cart.item_for_service(ServiceId::new(99)).is_none());
    }
}
