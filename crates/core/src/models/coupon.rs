//! Coupons and the backend's validation verdict.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CouponId, CurrencyCode, DiscountType, format_amount};

/// A coupon as listed by the backend.
///
/// Whether a coupon actually applies, and for how much, is decided by the
/// backend. The helpers here only drive what the coupon list shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    #[serde(default)]
    pub min_order_amount: Option<Decimal>,
    #[serde(default)]
    pub max_discount: Option<Decimal>,
    #[serde(default)]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl Coupon {
    /// Active and inside its validity window at `now`.
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.valid_from.is_none_or(|from| from <= now)
            && self.valid_until.is_none_or(|until| now <= until)
    }

    /// Whether `subtotal` reaches the coupon's minimum order amount.
    #[must_use]
    pub fn meets_minimum(&self, subtotal: Decimal) -> bool {
        self.min_order_amount.is_none_or(|min| subtotal >= min)
    }

    /// Short label such as `20% off` or `₹100.00 off`.
    #[must_use]
    pub fn label(&self, currency: CurrencyCode) -> String {
        match self.discount_type {
            DiscountType::Percentage => {
                format!("{}% off", self.discount_value.normalize())
            }
            DiscountType::Fixed => format!("{} off", format_amount(self.discount_value, currency)),
        }
    }
}

/// Result of `POST /api/coupons/validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponValidation {
    pub valid: bool,
    #[serde(default)]
    pub discount_amount: Decimal,
    #[serde(default)]
    pub final_amount: Option<Decimal>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn coupon() -> Coupon {
        Coupon {
            id: CouponId::new(1),
            code: "CLEAN20".to_string(),
            description: None,
            discount_type: DiscountType::Percentage,
            discount_value: Decimal::new(2000, 2),
            min_order_amount: Some(Decimal::new(500, 0)),
            max_discount: None,
            valid_from: Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()),
            valid_until: Some(Utc.with_ymd_and_hms(2026, 12, 31, 23, 59, 59).unwrap()),
            is_active: true,
        }
    }

    #[test]
    fn test_is_live_window() {
        let c = coupon();
        assert!(c.is_live(Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()));
        assert!(!c.is_live(Utc.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).unwrap()));
        assert!(!c.is_live(Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_inactive_coupon_is_never_live() {
        let mut c = coupon();
        c.is_active = false;
        assert!(!c.is_live(Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_open_ended_window() {
        let mut c = coupon();
        c.valid_from = None;
        c.valid_until = None;
        assert!(c.is_live(Utc::now()));
    }

    #[test]
    fn test_meets_minimum() {
        let c = coupon();
        assert!(c.meets_minimum(Decimal::new(500, 0)));
        assert!(!c.meets_minimum(Decimal::new(499, 0)));
    }

    #[test]
    fn test_labels() {
        let mut c = coupon();
        assert_eq!(c.label(CurrencyCode::INR), "20% off");
        c.discount_type = DiscountType::Fixed;
        c.discount_value = Decimal::new(100, 0);
        assert_eq!(c.label(CurrencyCode::INR), "₹100.00 off");
    }

    #[test]
    fn test_deserialize_validation() {
        let v: CouponValidation = serde_json::from_str(
            r#"{"valid":false,"message":"Minimum order is 500"}"#,
        )
        .unwrap();
        assert!(!v.valid);
        assert_eq!(v.discount_amount, Decimal::ZERO);
        assert_eq!(v.message.as_deref(), Some("Minimum order is 500"));
    }
}
