//! Coupon listing, validation and application.
//!
//! Discounts are computed by the backend only. `validate_coupon` is a dry run;
//! `apply_coupon` attaches the code to the cart and returns the repriced cart.

use chrono::Utc;
use handyhub_core::{Cart, Coupon, CouponValidation};
use reqwest::Method;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use super::{BackendClient, BackendError, CookieJar};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateCouponBody<'a> {
    code: &'a str,
    cart_total: Decimal,
}

#[derive(Debug, Serialize)]
struct ApplyCouponBody<'a> {
    code: &'a str,
}

/// Coupon codes are case-insensitive on the backend; send them upper-case.
fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl BackendClient {
    /// List coupons that are live right now.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_coupons(&self) -> Result<Vec<Coupon>, BackendError> {
        let mut coupons: Vec<Coupon> = self.get("api/coupons", None, "coupons").await?;
        let now = Utc::now();
        coupons.retain(|c| c.is_live(now));
        Ok(coupons)
    }

    /// Ask the backend whether a code would apply to a cart total.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails. An inapplicable coupon is
    /// not an error: it comes back with `valid: false` and a message.
    #[instrument(skip(self, jar))]
    pub async fn validate_coupon(
        &self,
        jar: &mut CookieJar,
        code: &str,
        cart_total: Decimal,
    ) -> Result<CouponValidation, BackendError> {
        let code = normalize_code(code);
        let body = ValidateCouponBody {
            code: &code,
            cart_total,
        };
        match self
            .send_json::<_, CouponValidation>(Method::POST, "api/coupons/validate", &body, Some(jar))
            .await
        {
            Ok(Some(validation)) => Ok(validation),
            Ok(None) => Err(BackendError::MissingData("coupon validation")),
            Err(err) if err.is_user_facing() => Ok(CouponValidation {
                valid: false,
                discount_amount: Decimal::ZERO,
                final_amount: None,
                message: Some(err.user_message()),
            }),
            Err(err) => Err(err),
        }
    }

    /// Attach a coupon to the cart.
    ///
    /// # Errors
    ///
    /// Returns `Api` with the backend's reason when the coupon does not apply.
    #[instrument(skip(self, jar))]
    pub async fn apply_coupon(&self, jar: &mut CookieJar, code: &str) -> Result<Cart, BackendError> {
        let code = normalize_code(code);
        if code.is_empty() {
            return Err(BackendError::Api {
                status: 400,
                message: "Please enter a coupon code".to_string(),
            });
        }
        self.send_json::<_, Cart>(
            Method::POST,
            "api/cart/coupon",
            &ApplyCouponBody { code: &code },
            Some(jar),
        )
        .await?
        .ok_or(BackendError::MissingData("cart"))
    }

    /// Detach the coupon from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, jar))]
    pub async fn remove_coupon(&self, jar: &mut CookieJar) -> Result<Cart, BackendError> {
        let cart = self
            .send_empty::<Cart>(Method::DELETE, "api/cart/coupon", Some(jar))
            .await?;
        match cart {
            Some(cart) => Ok(cart),
            None => self.get_cart(jar).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  first100 "), "FIRST100");
        assert_eq!(normalize_code(""), "");
    }
}
