//! Admin data-access layer.
//!
//! Thin wrappers over the backend's `/api/admin/*` endpoints, authenticated
//! with an admin's session cookie. Writes that change what customers see
//! invalidate the matching cache entries.

use handyhub_core::{
    AdminStats, Category, CategoryId, CategoryInput, ContactSettings, Coupon, CouponId,
    CouponInput, Order, OrderId, OrderStatus, Service, ServiceId, ServiceInput,
};
use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use super::{BackendClient, BackendError, CookieJar};

#[derive(Debug, Serialize)]
struct StatusBody {
    status: OrderStatus,
}

impl BackendClient {
    /// Dashboard totals.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admin sessions.
    #[instrument(skip(self, jar))]
    pub async fn admin_stats(&self, jar: &mut CookieJar) -> Result<AdminStats, BackendError> {
        self.get("api/admin/stats", Some(jar), "stats").await
    }

    /// Every order, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admin sessions.
    #[instrument(skip(self, jar))]
    pub async fn admin_list_orders(
        &self,
        jar: &mut CookieJar,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, BackendError> {
        let query: Vec<(&str, String)> = status
            .map(|s| ("status", s.as_str().to_string()))
            .into_iter()
            .collect();
        self.get_with_query("api/admin/orders", &query, Some(jar), "orders")
            .await
    }

    /// Move an order to a new status.
    ///
    /// # Errors
    ///
    /// Returns `Api` when the backend rejects the transition.
    #[instrument(skip(self, jar))]
    pub async fn admin_update_order_status(
        &self,
        jar: &mut CookieJar,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, BackendError> {
        let path = format!("api/admin/orders/{id}/status");
        self.send_json::<_, Order>(Method::PUT, &path, &StatusBody { status }, Some(jar))
            .await?
            .ok_or(BackendError::MissingData("order"))
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, jar, input), fields(slug = %input.slug))]
    pub async fn admin_create_category(
        &self,
        jar: &mut CookieJar,
        input: &CategoryInput,
    ) -> Result<Category, BackendError> {
        let category = self
            .send_json::<_, Category>(Method::POST, "api/admin/categories", input, Some(jar))
            .await?
            .ok_or(BackendError::MissingData("category"))?;
        self.invalidate_catalog();
        Ok(category)
    }

    /// Update a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, jar, input), fields(slug = %input.slug))]
    pub async fn admin_update_category(
        &self,
        jar: &mut CookieJar,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, BackendError> {
        let path = format!("api/admin/categories/{id}");
        let category = self
            .send_json::<_, Category>(Method::PUT, &path, input, Some(jar))
            .await?
            .ok_or(BackendError::MissingData("category"))?;
        self.invalidate_catalog();
        Ok(category)
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, jar))]
    pub async fn admin_delete_category(
        &self,
        jar: &mut CookieJar,
        id: CategoryId,
    ) -> Result<(), BackendError> {
        let path = format!("api/admin/categories/{id}");
        self.send_empty::<serde_json::Value>(Method::DELETE, &path, Some(jar))
            .await?;
        self.invalidate_catalog();
        Ok(())
    }

    /// Create a service.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, jar, input), fields(slug = %input.slug))]
    pub async fn admin_create_service(
        &self,
        jar: &mut CookieJar,
        input: &ServiceInput,
    ) -> Result<Service, BackendError> {
        let service = self
            .send_json::<_, Service>(Method::POST, "api/admin/services", input, Some(jar))
            .await?
            .ok_or(BackendError::MissingData("service"))?;
        self.invalidate_catalog();
        Ok(service)
    }

    /// Update a service.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, jar, input), fields(slug = %input.slug))]
    pub async fn admin_update_service(
        &self,
        jar: &mut CookieJar,
        id: ServiceId,
        input: &ServiceInput,
    ) -> Result<Service, BackendError> {
        let path = format!("api/admin/services/{id}");
        let service = self
            .send_json::<_, Service>(Method::PUT, &path, input, Some(jar))
            .await?
            .ok_or(BackendError::MissingData("service"))?;
        self.invalidate_catalog();
        Ok(service)
    }

    /// Delete a service.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, jar))]
    pub async fn admin_delete_service(
        &self,
        jar: &mut CookieJar,
        id: ServiceId,
    ) -> Result<(), BackendError> {
        let path = format!("api/admin/services/{id}");
        self.send_empty::<serde_json::Value>(Method::DELETE, &path, Some(jar))
            .await?;
        self.invalidate_catalog();
        Ok(())
    }

    /// Create a coupon.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, jar, input))]
    pub async fn admin_create_coupon(
        &self,
        jar: &mut CookieJar,
        input: &CouponInput,
    ) -> Result<Coupon, BackendError> {
        let input = CouponInput {
            code: input.normalized_code(),
            ..input.clone()
        };
        self.send_json::<_, Coupon>(Method::POST, "api/admin/coupons", &input, Some(jar))
            .await?
            .ok_or(BackendError::MissingData("coupon"))
    }

    /// Delete a coupon.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, jar))]
    pub async fn admin_delete_coupon(
        &self,
        jar: &mut CookieJar,
        id: CouponId,
    ) -> Result<(), BackendError> {
        let path = format!("api/admin/coupons/{id}");
        self.send_empty::<serde_json::Value>(Method::DELETE, &path, Some(jar))
            .await?;
        Ok(())
    }

    /// Replace the site contact settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, jar, settings))]
    pub async fn admin_update_contact_settings(
        &self,
        jar: &mut CookieJar,
        settings: &ContactSettings,
    ) -> Result<ContactSettings, BackendError> {
        let updated = self
            .send_json::<_, ContactSettings>(
                Method::PUT,
                "api/admin/settings/contact",
                settings,
                Some(jar),
            )
            .await?
            .unwrap_or_else(|| settings.clone());
        self.invalidate_contact_settings().await;
        Ok(updated)
    }
}
