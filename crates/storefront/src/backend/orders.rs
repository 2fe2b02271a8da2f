//! Bookings: placing, listing and cancelling orders.

use handyhub_core::{BookingRequest, Order, OrderId};
use reqwest::Method;
use tracing::instrument;

use super::{BackendClient, BackendError, CookieJar};

impl BackendClient {
    /// Turn the session's cart into an order.
    ///
    /// The backend prices the order from the cart (including any coupon) and
    /// empties the cart on success.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for guests and `Api` when the backend rejects
    /// the booking (empty cart, unavailable slot).
    #[instrument(skip(self, jar, booking), fields(address_id = %booking.address_id))]
    pub async fn create_order(
        &self,
        jar: &mut CookieJar,
        booking: &BookingRequest,
    ) -> Result<Order, BackendError> {
        let order = self
            .send_json::<_, Order>(Method::POST, "api/orders", booking, Some(jar))
            .await?
            .ok_or(BackendError::MissingData("order"))?;
        tracing::info!(order_id = %order.id, order_number = %order.order_number, "Order placed");
        Ok(order)
    }

    /// List the customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, jar))]
    pub async fn list_orders(&self, jar: &mut CookieJar) -> Result<Vec<Order>, BackendError> {
        let mut orders: Vec<Order> = self.get("api/orders", Some(jar), "orders").await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Get one of the customer's orders.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the order does not exist or belongs to someone else.
    #[instrument(skip(self, jar))]
    pub async fn get_order(&self, jar: &mut CookieJar, id: OrderId) -> Result<Order, BackendError> {
        let path = format!("api/orders/{id}");
        self.get(&path, Some(jar), "order").await
    }

    /// Cancel an order.
    ///
    /// # Errors
    ///
    /// Returns `Api` when the order can no longer be cancelled.
    #[instrument(skip(self, jar))]
    pub async fn cancel_order(
        &self,
        jar: &mut CookieJar,
        id: OrderId,
    ) -> Result<Order, BackendError> {
        let path = format!("api/orders/{id}/cancel");
        let order = self
            .send_empty::<Order>(Method::PUT, &path, Some(jar))
            .await?;
        match order {
            Some(order) => Ok(order),
            None => self.get_order(jar, id).await,
        }
    }
}
