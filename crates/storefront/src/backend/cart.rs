//! Cart operations. The cart lives on the backend, keyed by the session cookie.

use handyhub_core::{Cart, CartItemId, ServiceId};
use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use super::{BackendClient, BackendError, CookieJar};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddToCartBody {
    service_id: ServiceId,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct UpdateQuantityBody {
    quantity: u32,
}

impl BackendClient {
    /// Fetch the visitor's cart. A visitor without a cart gets an empty one.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, jar))]
    pub async fn get_cart(&self, jar: &mut CookieJar) -> Result<Cart, BackendError> {
        let cart = self
            .send_empty::<Cart>(Method::GET, "api/cart", Some(jar))
            .await?;
        Ok(cart.unwrap_or_default())
    }

    /// Add a service to the cart; the backend merges quantities for a
    /// service already present.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, jar))]
    pub async fn add_to_cart(
        &self,
        jar: &mut CookieJar,
        service_id: ServiceId,
        quantity: u32,
    ) -> Result<Cart, BackendError> {
        let body = AddToCartBody {
            service_id,
            quantity: quantity.max(1),
        };
        self.send_json::<_, Cart>(Method::POST, "api/cart", &body, Some(jar))
            .await?
            .ok_or(BackendError::MissingData("cart"))
    }

    /// Set the quantity of a cart line. Zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, jar))]
    pub async fn update_cart_item(
        &self,
        jar: &mut CookieJar,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<Cart, BackendError> {
        if quantity == 0 {
            return self.remove_cart_item(jar, item_id).await;
        }
        let path = format!("api/cart/{item_id}");
        self.send_json::<_, Cart>(Method::PUT, &path, &UpdateQuantityBody { quantity }, Some(jar))
            .await?
            .ok_or(BackendError::MissingData("cart"))
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, jar))]
    pub async fn remove_cart_item(
        &self,
        jar: &mut CookieJar,
        item_id: CartItemId,
    ) -> Result<Cart, BackendError> {
        let path = format!("api/cart/{item_id}");
        let cart = self
            .send_empty::<Cart>(Method::DELETE, &path, Some(jar))
            .await?;
        match cart {
            Some(cart) => Ok(cart),
            None => self.get_cart(jar).await,
        }
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, jar))]
    pub async fn clear_cart(&self, jar: &mut CookieJar) -> Result<(), BackendError> {
        self.send_empty::<serde_json::Value>(Method::DELETE, "api/cart", Some(jar))
            .await?;
        Ok(())
    }
}
