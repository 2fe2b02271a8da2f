//! The customer's address book.

use handyhub_core::{AddressId, AddressInput, UserAddress};
use reqwest::Method;
use tracing::instrument;

use super::{BackendClient, BackendError, CookieJar};

impl BackendClient {
    /// List saved addresses with the default first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, jar))]
    pub async fn list_addresses(
        &self,
        jar: &mut CookieJar,
    ) -> Result<Vec<UserAddress>, BackendError> {
        let mut addresses: Vec<UserAddress> =
            self.get("api/addresses", Some(jar), "addresses").await?;
        addresses.sort_by_key(|a| !a.is_default);
        Ok(addresses)
    }

    /// Save a new address.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, jar, input))]
    pub async fn create_address(
        &self,
        jar: &mut CookieJar,
        input: &AddressInput,
    ) -> Result<UserAddress, BackendError> {
        self.send_json::<_, UserAddress>(Method::POST, "api/addresses", input, Some(jar))
            .await?
            .ok_or(BackendError::MissingData("address"))
    }

    /// Replace an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, jar, input))]
    pub async fn update_address(
        &self,
        jar: &mut CookieJar,
        id: AddressId,
        input: &AddressInput,
    ) -> Result<UserAddress, BackendError> {
        let path = format!("api/addresses/{id}");
        self.send_json::<_, UserAddress>(Method::PUT, &path, input, Some(jar))
            .await?
            .ok_or(BackendError::MissingData("address"))
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, jar))]
    pub async fn delete_address(&self, jar: &mut CookieJar, id: AddressId) -> Result<(), BackendError> {
        let path = format!("api/addresses/{id}");
        self.send_empty::<serde_json::Value>(Method::DELETE, &path, Some(jar))
            .await?;
        Ok(())
    }

    /// Make an address the default for bookings.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, jar))]
    pub async fn set_default_address(
        &self,
        jar: &mut CookieJar,
        id: AddressId,
    ) -> Result<(), BackendError> {
        let path = format!("api/addresses/{id}/default");
        self.send_empty::<serde_json::Value>(Method::PUT, &path, Some(jar))
            .await?;
        Ok(())
    }
}
