//! Contact settings and the contact form.

use std::sync::Arc;

use handyhub_core::{ContactMessage, ContactSettings};
use reqwest::Method;
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::{BackendClient, BackendError};

impl BackendClient {
    /// Site contact details (cached).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn contact_settings(&self) -> Result<Arc<ContactSettings>, BackendError> {
        if let Some(CacheValue::ContactSettings(settings)) =
            self.inner.cache.get(&CacheKey::ContactSettings).await
        {
            debug!("Cache hit for contact settings");
            return Ok(settings);
        }

        let settings = self
            .send_empty::<ContactSettings>(Method::GET, "api/settings/contact", None)
            .await?
            .unwrap_or_default();

        let settings = Arc::new(settings);
        self.inner
            .cache
            .insert(
                CacheKey::ContactSettings,
                CacheValue::ContactSettings(Arc::clone(&settings)),
            )
            .await;
        Ok(settings)
    }

    /// Forget cached contact settings.
    pub async fn invalidate_contact_settings(&self) {
        self.inner.cache.invalidate(&CacheKey::ContactSettings).await;
    }

    /// Submit the contact form.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, message), fields(email = %message.email))]
    pub async fn send_contact_message(&self, message: &ContactMessage) -> Result<(), BackendError> {
        self.send_json::<_, serde_json::Value>(Method::POST, "api/contact", message, None)
            .await?;
        Ok(())
    }
}
