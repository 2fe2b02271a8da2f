//! Offer plans.

use std::sync::Arc;

use handyhub_core::{OfferPlan, OfferPlanId};
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::{BackendClient, BackendError};

impl BackendClient {
    /// List offer plans, popular plans first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_offer_plans(&self) -> Result<Arc<Vec<OfferPlan>>, BackendError> {
        if let Some(CacheValue::OfferPlans(plans)) =
            self.inner.cache.get(&CacheKey::OfferPlans).await
        {
            debug!("Cache hit for offer plans");
            return Ok(plans);
        }

        let mut plans: Vec<OfferPlan> = self.get("api/offers", None, "offer plans").await?;
        plans.sort_by_key(|p| !p.is_popular);

        let plans = Arc::new(plans);
        self.inner
            .cache
            .insert(CacheKey::OfferPlans, CacheValue::OfferPlans(Arc::clone(&plans)))
            .await;
        Ok(plans)
    }

    /// Get a single offer plan.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown plans.
    #[instrument(skip(self))]
    pub async fn get_offer_plan(&self, id: OfferPlanId) -> Result<OfferPlan, BackendError> {
        let path = format!("api/offers/{id}");
        self.get(&path, None, "offer plan").await
    }
}
