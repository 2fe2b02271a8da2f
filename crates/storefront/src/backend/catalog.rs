//! Catalog reads: categories, subcategories and services.
//!
//! Public, cookie-less and cached. Inactive rows are filtered out here so no
//! page ever lists something that cannot be booked.

use std::sync::Arc;

use handyhub_core::{Category, CategoryId, Service, ServiceFilter, Subcategory};
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::{BackendClient, BackendError};

impl BackendClient {
    /// List active categories ordered by `sort_order`, then name.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Arc<Vec<Category>>, BackendError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let mut categories: Vec<Category> = self.get("api/categories", None, "categories").await?;
        categories.retain(|c| c.is_active);
        categories.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.name.cmp(&b.name))
        });

        let categories = Arc::new(categories);
        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(Arc::clone(&categories)),
            )
            .await;
        Ok(categories)
    }

    /// Get a category by its slug.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown or inactive categories.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_category(&self, slug: &str) -> Result<Arc<Category>, BackendError> {
        let key = CacheKey::Category(slug.to_string());
        if let Some(CacheValue::Category(category)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for category");
            return Ok(category);
        }

        let path = format!("api/categories/{}", urlencoding::encode(slug));
        let category: Category = self.get(&path, None, "category").await?;
        if !category.is_active {
            return Err(BackendError::NotFound(format!("category {slug}")));
        }

        let category = Arc::new(category);
        self.inner
            .cache
            .insert(key, CacheValue::Category(Arc::clone(&category)))
            .await;
        Ok(category)
    }

    /// List the subcategories of a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_subcategories(
        &self,
        category_id: CategoryId,
    ) -> Result<Arc<Vec<Subcategory>>, BackendError> {
        let key = CacheKey::Subcategories(category_id);
        if let Some(CacheValue::Subcategories(subcategories)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for subcategories");
            return Ok(subcategories);
        }

        let path = format!("api/categories/{category_id}/subcategories");
        let subcategories: Vec<Subcategory> = self.get(&path, None, "subcategories").await?;

        let subcategories = Arc::new(subcategories);
        self.inner
            .cache
            .insert(key, CacheValue::Subcategories(Arc::clone(&subcategories)))
            .await;
        Ok(subcategories)
    }

    /// List active services, optionally narrowed to a category/subcategory.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_services(
        &self,
        filter: ServiceFilter,
    ) -> Result<Arc<Vec<Service>>, BackendError> {
        let key = CacheKey::Services(filter);
        if let Some(CacheValue::Services(services)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for services");
            return Ok(services);
        }

        let mut query = Vec::new();
        if let Some(category_id) = filter.category_id {
            query.push(("categoryId", category_id.to_string()));
        }
        if let Some(subcategory_id) = filter.subcategory_id {
            query.push(("subcategoryId", subcategory_id.to_string()));
        }

        let mut services: Vec<Service> = self
            .get_with_query("api/services", &query, None, "services")
            .await?;
        services.retain(|s| s.is_active);

        let services = Arc::new(services);
        self.inner
            .cache
            .insert(key, CacheValue::Services(Arc::clone(&services)))
            .await;
        Ok(services)
    }

    /// Get a service by its slug.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown or inactive services.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_service(&self, slug: &str) -> Result<Arc<Service>, BackendError> {
        let key = CacheKey::Service(slug.to_string());
        if let Some(CacheValue::Service(service)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for service");
            return Ok(service);
        }

        let path = format!("api/services/{}", urlencoding::encode(slug));
        let service: Service = self.get(&path, None, "service").await?;
        if !service.is_active {
            return Err(BackendError::NotFound(format!("service {slug}")));
        }

        let service = Arc::new(service);
        self.inner
            .cache
            .insert(key, CacheValue::Service(Arc::clone(&service)))
            .await;
        Ok(service)
    }

    /// Drop every cached catalog entry.
    ///
    /// Called after admin writes so the next page view sees them.
    pub fn invalidate_catalog(&self) {
        if let Err(e) = self
            .inner
            .cache
            .invalidate_entries_if(|key, _| key.is_catalog())
        {
            tracing::warn!(error = %e, "Falling back to clearing the whole backend cache");
            self.inner.cache.invalidate_all();
        }
    }
}
