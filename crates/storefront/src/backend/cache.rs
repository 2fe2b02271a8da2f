//! Cache types for catalog and settings responses.

use std::sync::Arc;

use handyhub_core::{Category, ContactSettings, OfferPlan, Service, ServiceFilter, Subcategory, CategoryId};

/// Cache key for read-mostly public data.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categories,
    Category(String),
    Subcategories(CategoryId),
    Services(ServiceFilter),
    Service(String),
    OfferPlans,
    ContactSettings,
}

impl CacheKey {
    /// Whether the entry belongs to the catalog (categories and services).
    pub const fn is_catalog(&self) -> bool {
        matches!(
            self,
            Self::Categories
                | Self::Category(_)
                | Self::Subcategories(_)
                | Self::Services(_)
                | Self::Service(_)
        )
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Arc<Vec<Category>>),
    Category(Arc<Category>),
    Subcategories(Arc<Vec<Subcategory>>),
    Services(Arc<Vec<Service>>),
    Service(Arc<Service>),
    OfferPlans(Arc<Vec<OfferPlan>>),
    ContactSettings(Arc<ContactSettings>),
}
