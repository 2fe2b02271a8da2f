//! Catalog records: categories, subcategories and bookable services.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, ServiceId, SubcategoryId};

const fn default_true() -> bool {
    true
}

/// A top-level service category (e.g. "Cleaning", "Electrician").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

/// A grouping of services inside a category (e.g. "Deep cleaning").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub category_id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A bookable service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: ServiceId,
    pub category_id: CategoryId,
    #[serde(default)]
    pub subcategory_id: Option<SubcategoryId>,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub discounted_price: Option<Decimal>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Service {
    /// The price a customer pays before coupons.
    ///
    /// A discounted price is only honoured when it is actually lower.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        match self.discounted_price {
            Some(discounted) if discounted < self.price => discounted,
            _ => self.price,
        }
    }

    /// Whole-number percentage saved by the discounted price.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u32> {
        let effective = self.effective_price();
        if self.price <= Decimal::ZERO || effective >= self.price {
            return None;
        }
        let percent = ((self.price - effective) * Decimal::ONE_HUNDRED / self.price).floor();
        percent.to_u32().filter(|p| *p > 0)
    }
}

/// Query filter for the services endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory_id: Option<SubcategoryId>,
}

impl ServiceFilter {
    /// Every service in a category.
    #[must_use]
    pub const fn category(category_id: CategoryId) -> Self {
        Self {
            category_id: Some(category_id),
            subcategory_id: None,
        }
    }
}

/// Case-insensitive substring search over name, description and slug.
///
/// A blank query matches everything. Input order is preserved.
#[must_use]
pub fn search_services<'a>(services: &'a [Service], query: &str) -> Vec<&'a Service> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return services.iter().collect();
    }

    services
        .iter()
        .filter(|service| {
            service.name.to_lowercase().contains(&needle)
                || service.slug.to_lowercase().contains(&needle)
                || service
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Services belonging to a category and, optionally, one of its subcategories.
#[must_use]
pub fn filter_by_category(
    services: &[Service],
    category_id: CategoryId,
    subcategory_id: Option<SubcategoryId>,
) -> Vec<&Service> {
    services
        .iter()
        .filter(|s| s.category_id == category_id)
        .filter(|s| subcategory_id.is_none_or(|sub| s.subcategory_id == Some(sub)))
        .collect()
}
