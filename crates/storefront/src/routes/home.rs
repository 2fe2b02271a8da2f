//! Home page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use handyhub_core::{Service, ServiceFilter};
use tracing::instrument;

use super::views::{CategoryCard, OfferView, PageContext, ServiceCard};
use crate::filters;
use crate::state::AppState;

/// Services shown in the "popular" strip.
const POPULAR_SERVICE_COUNT: usize = 8;

/// Offer plans teased on the home page.
const FEATURED_OFFER_COUNT: usize = 3;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub categories: Vec<CategoryCard>,
    pub popular: Vec<ServiceCard>,
    pub offers: Vec<OfferView>,
}

/// Display the home page.
///
/// Each section degrades to empty on its own when its backend call fails.
#[instrument(skip(state, page))]
pub async fn home(State(state): State<AppState>, page: PageContext) -> impl IntoResponse {
    let backend = state.backend();
    let currency = state.currency();

    let (categories, services, offers) = tokio::join!(
        backend.list_categories(),
        backend.list_services(ServiceFilter::default()),
        backend.list_offer_plans(),
    );

    let categories = categories
        .map(|categories| categories.iter().map(CategoryCard::from).collect())
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load categories for home page");
            Vec::new()
        });

    let popular = services
        .map(|services| {
            popular_services(&services)
                .into_iter()
                .map(|s| ServiceCard::new(s, currency))
                .collect()
        })
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load services for home page");
            Vec::new()
        });

    let offers = offers
        .map(|plans| {
            plans
                .iter()
                .take(FEATURED_OFFER_COUNT)
                .map(|p| OfferView::new(p, currency))
                .collect()
        })
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load offers for home page");
            Vec::new()
        });

    HomeTemplate {
        page,
        categories,
        popular,
        offers,
    }
}

/// Best-rated services first, then most reviewed.
fn popular_services(services: &[Service]) -> Vec<&Service> {
    let mut ranked: Vec<&Service> = services.iter().collect();
    ranked.sort_by(|a, b| {
        b.rating
            .unwrap_or(0.0)
            .total_cmp(&a.rating.unwrap_or(0.0))
            .then_with(|| b.review_count.cmp(&a.review_count))
    });
    ranked.truncate(POPULAR_SERVICE_COUNT);
    ranked
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service(id: i32, rating: Option<f64>, reviews: u32) -> Service {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "categoryId": 1,
            "name": format!("Service {id}"),
            "slug": format!("service-{id}"),
            "price": "499",
            "rating": rating,
            "reviewCount": reviews,
        }))
        .unwrap()
    }

    #[test]
    fn test_popular_services_order() {
        let services = vec![
            service(1, Some(4.2), 10),
            service(2, None, 500),
            service(3, Some(4.8), 3),
            service(4, Some(4.8), 90),
        ];
        let ids: Vec<i32> = popular_services(&services)
            .iter()
            .map(|s| s.id.as_i32())
            .collect();
        assert_eq!(ids, vec![4, 3, 1, 2]);
    }

    #[test]
    fn test_popular_services_truncates() {
        let services: Vec<Service> = (1..=12).map(|i| service(i, Some(4.0), 1)).collect();
        assert_eq!(popular_services(&services).len(), POPULAR_SERVICE_COUNT);
    }
}
