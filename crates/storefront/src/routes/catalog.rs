//! Catalog pages: categories, service detail and search.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use handyhub_core::{ServiceFilter, filter_by_category, search_services};
use serde::Deserialize;
use tracing::instrument;

use super::views::{CategoryCard, PageContext, ServiceCard};
use crate::backend::BackendError;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::BackendSession;
use crate::state::AppState;

/// Subcategory tab on a category page.
#[derive(Clone, Debug)]
pub struct SubcategoryTab {
    pub slug: String,
    pub name: String,
    pub active: bool,
}

/// Category detail query parameters.
#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    /// Subcategory slug to narrow the service list.
    pub sub: Option<String>,
}

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Category listing template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesTemplate {
    pub page: PageContext,
    pub categories: Vec<CategoryCard>,
}

/// Category detail template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/show.html")]
pub struct CategoryTemplate {
    pub page: PageContext,
    pub category: CategoryCard,
    pub subcategories: Vec<SubcategoryTab>,
    pub all_active: bool,
    pub services: Vec<ServiceCard>,
}

/// Service detail template.
#[derive(Template, WebTemplate)]
#[template(path = "services/show.html")]
pub struct ServiceTemplate {
    pub page: PageContext,
    pub service: ServiceCard,
    pub category: Option<CategoryCard>,
    pub in_cart: u32,
    pub related: Vec<ServiceCard>,
}

/// Search results template.
#[derive(Template, WebTemplate)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub page: PageContext,
    pub query: String,
    pub results: Vec<ServiceCard>,
}

/// Related services shown under a service.
const RELATED_SERVICE_COUNT: usize = 4;

/// Map a backend 404 to a page 404 naming what was missing.
fn not_found(what: &str, slug: &str) -> impl FnOnce(BackendError) -> AppError {
    let label = format!("{what} '{slug}'");
    move |err| match err {
        BackendError::NotFound(_) => AppError::NotFound(label),
        other => AppError::Backend(other),
    }
}

/// Display every active category.
#[instrument(skip(state, page))]
pub async fn index(State(state): State<AppState>, page: PageContext) -> impl IntoResponse {
    let categories = match state.backend().list_categories().await {
        Ok(categories) => categories.iter().map(CategoryCard::from).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load categories");
            Vec::new()
        }
    };

    CategoriesTemplate { page, categories }
}

/// Display a category with its subcategory tabs and services.
///
/// Services are fetched for the whole category once (cached) and narrowed by
/// `?sub=` locally.
#[instrument(skip(state, page))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<CategoryQuery>,
    page: PageContext,
) -> Result<impl IntoResponse> {
    let backend = state.backend();
    let category = backend
        .get_category(&slug)
        .await
        .map_err(not_found("Category", &slug))?;

    let (subcategories, services) = tokio::join!(
        backend.list_subcategories(category.id),
        backend.list_services(ServiceFilter::category(category.id)),
    );

    let subcategories = subcategories.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load subcategories");
        std::sync::Arc::default()
    });
    let services = services.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load category services");
        std::sync::Arc::default()
    });

    let selected = query
        .sub
        .as_deref()
        .and_then(|sub| subcategories.iter().find(|s| s.slug == sub));

    let currency = state.currency();
    let services = filter_by_category(&services, category.id, selected.map(|s| s.id))
        .into_iter()
        .map(|s| ServiceCard::new(s, currency))
        .collect();

    let subcategories = subcategories
        .iter()
        .map(|s| SubcategoryTab {
            slug: s.slug.clone(),
            name: s.name.clone(),
            active: selected.is_some_and(|sel| sel.id == s.id),
        })
        .collect();

    Ok(CategoryTemplate {
        page,
        category: CategoryCard::from(category.as_ref()),
        subcategories,
        all_active: selected.is_none(),
        services,
    })
}

/// Display a service with an add-to-cart form.
#[instrument(skip(state, page, backend_session))]
pub async fn service(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    page: PageContext,
    mut backend_session: BackendSession,
) -> Result<impl IntoResponse> {
    let backend = state.backend();
    let service = backend
        .get_service(&slug)
        .await
        .map_err(not_found("Service", &slug))?;

    let (categories, siblings, cart) = tokio::join!(
        backend.list_categories(),
        backend.list_services(ServiceFilter::category(service.category_id)),
        backend.get_cart(backend_session.jar()),
    );
    let cart = backend_session.settle(cart).await;

    let currency = state.currency();
    let category = categories
        .ok()
        .and_then(|cats| cats.iter().find(|c| c.id == service.category_id).map(CategoryCard::from));

    let related = siblings
        .map(|siblings| {
            siblings
                .iter()
                .filter(|s| s.id != service.id)
                .take(RELATED_SERVICE_COUNT)
                .map(|s| ServiceCard::new(s, currency))
                .collect()
        })
        .unwrap_or_default();

    let in_cart = cart
        .ok()
        .and_then(|cart| cart.item_for_service(service.id).map(|item| item.quantity))
        .unwrap_or(0);

    Ok(ServiceTemplate {
        page,
        service: ServiceCard::new(&service, currency),
        category,
        in_cart,
        related,
    })
}

/// Substring search over every active service.
#[instrument(skip(state, page))]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
    page: PageContext,
) -> impl IntoResponse {
    let q = query.q.trim().to_string();
    let currency = state.currency();

    let results = if q.is_empty() {
        Vec::new()
    } else {
        match state.backend().list_services(ServiceFilter::default()).await {
            Ok(services) => search_services(&services, &q)
                .into_iter()
                .map(|s| ServiceCard::new(s, currency))
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load services for search");
                Vec::new()
            }
        }
    };

    SearchTemplate {
        page,
        query: q,
        results,
    }
}
