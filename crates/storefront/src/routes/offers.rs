//! Offer plans (service bundles and memberships).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use handyhub_core::OfferPlanId;
use tracing::instrument;

use super::views::{OfferView, PageContext};
use crate::backend::BackendError;
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Offer plans template.
#[derive(Template, WebTemplate)]
#[template(path = "offers/index.html")]
pub struct OffersTemplate {
    pub page: PageContext,
    pub offers: Vec<OfferView>,
}

/// Single offer plan template.
#[derive(Template, WebTemplate)]
#[template(path = "offers/show.html")]
pub struct OfferTemplate {
    pub page: PageContext,
    pub offer: OfferView,
}

/// Display every active offer plan, popular plans first.
#[instrument(skip(state, page))]
pub async fn index(State(state): State<AppState>, page: PageContext) -> impl IntoResponse {
    let currency = state.currency();
    let mut offers: Vec<OfferView> = match state.backend().list_offer_plans().await {
        Ok(plans) => plans.iter().map(|p| OfferView::new(p, currency)).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load offer plans");
            Vec::new()
        }
    };
    offers.sort_by_key(|offer| !offer.is_popular);

    OffersTemplate { page, offers }
}

/// Display one offer plan.
#[instrument(skip(state, page))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<OfferPlanId>,
    page: PageContext,
) -> Result<impl IntoResponse> {
    let plan = state.backend().get_offer_plan(id).await.map_err(|e| match e {
        BackendError::NotFound(_) => AppError::NotFound(format!("Offer plan {id}")),
        other => AppError::Backend(other),
    })?;

    Ok(OfferTemplate {
        page,
        offer: OfferView::new(&plan, state.currency()),
    })
}
