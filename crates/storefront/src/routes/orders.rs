//! Order history, order detail and cancellation.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use handyhub_core::{OrderId, OrderStatusCounts};
use serde::Deserialize;
use tracing::instrument;

use super::views::{OrderView, PageContext};
use crate::backend::BackendError;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{BackendSession, RequireAuth};
use crate::state::AppState;

/// Order detail query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    /// Set by checkout so the page can thank the customer.
    #[serde(default)]
    pub placed: Option<u8>,
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub page: PageContext,
    pub orders: Vec<OrderView>,
    pub counts: OrderStatusCounts,
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderTemplate {
    pub page: PageContext,
    pub order: OrderView,
    pub just_placed: bool,
    pub error: Option<String>,
}

fn order_not_found(id: OrderId) -> impl FnOnce(BackendError) -> AppError {
    move |err| match err {
        BackendError::NotFound(_) | BackendError::Forbidden(_) => {
            AppError::NotFound(format!("Order {id}"))
        }
        other => AppError::Backend(other),
    }
}

/// Display the customer's orders, newest first.
#[instrument(skip(state, page, backend_session, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
    mut backend_session: BackendSession,
) -> Result<impl IntoResponse> {
    let result = state.backend().list_orders(backend_session.jar()).await;
    let orders = match backend_session.settle(result).await {
        Ok(orders) => orders,
        Err(BackendError::Unauthorized) => return Err(BackendError::Unauthorized.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load orders");
            Vec::new()
        }
    };

    let currency = state.currency();
    Ok(OrdersTemplate {
        page,
        counts: OrderStatusCounts::tally(&orders),
        orders: orders.iter().map(|o| OrderView::new(o, currency)).collect(),
    })
}

/// Display a single order.
#[instrument(skip(state, page, backend_session, query, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
    Query(query): Query<OrderQuery>,
    page: PageContext,
    mut backend_session: BackendSession,
) -> Result<impl IntoResponse> {
    let result = state.backend().get_order(backend_session.jar(), id).await;
    let order = backend_session
        .settle(result)
        .await
        .map_err(order_not_found(id))?;

    Ok(OrderTemplate {
        page,
        order: OrderView::new(&order, state.currency()),
        just_placed: query.placed.is_some(),
        error: None,
    })
}

/// Cancel an order and return to its page.
///
/// Cancellation rules live on the backend; a refusal re-renders the order
/// with the backend's message.
#[instrument(skip(state, page, backend_session, user), fields(user_id = %user.id))]
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
    page: PageContext,
    mut backend_session: BackendSession,
) -> Result<Response> {
    let backend = state.backend();
    let result = backend.cancel_order(backend_session.jar(), id).await;

    match backend_session.settle(result).await {
        Ok(order) => {
            add_breadcrumb(
                "orders",
                "Order cancelled",
                Some(&[("order", order.order_number.as_str())]),
            );
            Ok(Redirect::to(&format!("/orders/{id}")).into_response())
        }
        Err(e) if e.is_user_facing() => {
            tracing::warn!(error = %e, "Order cancellation refused");
            let current = backend.get_order(backend_session.jar(), id).await;
            let order = backend_session
                .settle(current)
                .await
                .map_err(order_not_found(id))?;
            Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                OrderTemplate {
                    page,
                    order: OrderView::new(&order, state.currency()),
                    just_placed: false,
                    error: Some(e.user_message()),
                },
            )
                .into_response())
        }
        Err(e) => Err(order_not_found(id)(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_not_found_hides_foreign_orders() {
        let err = order_not_found(OrderId::new(9))(BackendError::Forbidden("not yours".to_string()));
        assert!(matches!(err, AppError::NotFound(ref what) if what == "Order 9"));
    }

    #[test]
    fn test_order_not_found_passes_other_errors() {
        let err = order_not_found(OrderId::new(9))(BackendError::Unauthorized);
        assert!(matches!(err, AppError::Backend(BackendError::Unauthorized)));
    }
}
