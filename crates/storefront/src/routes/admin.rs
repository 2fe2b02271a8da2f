//! Admin JSON API.
//!
//! A thin data-access surface over the backend's admin endpoints, for the
//! admin dashboard's scripts. Every route requires an admin session and
//! answers in the backend's own `{ success, data?, error? }` envelope.

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use handyhub_core::{
    AdminStats, ApiEnvelope, Category, CategoryId, CategoryInput, ContactSettings, Coupon,
    CouponId, CouponInput, Order, OrderId, OrderStatus, Service, ServiceId, ServiceInput,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::backend::BackendError;
use crate::error::AppError;
use crate::middleware::{BackendSession, RequireAdmin};
use crate::state::AppState;

// =============================================================================
// Responses
// =============================================================================

/// Admin API failure rendered as a JSON envelope.
#[derive(Debug)]
pub enum AdminApiError {
    /// The backend call failed.
    Backend(BackendError),
    /// The request itself could not be read (bad id, malformed body).
    Rejected { status: StatusCode, message: String },
}

impl From<BackendError> for AdminApiError {
    fn from(err: BackendError) -> Self {
        Self::Backend(err)
    }
}

macro_rules! rejected_from {
    ($($rejection:ty),+) => {
        $(
            impl From<$rejection> for AdminApiError {
                fn from(rejection: $rejection) -> Self {
                    Self::Rejected {
                        status: rejection.status(),
                        message: rejection.body_text(),
                    }
                }
            }
        )+
    };
}

rejected_from!(JsonRejection, PathRejection, QueryRejection);

impl IntoResponse for AdminApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Backend(err) => {
                let err = AppError::Backend(err);
                let status = err.status();
                if status.is_server_error() {
                    let event_id = sentry::capture_error(&err);
                    tracing::error!(error = %err, sentry_event_id = %event_id, "Admin API error");
                }
                let body = ApiEnvelope::<()>::failure(err.public_message());
                (status, Json(body)).into_response()
            }
            Self::Rejected { status, message } => {
                tracing::debug!(%status, %message, "Admin API request rejected");
                (status, Json(ApiEnvelope::<()>::failure(message))).into_response()
            }
        }
    }
}

/// JSON body whose rejection is an [`AdminApiError`] envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AdminApiError))]
pub struct AdminJson<T>(pub T);

/// Path parameters whose rejection is an [`AdminApiError`] envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(AdminApiError))]
pub struct AdminPath<T>(pub T);

/// Query string whose rejection is an [`AdminApiError`] envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(AdminApiError))]
pub struct AdminQuery<T>(pub T);

type ApiResult<T> = Result<Json<ApiEnvelope<T>>, AdminApiError>;

/// Wrap a backend result in the success envelope.
fn envelope<T>(result: Result<T, BackendError>) -> ApiResult<T> {
    Ok(Json(ApiEnvelope::ok(result?)))
}

/// Acknowledgement for deletes.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: bool,
}

// =============================================================================
// Requests
// =============================================================================

/// `GET /admin/api/orders` filter.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<OrderStatus>,
}

/// `PUT /admin/api/orders/{id}/status` body.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

// =============================================================================
// Handlers
// =============================================================================

/// Dashboard totals.
#[instrument(skip(state, backend_session, admin), fields(admin_id = %admin.id))]
pub async fn stats(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    mut backend_session: BackendSession,
) -> ApiResult<AdminStats> {
    let result = state.backend().admin_stats(backend_session.jar()).await;
    envelope(backend_session.settle(result).await)
}

/// Orders, optionally filtered by status.
#[instrument(skip(state, backend_session, admin), fields(admin_id = %admin.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AdminQuery(query): AdminQuery<OrdersQuery>,
    mut backend_session: BackendSession,
) -> ApiResult<Vec<Order>> {
    let result = state
        .backend()
        .admin_list_orders(backend_session.jar(), query.status)
        .await;
    envelope(backend_session.settle(result).await)
}

/// Move an order to a new status.
#[instrument(skip(state, backend_session, admin, body), fields(admin_id = %admin.id, status = %body.status))]
pub async fn update_order_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AdminPath(id): AdminPath<OrderId>,
    mut backend_session: BackendSession,
    AdminJson(body): AdminJson<StatusUpdate>,
) -> ApiResult<Order> {
    let result = state
        .backend()
        .admin_update_order_status(backend_session.jar(), id, body.status)
        .await;
    envelope(backend_session.settle(result).await)
}

/// Create a category.
#[instrument(skip(state, backend_session, admin, input), fields(admin_id = %admin.id))]
pub async fn create_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    mut backend_session: BackendSession,
    AdminJson(input): AdminJson<CategoryInput>,
) -> ApiResult<Category> {
    let result = state
        .backend()
        .admin_create_category(backend_session.jar(), &input)
        .await;
    envelope(backend_session.settle(result).await)
}

/// Update a category.
#[instrument(skip(state, backend_session, admin, input), fields(admin_id = %admin.id))]
pub async fn update_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AdminPath(id): AdminPath<CategoryId>,
    mut backend_session: BackendSession,
    AdminJson(input): AdminJson<CategoryInput>,
) -> ApiResult<Category> {
    let result = state
        .backend()
        .admin_update_category(backend_session.jar(), id, &input)
        .await;
    envelope(backend_session.settle(result).await)
}

/// Delete a category.
#[instrument(skip(state, backend_session, admin), fields(admin_id = %admin.id))]
pub async fn delete_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AdminPath(id): AdminPath<CategoryId>,
    mut backend_session: BackendSession,
) -> ApiResult<Deleted> {
    let result = state
        .backend()
        .admin_delete_category(backend_session.jar(), id)
        .await;
    envelope(
        backend_session
            .settle(result)
            .await
            .map(|()| Deleted { deleted: true }),
    )
}

/// Create a service.
#[instrument(skip(state, backend_session, admin, input), fields(admin_id = %admin.id))]
pub async fn create_service(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    mut backend_session: BackendSession,
    AdminJson(input): AdminJson<ServiceInput>,
) -> ApiResult<Service> {
    let result = state
        .backend()
        .admin_create_service(backend_session.jar(), &input)
        .await;
    envelope(backend_session.settle(result).await)
}

/// Update a service.
#[instrument(skip(state, backend_session, admin, input), fields(admin_id = %admin.id))]
pub async fn update_service(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AdminPath(id): AdminPath<ServiceId>,
    mut backend_session: BackendSession,
    AdminJson(input): AdminJson<ServiceInput>,
) -> ApiResult<Service> {
    let result = state
        .backend()
        .admin_update_service(backend_session.jar(), id, &input)
        .await;
    envelope(backend_session.settle(result).await)
}

/// Delete a service.
#[instrument(skip(state, backend_session, admin), fields(admin_id = %admin.id))]
pub async fn delete_service(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AdminPath(id): AdminPath<ServiceId>,
    mut backend_session: BackendSession,
) -> ApiResult<Deleted> {
    let result = state
        .backend()
        .admin_delete_service(backend_session.jar(), id)
        .await;
    envelope(
        backend_session
            .settle(result)
            .await
            .map(|()| Deleted { deleted: true }),
    )
}

/// Create a coupon.
#[instrument(skip(state, backend_session, admin, input), fields(admin_id = %admin.id))]
pub async fn create_coupon(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    mut backend_session: BackendSession,
    AdminJson(input): AdminJson<CouponInput>,
) -> ApiResult<Coupon> {
    let result = state
        .backend()
        .admin_create_coupon(backend_session.jar(), &input)
        .await;
    envelope(backend_session.settle(result).await)
}

/// Delete a coupon.
#[instrument(skip(state, backend_session, admin), fields(admin_id = %admin.id))]
pub async fn delete_coupon(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AdminPath(id): AdminPath<CouponId>,
    mut backend_session: BackendSession,
) -> ApiResult<Deleted> {
    let result = state
        .backend()
        .admin_delete_coupon(backend_session.jar(), id)
        .await;
    envelope(
        backend_session
            .settle(result)
            .await
            .map(|()| Deleted { deleted: true }),
    )
}

/// Replace the site contact settings.
#[instrument(skip(state, backend_session, admin, settings), fields(admin_id = %admin.id))]
pub async fn update_contact_settings(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    mut backend_session: BackendSession,
    AdminJson(settings): AdminJson<ContactSettings>,
) -> ApiResult<ContactSettings> {
    let result = state
        .backend()
        .admin_update_contact_settings(backend_session.jar(), &settings)
        .await;
    envelope(backend_session.settle(result).await)
}

/// Unknown admin API path.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiEnvelope::<()>::failure("Not found")),
    )
}
