//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                            - Home page
//! GET  /health                      - Liveness
//! GET  /health/ready                - Backend reachability
//!
//! # Catalog
//! GET  /categories                  - Category listing
//! GET  /categories/{slug}           - Category detail (?sub= narrows services)
//! GET  /services/{slug}             - Service detail
//! GET  /search?q=                   - Service search
//! GET  /offers                      - Offer plans
//! GET  /offers/{id}                 - Offer plan detail
//!
//! # Cart (HTMX fragments)
//! GET  /cart                        - Cart page
//! POST /cart/add                    - Add to cart (count badge, triggers cart-updated)
//! POST /cart/update                 - Update quantity (cart_items fragment)
//! POST /cart/remove                 - Remove item (cart_items fragment)
//! GET  /cart/count                  - Cart count badge (fragment)
//! POST /cart/coupon                 - Apply coupon (cart_items fragment)
//! POST /cart/coupon/remove          - Remove coupon (cart_items fragment)
//! POST /cart/clear                  - Empty the cart (cart_items fragment)
//! GET  /coupons                     - Available coupons
//! POST /coupons/check               - Dry-run a coupon against the cart (fragment)
//!
//! # Booking (requires auth)
//! GET  /checkout                    - Booking form
//! POST /checkout                    - Place order
//! GET  /orders                      - Order history
//! GET  /orders/{id}                 - Order detail
//! POST /orders/{id}/cancel          - Cancel order
//!
//! # Account (requires auth)
//! GET  /account/addresses           - Address book
//! POST /account/addresses           - Add address
//! POST /account/addresses/{id}      - Update address
//! POST /account/addresses/{id}/delete  - Delete address
//! POST /account/addresses/{id}/default - Make default
//!
//! # Contact
//! GET  /contact                     - Contact details and form
//! POST /contact                     - Send message
//!
//! # Auth
//! GET  /auth/login                  - Login page
//! POST /auth/login                  - Login action
//! GET  /auth/register               - Register page
//! POST /auth/register               - Register action
//! POST /auth/logout                 - Logout action
//!
//! # Admin JSON API (requires admin)
//! GET  /admin/api/stats
//! GET  /admin/api/orders?status=
//! PUT  /admin/api/orders/{id}/status
//! POST /admin/api/categories        PUT|DELETE /admin/api/categories/{id}
//! POST /admin/api/services          PUT|DELETE /admin/api/services/{id}
//! POST /admin/api/coupons           DELETE /admin/api/coupons/{id}
//! PUT  /admin/api/settings/contact
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod contact;
pub mod home;
pub mod offers;
pub mod orders;
pub mod views;

use axum::{
    Router,
    routing::{MethodRouter, get, post, put},
};

use crate::middleware::{auth_rate_limiter, mutation_rate_limiter};
use crate::state::AppState;

/// Apply the shared mutation rate limit to a single route's handlers.
fn rate_limited(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    match mutation_rate_limiter() {
        Some(limiter) => route.layer(limiter),
        None => route,
    }
}

/// Create the auth routes router.
///
/// Login and registration are rate limited per client IP.
pub fn auth_routes() -> Router<AppState> {
    let router = Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout));

    match auth_rate_limiter() {
        Some(limiter) => router.layer(limiter),
        None => router,
    }
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(catalog::index))
        .route("/categories/{slug}", get(catalog::show))
        .route("/services/{slug}", get(catalog::service))
        .route("/search", get(catalog::search))
        .route("/offers", get(offers::index))
        .route("/offers/{id}", get(offers::show))
}

/// Create the cart routes router.
///
/// Mutations share a per-IP rate limit; the page and badge reads do not.
pub fn cart_routes() -> Router<AppState> {
    let mutations = Router::new()
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/coupon", post(cart::apply_coupon))
        .route("/coupon/remove", post(cart::remove_coupon))
        .route("/clear", post(cart::clear));
    let mutations = match mutation_rate_limiter() {
        Some(limiter) => mutations.layer(limiter),
        None => mutations,
    };

    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .merge(mutations)
}

/// Create the booking routes router.
///
/// Placing an order shares the mutation rate limit.
pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/checkout",
            get(checkout::show).merge(rate_limited(post(checkout::place))),
        )
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/cancel", post(orders::cancel))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/addresses",
            get(account::addresses).post(account::create),
        )
        .route("/addresses/{id}", post(account::update))
        .route("/addresses/{id}/delete", post(account::delete))
        .route("/addresses/{id}/default", post(account::set_default))
}

/// Create the admin JSON API router.
pub fn admin_api_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(admin::stats))
        .route("/orders", get(admin::orders))
        .route("/orders/{id}/status", put(admin::update_order_status))
        .route("/categories", post(admin::create_category))
        .route(
            "/categories/{id}",
            put(admin::update_category).delete(admin::delete_category),
        )
        .route("/services", post(admin::create_service))
        .route(
            "/services/{id}",
            put(admin::update_service).delete(admin::delete_service),
        )
        .route("/coupons", post(admin::create_coupon))
        .route("/coupons/{id}", axum::routing::delete(admin::delete_coupon))
        .route("/settings/contact", put(admin::update_contact_settings))
        .fallback(admin::not_found)
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog, search and offers
        .merge(catalog_routes())
        // Cart and coupons
        .nest("/cart", cart_routes())
        .route("/coupons", get(cart::coupons))
        .route("/coupons/check", rate_limited(post(cart::check_coupon)))
        // Checkout and orders
        .merge(booking_routes())
        // Account routes
        .nest("/account", account_routes())
        // Contact
        .route(
            "/contact",
            get(contact::show).merge(rate_limited(post(contact::submit))),
        )
        // Auth routes
        .nest("/auth", auth_routes())
        // Admin data access
        .nest("/admin/api", admin_api_routes())
}
