//! An in-process stand-in for the HandyHub backend REST API.
//!
//! Serves the `/api/*` endpoints the storefront calls, wrapped in the same
//! `{ success, data?, error? }` envelope, with a session cookie (`sid`) that
//! keys the cart and the signed-in account. Prices are whole rupees.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};

/// Password of every seeded account.
pub const PASSWORD: &str = "correct-horse-9";
/// Seeded customer.
pub const CUSTOMER_EMAIL: &str = "asha@example.in";
/// Seeded admin.
pub const ADMIN_EMAIL: &str = "ops@handyhub.in";

const SESSION_COOKIE: &str = "sid";

#[derive(Debug, Clone)]
pub struct FakeService {
    pub id: i32,
    pub category_id: i32,
    pub subcategory_id: Option<i32>,
    pub name: &'static str,
    pub slug: &'static str,
    pub price: i64,
    pub discounted_price: Option<i64>,
    pub duration_minutes: u32,
    pub is_active: bool,
}

impl FakeService {
    const fn charged(&self) -> i64 {
        match self.discounted_price {
            Some(price) => price,
            None => self.price,
        }
    }

    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "categoryId": self.category_id,
            "subcategoryId": self.subcategory_id,
            "name": self.name,
            "slug": self.slug,
            "description": format!("{} by verified professionals", self.name),
            "price": self.price,
            "discountedPrice": self.discounted_price,
            "durationMinutes": self.duration_minutes,
            "rating": 4.6,
            "reviewCount": 120,
            "isActive": self.is_active,
        })
    }
}

#[derive(Debug, Clone)]
struct FakeCoupon {
    id: i32,
    code: &'static str,
    percentage: bool,
    value: i64,
    min_order: Option<i64>,
    max_discount: Option<i64>,
}

impl FakeCoupon {
    fn discount(&self, subtotal: i64) -> Result<i64, String> {
        if let Some(min) = self.min_order.filter(|min| subtotal < *min) {
            return Err(format!("Minimum order amount is {min}"));
        }
        let discount = if self.percentage {
            subtotal * self.value / 100
        } else {
            self.value
        };
        let discount = self.max_discount.map_or(discount, |max| discount.min(max));
        Ok(discount.min(subtotal))
    }

    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "code": self.code,
            "description": "Seeded coupon",
            "discountType": if self.percentage { "percentage" } else { "fixed" },
            "discountValue": self.value,
            "minOrderAmount": self.min_order,
            "maxDiscount": self.max_discount,
            "isActive": true,
        })
    }
}

#[derive(Debug, Clone)]
struct FakeUser {
    id: i32,
    name: String,
    email: String,
    phone: Option<String>,
    password: String,
    admin: bool,
}

impl FakeUser {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "email": self.email,
            "phone": self.phone,
            "role": if self.admin { "admin" } else { "customer" },
        })
    }
}

#[derive(Debug, Clone, Default)]
struct CartLine {
    id: i32,
    service_id: i32,
    quantity: u32,
}

#[derive(Debug, Default)]
struct Session {
    user_id: Option<i32>,
    lines: Vec<CartLine>,
    coupon: Option<String>,
}

#[derive(Debug, Clone)]
struct FakeOrder {
    id: i32,
    user_id: i32,
    status: String,
    body: Value,
}

/// Everything the fake backend knows.
#[derive(Debug)]
pub struct BackendData {
    services: Vec<FakeService>,
    categories: Vec<Value>,
    coupons: Vec<FakeCoupon>,
    users: Vec<FakeUser>,
    addresses: HashMap<i32, Vec<Value>>,
    orders: Vec<FakeOrder>,
    sessions: HashMap<String, Session>,
    contact: Value,
    contact_messages: Vec<Value>,
    next_id: i32,
}

impl BackendData {
    fn seeded() -> Self {
        let services = vec![
            FakeService {
                id: 10,
                category_id: 1,
                subcategory_id: Some(100),
                name: "Deep Home Cleaning",
                slug: "deep-home-cleaning",
                price: 2499,
                discounted_price: Some(1999),
                duration_minutes: 240,
                is_active: true,
            },
            FakeService {
                id: 11,
                category_id: 1,
                subcategory_id: Some(101),
                name: "Bathroom Cleaning",
                slug: "bathroom-cleaning",
                price: 499,
                discounted_price: None,
                duration_minutes: 60,
                is_active: true,
            },
            FakeService {
                id: 20,
                category_id: 2,
                subcategory_id: None,
                name: "Tap Repair",
                slug: "tap-repair",
                price: 199,
                discounted_price: None,
                duration_minutes: 30,
                is_active: true,
            },
            FakeService {
                id: 21,
                category_id: 2,
                subcategory_id: None,
                name: "Geyser Installation",
                slug: "geyser-installation",
                price: 899,
                discounted_price: None,
                duration_minutes: 90,
                is_active: false,
            },
        ];

        let categories = vec![
            json!({"id": 1, "name": "Cleaning", "slug": "cleaning", "description": "Homes, kitchens and bathrooms", "isActive": true, "sortOrder": 1}),
            json!({"id": 2, "name": "Plumbing", "slug": "plumbing", "description": "Leaks, taps and fittings", "isActive": true, "sortOrder": 2}),
            json!({"id": 3, "name": "Painting", "slug": "painting", "isActive": false, "sortOrder": 3}),
        ];

        let coupons = vec![
            FakeCoupon {
                id: 1,
                code: "FIRST100",
                percentage: false,
                value: 100,
                min_order: Some(500),
                max_discount: None,
            },
            FakeCoupon {
                id: 2,
                code: "SAVE20",
                percentage: true,
                value: 20,
                min_order: None,
                max_discount: Some(300),
            },
        ];

        let users = vec![
            FakeUser {
                id: 7,
                name: "Asha Rao".to_string(),
                email: CUSTOMER_EMAIL.to_string(),
                phone: Some("9876543210".to_string()),
                password: PASSWORD.to_string(),
                admin: false,
            },
            FakeUser {
                id: 1,
                name: "Ops Team".to_string(),
                email: ADMIN_EMAIL.to_string(),
                phone: None,
                password: PASSWORD.to_string(),
                admin: true,
            },
        ];

        let mut addresses = HashMap::new();
        addresses.insert(
            7,
            vec![json!({
                "id": 501,
                "label": "Home",
                "fullName": "Asha Rao",
                "phone": "9876543210",
                "addressLine1": "12 MG Road",
                "addressLine2": "Flat 4B",
                "city": "Bengaluru",
                "state": "Karnataka",
                "pincode": "560001",
                "landmark": "Near Metro",
                "isDefault": true,
            })],
        );

        Self {
            services,
            categories,
            coupons,
            users,
            addresses,
            orders: Vec::new(),
            sessions: HashMap::new(),
            contact: json!({
                "phone": "+91 98765 43210",
                "email": "support@handyhub.in",
                "whatsapp": "+91 98765 43210",
                "address": "HandyHub HQ, Bengaluru",
                "workingHours": "8 AM to 8 PM, all days",
            }),
            contact_messages: Vec::new(),
            next_id: 1000,
        }
    }

    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn service(&self, id: i32) -> Option<&FakeService> {
        self.services.iter().find(|s| s.id == id)
    }

    fn coupon(&self, code: &str) -> Option<&FakeCoupon> {
        self.coupons.iter().find(|c| c.code == code)
    }

    fn session_user(&self, sid: &str) -> Option<&FakeUser> {
        let user_id = self.sessions.get(sid)?.user_id?;
        self.users.iter().find(|u| u.id == user_id)
    }

    /// Priced cart for a session, as the backend reports it.
    fn cart_json(&self, sid: &str) -> Value {
        let Some(session) = self.sessions.get(sid) else {
            return json!({"items": [], "subtotal": 0, "discountAmount": 0, "finalAmount": 0});
        };

        let mut subtotal = 0;
        let items: Vec<Value> = session
            .lines
            .iter()
            .filter_map(|line| {
                let service = self.service(line.service_id)?;
                let total = service.charged() * i64::from(line.quantity);
                subtotal += total;
                Some(json!({
                    "id": line.id,
                    "serviceId": service.id,
                    "serviceName": service.name,
                    "quantity": line.quantity,
                    "unitPrice": service.charged(),
                    "totalPrice": total,
                }))
            })
            .collect();

        let discount = session
            .coupon
            .as_deref()
            .and_then(|code| self.coupon(code))
            .and_then(|coupon| coupon.discount(subtotal).ok())
            .unwrap_or(0);

        json!({
            "id": 1,
            "items": items,
            "subtotal": subtotal,
            "discountAmount": discount,
            "finalAmount": subtotal - discount,
            "couponCode": session.coupon,
        })
    }

    /// Contact messages received so far.
    #[must_use]
    pub fn contact_messages(&self) -> &[Value] {
        &self.contact_messages
    }

    /// Status of an order by id.
    #[must_use]
    pub fn order_status(&self, id: i32) -> Option<&str> {
        self.orders
            .iter()
            .find(|o| o.id == id)
            .map(|o| o.status.as_str())
    }

    /// Mark a service inactive, as an admin edit would.
    pub fn deactivate_service(&mut self, id: i32) {
        if let Some(service) = self.services.iter_mut().find(|s| s.id == id) {
            service.is_active = false;
        }
    }

    /// Drop every session, as a backend restart or session timeout would.
    pub fn expire_sessions(&mut self) {
        self.sessions.clear();
    }

    /// Number of cart lines across all sessions.
    #[must_use]
    pub fn cart_line_count(&self) -> usize {
        self.sessions.values().map(|s| s.lines.len()).sum()
    }

    /// Force an order into a status, as the operations team would.
    pub fn set_order_status(&mut self, id: i32, status: &str) {
        if let Some(order) = self.orders.iter_mut().find(|o| o.id == id) {
            order.status = status.to_string();
        }
    }
}

type Shared = Arc<Mutex<BackendData>>;

/// Handle on a running fake backend.
#[derive(Clone)]
pub struct FakeBackend {
    data: Shared,
    addr: SocketAddr,
}

impl FakeBackend {
    /// Start the fake backend on an ephemeral port.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let data: Shared = Arc::new(Mutex::new(BackendData::seeded()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let app = router(Arc::clone(&data));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { data, addr })
    }

    /// Base URL with a trailing slash, as the storefront expects.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Lock the backend's data for inspection or changes.
    pub fn data(&self) -> MutexGuard<'_, BackendData> {
        lock(&self.data)
    }
}

fn lock(data: &Shared) -> MutexGuard<'_, BackendData> {
    data.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Envelope helpers
// =============================================================================

fn ok(data: Value) -> Response {
    Json(json!({"success": true, "data": data})).into_response()
}

fn fail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"success": false, "error": message}))).into_response()
}

fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| pair.trim().strip_prefix("sid="))
        .map(str::to_string)
}

/// Run `f` inside the caller's backend session, opening one (and setting the
/// cookie) if the request did not carry a known `sid`.
fn with_session(
    data: &Shared,
    headers: &HeaderMap,
    f: impl FnOnce(&mut BackendData, &str) -> Response,
) -> Response {
    let mut data = lock(data);
    let existing = session_id(headers).filter(|sid| data.sessions.contains_key(sid));
    let (sid, fresh) = match existing {
        Some(sid) => (sid, false),
        None => (format!("s{}", data.next_id()), true),
    };
    data.sessions.entry(sid.clone()).or_default();

    let mut response = f(&mut data, &sid);
    if fresh {
        let cookie = HeaderValue::from_str(&format!("{SESSION_COOKIE}={sid}; Path=/; HttpOnly"));
        if let Ok(cookie) = cookie {
            response.headers_mut().append(SET_COOKIE, cookie);
        }
    }
    response
}

/// Like [`with_session`], but the session must be signed in.
fn with_user(
    data: &Shared,
    headers: &HeaderMap,
    f: impl FnOnce(&mut BackendData, &str, i32) -> Response,
) -> Response {
    with_session(data, headers, |data, sid| {
        match data.session_user(sid).map(|u| u.id) {
            Some(user_id) => f(data, sid, user_id),
            None => fail(StatusCode::UNAUTHORIZED, "Not authenticated"),
        }
    })
}

/// Like [`with_user`], but the account must be an admin.
fn with_admin(
    data: &Shared,
    headers: &HeaderMap,
    f: impl FnOnce(&mut BackendData) -> Response,
) -> Response {
    with_user(data, headers, |data, sid, _| {
        if data.session_user(sid).is_some_and(|u| u.admin) {
            f(data)
        } else {
            fail(StatusCode::FORBIDDEN, "Admin access required")
        }
    })
}

// =============================================================================
// Router
// =============================================================================

fn router(data: Shared) -> Router {
    Router::new()
        .route("/api/health", get(|| async { Json(json!({"status": "ok"})) }))
        .route("/api/categories", get(categories))
        .route("/api/categories/{key}", get(category))
        .route("/api/categories/{key}/subcategories", get(subcategories))
        .route("/api/services", get(services))
        .route("/api/services/{key}", get(service))
        .route("/api/offers", get(offers))
        .route("/api/offers/{key}", get(offer))
        .route("/api/coupons", get(coupons))
        .route("/api/coupons/validate", post(validate_coupon))
        .route("/api/settings/contact", get(contact_settings))
        .route("/api/contact", post(contact))
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
        .route("/api/cart", get(cart).post(add_to_cart).delete(clear_cart))
        .route("/api/cart/coupon", post(apply_coupon).delete(remove_coupon))
        .route("/api/cart/{key}", put(update_line).delete(remove_line))
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/{key}", get(get_order))
        .route("/api/orders/{key}/cancel", put(cancel_order))
        .route("/api/addresses", get(list_addresses).post(create_address))
        .route(
            "/api/addresses/{key}",
            put(update_address).delete(delete_address),
        )
        .route("/api/addresses/{key}/default", put(default_address))
        .route("/api/admin/stats", get(admin_stats))
        .route("/api/admin/orders", get(admin_orders))
        .route("/api/admin/orders/{key}/status", put(admin_order_status))
        .route("/api/admin/categories", post(admin_create_category))
        .route("/api/admin/settings/contact", put(admin_contact_settings))
        .fallback(|| async { fail(StatusCode::NOT_FOUND, "Not found") })
        .with_state(data)
}

// =============================================================================
// Catalog
// =============================================================================

async fn categories(State(data): State<Shared>) -> Response {
    ok(Value::from(lock(&data).categories.clone()))
}

async fn category(State(data): State<Shared>, Path(slug): Path<String>) -> Response {
    let data = lock(&data);
    data.categories
        .iter()
        .find(|c| c["slug"] == slug.as_str())
        .map_or_else(
            || fail(StatusCode::NOT_FOUND, "Category not found"),
            |c| ok(c.clone()),
        )
}

async fn subcategories(Path(category_id): Path<i32>) -> Response {
    let subcategories = if category_id == 1 {
        json!([
            {"id": 100, "categoryId": 1, "name": "Full home", "slug": "full-home"},
            {"id": 101, "categoryId": 1, "name": "Bathroom", "slug": "bathroom"},
        ])
    } else {
        json!([])
    };
    ok(subcategories)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServicesQuery {
    category_id: Option<i32>,
    subcategory_id: Option<i32>,
}

async fn services(State(data): State<Shared>, Query(query): Query<ServicesQuery>) -> Response {
    let data = lock(&data);
    let services: Vec<Value> = data
        .services
        .iter()
        .filter(|s| query.category_id.is_none_or(|id| s.category_id == id))
        .filter(|s| {
            query
                .subcategory_id
                .is_none_or(|id| s.subcategory_id == Some(id))
        })
        .map(FakeService::to_json)
        .collect();
    ok(Value::from(services))
}

async fn service(State(data): State<Shared>, Path(slug): Path<String>) -> Response {
    let data = lock(&data);
    data.services
        .iter()
        .find(|s| s.slug == slug)
        .map_or_else(
            || fail(StatusCode::NOT_FOUND, "Service not found"),
            |s| ok(s.to_json()),
        )
}

fn offer_plans() -> Vec<Value> {
    vec![
        json!({"id": 1, "name": "Basic Care", "description": "Two cleanings a year", "price": 999, "validityDays": 365, "features": ["2 deep cleanings"], "isPopular": false}),
        json!({"id": 2, "name": "Home Care Plus", "description": "Quarterly cleaning and plumbing checks", "price": 2999, "originalPrice": 3999, "validityDays": 365, "features": ["4 deep cleanings", "Free plumbing visit"], "isPopular": true}),
    ]
}

async fn offers() -> Response {
    ok(Value::from(offer_plans()))
}

async fn offer(Path(id): Path<i32>) -> Response {
    offer_plans()
        .into_iter()
        .find(|plan| plan["id"] == id)
        .map_or_else(|| fail(StatusCode::NOT_FOUND, "Offer plan not found"), ok)
}

async fn coupons(State(data): State<Shared>) -> Response {
    let data = lock(&data);
    ok(Value::from(
        data.coupons.iter().map(FakeCoupon::to_json).collect::<Vec<_>>(),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateBody {
    code: String,
    cart_total: Value,
}

/// Dry run: unknown codes are an error, inapplicable ones `valid: false`.
async fn validate_coupon(State(data): State<Shared>, Json(body): Json<ValidateBody>) -> Response {
    let data = lock(&data);
    let Some(coupon) = data.coupon(&body.code) else {
        return fail(StatusCode::BAD_REQUEST, "Invalid coupon code");
    };
    let total = match &body.cart_total {
        Value::String(s) => s.parse::<f64>().ok(),
        other => other.as_f64(),
    };
    #[allow(clippy::cast_possible_truncation)]
    let total = total.unwrap_or(0.0) as i64;
    match coupon.discount(total) {
        Ok(discount) => ok(json!({
            "valid": true,
            "discountAmount": discount,
            "finalAmount": total - discount,
        })),
        Err(message) => ok(json!({"valid": false, "message": message})),
    }
}

async fn contact_settings(State(data): State<Shared>) -> Response {
    ok(lock(&data).contact.clone())
}

async fn contact(State(data): State<Shared>, Json(message): Json<Value>) -> Response {
    lock(&data).contact_messages.push(message);
    ok(json!({"received": true}))
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<LoginBody>,
) -> Response {
    with_session(&data, &headers, |data, sid| {
        let Some(user) = data
            .users
            .iter()
            .find(|u| u.email == body.email && u.password == body.password)
            .cloned()
        else {
            return fail(StatusCode::UNAUTHORIZED, "Invalid email or password");
        };
        if let Some(session) = data.sessions.get_mut(sid) {
            session.user_id = Some(user.id);
        }
        ok(user.to_json())
    })
}

#[derive(Debug, Deserialize)]
struct RegisterBody {
    name: String,
    email: String,
    phone: Option<String>,
    password: String,
}

async fn register(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<RegisterBody>,
) -> Response {
    with_session(&data, &headers, |data, sid| {
        if data.users.iter().any(|u| u.email == body.email) {
            return fail(StatusCode::BAD_REQUEST, "Email already registered");
        }
        let user = FakeUser {
            id: data.next_id(),
            name: body.name,
            email: body.email,
            phone: body.phone,
            password: body.password,
            admin: false,
        };
        let json = user.to_json();
        if let Some(session) = data.sessions.get_mut(sid) {
            session.user_id = Some(user.id);
        }
        data.users.push(user);
        ok(json)
    })
}

async fn logout(State(data): State<Shared>, headers: HeaderMap) -> Response {
    let mut data = lock(&data);
    if let Some(sid) = session_id(&headers) {
        data.sessions.remove(&sid);
    }
    let mut response = ok(Value::Null);
    response.headers_mut().append(
        SET_COOKIE,
        HeaderValue::from_static("sid=; Path=/; Max-Age=0"),
    );
    response
}

async fn me(State(data): State<Shared>, headers: HeaderMap) -> Response {
    with_user(&data, &headers, |data, sid, _| {
        data.session_user(sid)
            .map_or_else(|| fail(StatusCode::UNAUTHORIZED, "Not authenticated"), |u| ok(u.to_json()))
    })
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddBody {
    service_id: i32,
    quantity: u32,
}

async fn cart(State(data): State<Shared>, headers: HeaderMap) -> Response {
    with_session(&data, &headers, |data, sid| ok(data.cart_json(sid)))
}

async fn add_to_cart(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<AddBody>,
) -> Response {
    with_session(&data, &headers, |data, sid| {
        if !data.service(body.service_id).is_some_and(|s| s.is_active) {
            return fail(StatusCode::BAD_REQUEST, "Service is not available");
        }
        let line_id = data.next_id();
        let Some(session) = data.sessions.get_mut(sid) else {
            return fail(StatusCode::INTERNAL_SERVER_ERROR, "Session lost");
        };
        match session
            .lines
            .iter_mut()
            .find(|l| l.service_id == body.service_id)
        {
            Some(line) => line.quantity += body.quantity,
            None => session.lines.push(CartLine {
                id: line_id,
                service_id: body.service_id,
                quantity: body.quantity,
            }),
        }
        ok(data.cart_json(sid))
    })
}

async fn clear_cart(State(data): State<Shared>, headers: HeaderMap) -> Response {
    with_session(&data, &headers, |data, sid| {
        if let Some(session) = data.sessions.get_mut(sid) {
            session.lines.clear();
            session.coupon = None;
        }
        ok(Value::Null)
    })
}

#[derive(Debug, Deserialize)]
struct QuantityBody {
    quantity: u32,
}

async fn update_line(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(line_id): Path<i32>,
    Json(body): Json<QuantityBody>,
) -> Response {
    with_session(&data, &headers, |data, sid| {
        let Some(line) = data
            .sessions
            .get_mut(sid)
            .and_then(|s| s.lines.iter_mut().find(|l| l.id == line_id))
        else {
            return fail(StatusCode::NOT_FOUND, "Cart item not found");
        };
        line.quantity = body.quantity;
        ok(data.cart_json(sid))
    })
}

async fn remove_line(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(line_id): Path<i32>,
) -> Response {
    with_session(&data, &headers, |data, sid| {
        if let Some(session) = data.sessions.get_mut(sid) {
            session.lines.retain(|l| l.id != line_id);
        }
        ok(data.cart_json(sid))
    })
}

#[derive(Debug, Deserialize)]
struct CouponBody {
    code: String,
}

async fn apply_coupon(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<CouponBody>,
) -> Response {
    with_session(&data, &headers, |data, sid| {
        let Some(coupon) = data.coupon(&body.code).cloned() else {
            return fail(StatusCode::BAD_REQUEST, "Invalid coupon code");
        };
        let subtotal = data.cart_json(sid)["subtotal"].as_i64().unwrap_or(0);
        if let Err(message) = coupon.discount(subtotal) {
            return fail(StatusCode::BAD_REQUEST, &message);
        }
        if let Some(session) = data.sessions.get_mut(sid) {
            session.coupon = Some(coupon.code.to_string());
        }
        ok(data.cart_json(sid))
    })
}

async fn remove_coupon(State(data): State<Shared>, headers: HeaderMap) -> Response {
    with_session(&data, &headers, |data, sid| {
        if let Some(session) = data.sessions.get_mut(sid) {
            session.coupon = None;
        }
        ok(data.cart_json(sid))
    })
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingBody {
    address_id: i32,
    scheduled_date: String,
    time_slot: String,
    payment_method: String,
    notes: Option<String>,
}

fn order_json(order: &FakeOrder) -> Value {
    let mut body = order.body.clone();
    body["status"] = Value::from(order.status.as_str());
    body
}

async fn create_order(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<BookingBody>,
) -> Response {
    with_user(&data, &headers, |data, sid, user_id| {
        let cart = data.cart_json(sid);
        if cart["items"].as_array().is_none_or(Vec::is_empty) {
            return fail(StatusCode::BAD_REQUEST, "Cart is empty");
        }
        let Some(address) = data
            .addresses
            .get(&user_id)
            .and_then(|list| list.iter().find(|a| a["id"] == body.address_id))
            .cloned()
        else {
            return fail(StatusCode::BAD_REQUEST, "Address not found");
        };

        let id = data.next_id();
        let items: Vec<Value> = cart["items"]
            .as_array()
            .into_iter()
            .flatten()
            .map(|item| {
                json!({
                    "serviceId": item["serviceId"],
                    "serviceName": item["serviceName"],
                    "quantity": item["quantity"],
                    "unitPrice": item["unitPrice"],
                    "totalPrice": item["totalPrice"],
                })
            })
            .collect();
        let order = FakeOrder {
            id,
            user_id,
            status: "pending".to_string(),
            body: json!({
                "id": id,
                "orderNumber": format!("HH{id}"),
                "paymentStatus": "pending",
                "paymentMethod": body.payment_method,
                "items": items,
                "subtotal": cart["subtotal"],
                "discountAmount": cart["discountAmount"],
                "finalAmount": cart["finalAmount"],
                "couponCode": cart["couponCode"],
                "address": address,
                "scheduledDate": body.scheduled_date,
                "timeSlot": body.time_slot,
                "notes": body.notes,
                "createdAt": "2026-10-19T09:30:00Z",
            }),
        };
        let json = order_json(&order);
        data.orders.push(order);
        if let Some(session) = data.sessions.get_mut(sid) {
            session.lines.clear();
            session.coupon = None;
        }
        ok(json)
    })
}

async fn list_orders(State(data): State<Shared>, headers: HeaderMap) -> Response {
    with_user(&data, &headers, |data, _, user_id| {
        let orders: Vec<Value> = data
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .map(order_json)
            .collect();
        ok(Value::from(orders))
    })
}

async fn get_order(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Response {
    with_user(&data, &headers, |data, _, user_id| {
        data.orders
            .iter()
            .find(|o| o.id == id && o.user_id == user_id)
            .map_or_else(
                || fail(StatusCode::NOT_FOUND, "Order not found"),
                |o| ok(order_json(o)),
            )
    })
}

async fn cancel_order(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Response {
    with_user(&data, &headers, |data, _, user_id| {
        let Some(order) = data
            .orders
            .iter_mut()
            .find(|o| o.id == id && o.user_id == user_id)
        else {
            return fail(StatusCode::NOT_FOUND, "Order not found");
        };
        if !matches!(order.status.as_str(), "pending" | "confirmed") {
            return fail(StatusCode::BAD_REQUEST, "Order can no longer be cancelled");
        }
        order.status = "cancelled".to_string();
        ok(order_json(order))
    })
}

// =============================================================================
// Addresses
// =============================================================================

async fn list_addresses(State(data): State<Shared>, headers: HeaderMap) -> Response {
    with_user(&data, &headers, |data, _, user_id| {
        ok(Value::from(
            data.addresses.get(&user_id).cloned().unwrap_or_default(),
        ))
    })
}

async fn create_address(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    with_user(&data, &headers, |data, _, user_id| {
        let id = data.next_id();
        body["id"] = Value::from(id);
        let list = data.addresses.entry(user_id).or_default();
        let make_default = list.is_empty() || body["isDefault"] == true;
        if make_default {
            for address in list.iter_mut() {
                address["isDefault"] = Value::Bool(false);
            }
        }
        body["isDefault"] = Value::Bool(make_default);
        list.push(body.clone());
        ok(body)
    })
}

async fn update_address(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i32>,
    Json(mut body): Json<Value>,
) -> Response {
    with_user(&data, &headers, |data, _, user_id| {
        let list = data.addresses.entry(user_id).or_default();
        let Some(address) = list.iter_mut().find(|a| a["id"] == id) else {
            return fail(StatusCode::NOT_FOUND, "Address not found");
        };
        body["id"] = Value::from(id);
        *address = body.clone();
        ok(body)
    })
}

async fn delete_address(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Response {
    with_user(&data, &headers, |data, _, user_id| {
        let list = data.addresses.entry(user_id).or_default();
        list.retain(|a| a["id"] != id);
        ok(Value::Null)
    })
}

async fn default_address(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Response {
    with_user(&data, &headers, |data, _, user_id| {
        let list = data.addresses.entry(user_id).or_default();
        if !list.iter().any(|a| a["id"] == id) {
            return fail(StatusCode::NOT_FOUND, "Address not found");
        }
        for address in list.iter_mut() {
            let is_default = address["id"] == id;
            address["isDefault"] = Value::Bool(is_default);
        }
        ok(Value::Null)
    })
}

// =============================================================================
// Admin
// =============================================================================

async fn admin_stats(State(data): State<Shared>, headers: HeaderMap) -> Response {
    with_admin(&data, &headers, |data| {
        let pending = data.orders.iter().filter(|o| o.status == "pending").count();
        let completed = data
            .orders
            .iter()
            .filter(|o| o.status == "completed")
            .count();
        ok(json!({
            "totalOrders": data.orders.len(),
            "pendingOrders": pending,
            "completedOrders": completed,
            "totalRevenue": 0,
            "totalCustomers": data.users.iter().filter(|u| !u.admin).count(),
        }))
    })
}

#[derive(Debug, Deserialize)]
struct StatusQuery {
    status: Option<String>,
}

async fn admin_orders(
    State(data): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<StatusQuery>,
) -> Response {
    with_admin(&data, &headers, |data| {
        let orders: Vec<Value> = data
            .orders
            .iter()
            .filter(|o| query.status.as_ref().is_none_or(|s| &o.status == s))
            .map(order_json)
            .collect();
        ok(Value::from(orders))
    })
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: String,
}

async fn admin_order_status(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i32>,
    Json(body): Json<StatusBody>,
) -> Response {
    with_admin(&data, &headers, |data| {
        let Some(order) = data.orders.iter_mut().find(|o| o.id == id) else {
            return fail(StatusCode::NOT_FOUND, "Order not found");
        };
        order.status = body.status;
        ok(order_json(order))
    })
}

async fn admin_contact_settings(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    with_admin(&data, &headers, |data| {
        data.contact = body.clone();
        ok(body)
    })
}

async fn admin_create_category(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    with_admin(&data, &headers, |data| {
        if data.categories.iter().any(|c| c["slug"] == body["slug"]) {
            return fail(StatusCode::UNPROCESSABLE_ENTITY, "Slug already exists");
        }
        body["id"] = Value::from(data.next_id());
        data.categories.push(body.clone());
        ok(body)
    })
}
