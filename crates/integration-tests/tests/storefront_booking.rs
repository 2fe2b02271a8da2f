//! Sign-in, the address book, checkout and order history.

#![allow(clippy::unwrap_used)]

use chrono::{Days, Local};
use handyhub_integration_tests::{CUSTOMER_EMAIL, TestContext, location};
use reqwest::StatusCode;

fn date_from_today(days: i64) -> String {
    let today = Local::now().date_naive();
    let date = if days >= 0 {
        today.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        today.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    date.unwrap().format("%Y-%m-%d").to_string()
}

/// Order id from a `/orders/{id}?placed=1` redirect.
fn order_id(location: &str) -> i32 {
    location
        .trim_start_matches("/orders/")
        .split('?')
        .next()
        .unwrap()
        .parse()
        .unwrap()
}

#[tokio::test]
async fn test_protected_pages_redirect_to_login() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.get("/checkout").await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response).as_deref(),
        Some("/auth/login?next=%2Fcheckout")
    );

    // Nested routes return to their full path.
    let response = ctx.get("/account/addresses").await.unwrap();
    assert_eq!(
        location(&response).as_deref(),
        Some("/auth/login?next=%2Faccount%2Faddresses")
    );
}

#[tokio::test]
async fn test_login_failure_and_success() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .post_form(
            "/auth/login",
            &[("email", CUSTOMER_EMAIL), ("password", "wrong-password")],
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.text().await.unwrap().contains("Incorrect email or password."));

    let response = ctx
        .post_form(
            "/auth/login",
            &[
                ("email", CUSTOMER_EMAIL),
                ("password", handyhub_integration_tests::PASSWORD),
                ("next", "/orders"),
            ],
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/orders"));

    let home = ctx.get("/").await.unwrap().text().await.unwrap();
    assert!(home.contains("Sign out (Asha)"));

    let response = ctx.post_form("/auth/logout", &[]).await.unwrap();
    assert_eq!(location(&response).as_deref(), Some("/"));
    let response = ctx.get("/orders").await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_register_signs_in() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .post_form(
            "/auth/register",
            &[
                ("name", "Kiran Das"),
                ("email", "kiran@example.in"),
                ("phone", ""),
                ("password", "long-enough-1"),
                ("password_confirm", "long-enough-2"),
            ],
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.text().await.unwrap().contains("Passwords do not match."));

    let response = ctx
        .post_form(
            "/auth/register",
            &[
                ("name", "Kiran Das"),
                ("email", "kiran@example.in"),
                ("password", "long-enough-1"),
                ("password_confirm", "long-enough-1"),
                ("next", "/account/addresses"),
            ],
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/account/addresses"));

    let page = ctx.get("/account/addresses").await.unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    assert!(page.text().await.unwrap().contains("No saved addresses yet."));
}

#[tokio::test]
async fn test_address_book() {
    let ctx = TestContext::new().await.unwrap();
    ctx.sign_in(CUSTOMER_EMAIL).await.unwrap();

    let mut form = vec![
        ("label", "Office"),
        ("full_name", "Asha Rao"),
        ("phone", "98765 43210"),
        ("address_line1", "Prestige Tech Park"),
        ("city", "Bengaluru"),
        ("state", "Karnataka"),
        ("pincode", "5600"),
    ];
    let response = ctx.post_form("/account/addresses", &form).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.text().await.unwrap();
    assert!(body.contains("Pincode must be 6 digits"));
    // The form keeps what was typed.
    assert!(body.contains("value=\"Prestige Tech Park\""));

    form.pop();
    form.push(("pincode", "560103"));
    let response = ctx.post_form("/account/addresses", &form).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response).as_deref(),
        Some("/account/addresses?saved=1")
    );

    let page = ctx
        .get("/account/addresses?saved=1")
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Address book updated"));
    assert!(page.contains("Prestige Tech Park"));
    assert!(page.contains("12 MG Road"));

    let response = ctx
        .post_form("/account/addresses/501/delete", &[])
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let page = ctx.get("/account/addresses").await.unwrap().text().await.unwrap();
    assert!(!page.contains("12 MG Road"));
}

#[tokio::test]
async fn test_checkout_with_empty_cart_goes_back_to_cart() {
    let ctx = TestContext::new().await.unwrap();
    ctx.sign_in(CUSTOMER_EMAIL).await.unwrap();

    let response = ctx.get("/checkout").await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/cart"));
}

#[tokio::test]
async fn test_book_view_and_cancel_order() {
    let ctx = TestContext::new().await.unwrap();

    // Guest cart carries over into the signed-in session.
    ctx.htmx_post("/cart/add", &[("service_id", "10")]).await.unwrap();
    ctx.sign_in(CUSTOMER_EMAIL).await.unwrap();

    let page = ctx.get("/checkout").await.unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    let page = page.text().await.unwrap();
    assert!(page.contains("12 MG Road"));
    assert!(page.contains("value=\"501\" checked"));
    assert!(page.contains("<dd id=\"cart-total\">₹1999.00</dd>"));

    let yesterday = date_from_today(-1);
    let response = ctx
        .post_form(
            "/checkout",
            &[
                ("address_id", "501"),
                ("scheduled_date", yesterday.as_str()),
                ("time_slot", "10:00 - 12:00"),
                ("payment_method", "cash"),
            ],
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response
        .text()
        .await
        .unwrap()
        .contains("Please choose a date that is not in the past"));

    let tomorrow = date_from_today(1);
    let response = ctx
        .post_form(
            "/checkout",
            &[
                ("address_id", "501"),
                ("scheduled_date", tomorrow.as_str()),
                ("time_slot", "10:00 - 12:00"),
                ("payment_method", "cash"),
                ("notes", "Please bring a ladder"),
            ],
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let confirmation = location(&response).unwrap();
    assert!(confirmation.ends_with("?placed=1"));
    let id = order_id(&confirmation);

    let page = ctx.get(&confirmation).await.unwrap().text().await.unwrap();
    assert!(page.contains(&format!("Your booking HH{id} is confirmed")));
    assert!(page.contains("10:00 - 12:00"));
    assert!(page.contains("Please bring a ladder"));
    assert!(page.contains(&format!("action=\"/orders/{id}/cancel\"")));

    // The backend empties the cart once the order exists.
    let badge = ctx.get("/cart/count").await.unwrap().text().await.unwrap();
    assert!(badge.contains(">0<"));

    let history = ctx.get("/orders").await.unwrap().text().await.unwrap();
    assert!(history.contains(&format!("HH{id}")));
    assert!(history.contains("1 total"));

    let response = ctx
        .post_form(&format!("/orders/{id}/cancel"), &[])
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(ctx.backend.data().order_status(id), Some("cancelled"));

    let history = ctx.get("/orders").await.unwrap().text().await.unwrap();
    assert!(history.contains("1 total &middot; 0 upcoming"));
    assert!(history.contains(">Cancelled: 1</li>"));
    assert!(!history.contains(">Pending: "));

    let page = ctx.get(&format!("/orders/{id}")).await.unwrap().text().await.unwrap();
    assert!(!page.contains(&format!("action=\"/orders/{id}/cancel\"")));
}

#[tokio::test]
async fn test_cancel_rejected_once_work_has_started() {
    let ctx = TestContext::new().await.unwrap();
    ctx.htmx_post("/cart/add", &[("service_id", "20")]).await.unwrap();
    ctx.sign_in(CUSTOMER_EMAIL).await.unwrap();

    let tomorrow = date_from_today(1);
    let response = ctx
        .post_form(
            "/checkout",
            &[
                ("address_id", "501"),
                ("scheduled_date", tomorrow.as_str()),
                ("time_slot", "08:00 - 10:00"),
                ("payment_method", "online"),
            ],
        )
        .await
        .unwrap();
    let id = order_id(&location(&response).unwrap());

    ctx.backend.data().set_order_status(id, "in_progress");

    let response = ctx
        .post_form(&format!("/orders/{id}/cancel"), &[])
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response
        .text()
        .await
        .unwrap()
        .contains("Order can no longer be cancelled"));
}

#[tokio::test]
async fn test_other_customers_orders_are_not_found() {
    let ctx = TestContext::new().await.unwrap();
    ctx.sign_in(CUSTOMER_EMAIL).await.unwrap();

    let response = ctx.get("/orders/99999").await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_expired_backend_session_signs_visitor_out() {
    let ctx = TestContext::new().await.unwrap();
    ctx.sign_in(CUSTOMER_EMAIL).await.unwrap();
    assert_eq!(ctx.get("/orders").await.unwrap().status(), StatusCode::OK);

    ctx.backend.data().expire_sessions();

    let response = ctx.get("/orders").await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/auth/login"));

    // The login form renders instead of bouncing back to home.
    let response = ctx.get("/auth/login").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("action=\"/auth/login\""));
    assert!(!body.contains("Sign out (Asha)"));

    let response = ctx.get("/orders").await.unwrap();
    assert_eq!(
        location(&response).as_deref(),
        Some("/auth/login?next=%2Forders")
    );

    let response = ctx.sign_in(CUSTOMER_EMAIL).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(ctx.get("/orders").await.unwrap().status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_page_detects_expiry_on_its_own() {
    let ctx = TestContext::new().await.unwrap();
    ctx.sign_in(CUSTOMER_EMAIL).await.unwrap();

    // A live backend session skips the form.
    let response = ctx.get("/auth/login?next=/orders").await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/orders"));

    ctx.backend.data().expire_sessions();

    let response = ctx.get("/auth/login?next=/orders").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("action=\"/auth/login\""));

    let response = ctx.get("/auth/register").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_expired_session_during_checkout_returns_to_login() {
    let ctx = TestContext::new().await.unwrap();
    ctx.sign_in(CUSTOMER_EMAIL).await.unwrap();
    ctx.htmx_post("/cart/add", &[("service_id", "10")])
        .await
        .unwrap();

    ctx.backend.data().expire_sessions();

    let response = ctx.get("/checkout").await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response).as_deref(),
        Some("/auth/login?next=%2Fcheckout")
    );
    assert_eq!(ctx.get("/auth/login").await.unwrap().status(), StatusCode::OK);
}

#[tokio::test]
async fn test_failed_cancel_still_settles_backend_session() {
    let ctx = TestContext::new().await.unwrap();
    ctx.sign_in(CUSTOMER_EMAIL).await.unwrap();

    let response = ctx.post_form("/orders/99999/cancel", &[]).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    // The backend session survives the failed call.
    assert_eq!(ctx.get("/orders").await.unwrap().status(), StatusCode::OK);

    ctx.backend.data().expire_sessions();

    let response = ctx.post_form("/orders/99999/cancel", &[]).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/auth/login"));
    assert_eq!(ctx.get("/auth/login").await.unwrap().status(), StatusCode::OK);
}
