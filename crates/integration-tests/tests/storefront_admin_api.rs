//! Admin JSON API: access control and the `{ success, data?, error? }` envelope.

#![allow(clippy::unwrap_used)]

use chrono::{Days, Local};
use handyhub_integration_tests::{ADMIN_EMAIL, CUSTOMER_EMAIL, TestContext};
use reqwest::StatusCode;
use serde_json::{Value, json};

async fn json_body(response: reqwest::Response) -> Value {
    serde_json::from_str(&response.text().await.unwrap()).unwrap()
}

#[tokio::test]
async fn test_requires_admin() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.get("/admin/api/stats").await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["success"], false);

    ctx.sign_in(CUSTOMER_EMAIL).await.unwrap();
    let response = ctx.get("/admin/api/stats").await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(response).await["success"], false);
}

#[tokio::test]
async fn test_stats_and_order_status_updates() {
    let ctx = TestContext::new().await.unwrap();

    // A customer books something first.
    ctx.htmx_post("/cart/add", &[("service_id", "11")]).await.unwrap();
    ctx.sign_in(CUSTOMER_EMAIL).await.unwrap();
    let tomorrow = Local::now()
        .date_naive()
        .checked_add_days(Days::new(1))
        .unwrap()
        .format("%Y-%m-%d")
        .to_string();
    let response = ctx
        .post_form(
            "/checkout",
            &[
                ("address_id", "501"),
                ("scheduled_date", tomorrow.as_str()),
                ("time_slot", "14:00 - 16:00"),
                ("payment_method", "cash"),
            ],
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    ctx.post_form("/auth/logout", &[]).await.unwrap();

    ctx.sign_in(ADMIN_EMAIL).await.unwrap();

    let stats = json_body(ctx.get("/admin/api/stats").await.unwrap()).await;
    assert_eq!(stats["success"], true);
    assert_eq!(stats["data"]["totalOrders"], 1);
    assert_eq!(stats["data"]["pendingOrders"], 1);

    let orders = json_body(ctx.get("/admin/api/orders?status=pending").await.unwrap()).await;
    let id = orders["data"][0]["id"].as_i64().unwrap();

    let response = ctx
        .client
        .put(ctx.url(&format!("/admin/api/orders/{id}/status")))
        .json(&json!({"status": "confirmed"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await;
    assert_eq!(updated["data"]["status"], "confirmed");

    let pending = json_body(ctx.get("/admin/api/orders?status=pending").await.unwrap()).await;
    assert_eq!(pending["data"], json!([]));
}

#[tokio::test]
async fn test_backend_rejections_keep_the_envelope() {
    let ctx = TestContext::new().await.unwrap();
    ctx.sign_in(ADMIN_EMAIL).await.unwrap();

    let response = ctx
        .client
        .post(ctx.url("/admin/api/categories"))
        .json(&json!({"name": "Cleaning", "slug": "cleaning", "isActive": true}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Slug already exists");

}

#[tokio::test]
async fn test_malformed_requests_keep_the_envelope() {
    let ctx = TestContext::new().await.unwrap();
    ctx.sign_in(ADMIN_EMAIL).await.unwrap();

    let response = ctx
        .client
        .put(ctx.url("/admin/api/orders/abc/status"))
        .json(&json!({"status": "confirmed"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(
        response.headers()[reqwest::header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("application/json")
    );
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(!body["error"].as_str().unwrap().is_empty());

    let response = ctx
        .client
        .post(ctx.url("/admin/api/categories"))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["success"], false);

    // Well-formed JSON with the wrong shape.
    let response = ctx
        .client
        .put(ctx.url("/admin/api/orders/1/status"))
        .json(&json!({"status": "teleported"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(response).await["success"], false);

    let response = ctx.get("/admin/api/orders?status=lost").await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["success"], false);
}

#[tokio::test]
async fn test_category_writes_refresh_cached_pages() {
    let ctx = TestContext::new().await.unwrap();
    ctx.sign_in(ADMIN_EMAIL).await.unwrap();

    // Warm the catalog cache first.
    let page = ctx.get("/categories").await.unwrap().text().await.unwrap();
    assert!(page.contains("/categories/cleaning"));
    assert!(!page.contains("/categories/pest-control"));

    let response = ctx
        .client
        .post(ctx.url("/admin/api/categories"))
        .json(&json!({"name": "Pest Control", "slug": "pest-control", "isActive": true}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["data"]["slug"], "pest-control");

    let page = ctx.get("/categories").await.unwrap().text().await.unwrap();
    assert!(page.contains("/categories/pest-control"));
}

#[tokio::test]
async fn test_contact_settings_writes_refresh_cached_pages() {
    let ctx = TestContext::new().await.unwrap();
    ctx.sign_in(ADMIN_EMAIL).await.unwrap();

    let page = ctx.get("/contact").await.unwrap().text().await.unwrap();
    assert!(page.contains("8 AM to 8 PM, all days"));

    let response = ctx
        .client
        .put(ctx.url("/admin/api/settings/contact"))
        .json(&json!({
            "phone": "+91 98765 43210",
            "email": "help@handyhub.in",
            "workingHours": "7 AM to 9 PM, Monday to Saturday",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], "help@handyhub.in");

    let page = ctx.get("/contact").await.unwrap().text().await.unwrap();
    assert!(page.contains("7 AM to 9 PM, Monday to Saturday"));
    assert!(!page.contains("8 AM to 8 PM, all days"));
}

#[tokio::test]
async fn test_unknown_admin_path() {
    let ctx = TestContext::new().await.unwrap();
    ctx.sign_in(ADMIN_EMAIL).await.unwrap();

    let response = ctx.get("/admin/api/nope").await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "Not found");
}
