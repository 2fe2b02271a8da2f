//! Cart fragments, the count badge and coupons, for a guest visitor.

#![allow(clippy::unwrap_used)]

use handyhub_integration_tests::{TestContext, location};
use reqwest::StatusCode;

/// `item_id` of the first cart line rendered for `service_name`.
fn item_id_for(body: &str, service_name: &str) -> String {
    let row = &body[body.find(service_name).unwrap()..];
    let marker = "name=\"item_id\" value=\"";
    let start = row.find(marker).unwrap() + marker.len();
    let end = row[start..].find('"').unwrap();
    row[start..start + end].to_string()
}

async fn add(ctx: &TestContext, service_id: &str, quantity: &str) -> reqwest::Response {
    ctx.htmx_post("/cart/add", &[("service_id", service_id), ("quantity", quantity)])
        .await
        .unwrap()
}

#[tokio::test]
async fn test_badge_counts_total_quantity() {
    let ctx = TestContext::new().await.unwrap();

    let response = add(&ctx, "10", "1").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("hx-trigger").unwrap(),
        "cart-updated"
    );
    assert!(response.text().await.unwrap().contains("<span id=\"cart-count\">1</span>"));

    let response = add(&ctx, "11", "2").await;
    assert!(response.text().await.unwrap().contains("<span id=\"cart-count\">3</span>"));

    let badge = ctx.get("/cart/count").await.unwrap().text().await.unwrap();
    assert!(badge.contains("<span id=\"cart-count\">3</span>"));
}

#[tokio::test]
async fn test_cart_page_shows_backend_totals() {
    let ctx = TestContext::new().await.unwrap();
    add(&ctx, "10", "1").await;
    add(&ctx, "11", "2").await;

    let body = ctx.get("/cart").await.unwrap().text().await.unwrap();
    assert!(body.contains("Deep Home Cleaning"));
    assert!(body.contains("<dd id=\"cart-subtotal\">₹2997.00</dd>"));
    assert!(body.contains("<dd id=\"cart-total\">₹2997.00</dd>"));
    assert!(!body.contains("id=\"cart-discount\""));
}

#[tokio::test]
async fn test_plain_form_add_redirects_to_cart() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .post_form("/cart/add", &[("service_id", "20")])
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/cart"));

    let badge = ctx.get("/cart/count").await.unwrap().text().await.unwrap();
    assert!(badge.contains(">1<"));
}

#[tokio::test]
async fn test_unavailable_service_shows_reason() {
    let ctx = TestContext::new().await.unwrap();

    let response = add(&ctx, "21", "1").await;
    // User-facing rejections stay 2xx so HTMX swaps the message in.
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("hx-trigger").is_none());
    assert!(response.text().await.unwrap().contains("Service is not available"));
}

#[tokio::test]
async fn test_update_and_remove_lines() {
    let ctx = TestContext::new().await.unwrap();
    add(&ctx, "10", "1").await;
    add(&ctx, "20", "1").await;

    let page = ctx.get("/cart").await.unwrap().text().await.unwrap();
    let tap = item_id_for(&page, "Tap Repair");

    let fragment = ctx
        .htmx_post("/cart/update", &[("item_id", tap.as_str()), ("quantity", "3")])
        .await
        .unwrap();
    assert_eq!(fragment.headers().get("hx-trigger").unwrap(), "cart-updated");
    let fragment = fragment.text().await.unwrap();
    assert!(fragment.starts_with("<div id=\"cart-items\">"));
    assert!(fragment.contains("<dd id=\"cart-total\">₹2596.00</dd>"));

    let fragment = ctx
        .htmx_post("/cart/update", &[("item_id", tap.as_str()), ("quantity", "0")])
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!fragment.contains("Tap Repair"));
    assert!(fragment.contains("<dd id=\"cart-total\">₹1999.00</dd>"));

    let deep = item_id_for(&fragment, "Deep Home Cleaning");
    let fragment = ctx
        .htmx_post("/cart/remove", &[("item_id", deep.as_str())])
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(fragment.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_coupon_apply_and_remove() {
    let ctx = TestContext::new().await.unwrap();
    add(&ctx, "10", "1").await;
    add(&ctx, "11", "2").await;

    let fragment = ctx
        .htmx_post("/cart/coupon", &[("code", " save20 ")])
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(fragment.contains("Coupon SAVE20 applied"));
    // 20% of 2997 is capped at 300.
    assert!(fragment.contains("<dd id=\"cart-discount\">-₹300.00</dd>"));
    assert!(fragment.contains("<dd id=\"cart-total\">₹2697.00</dd>"));

    let fragment = ctx
        .htmx_post("/cart/coupon/remove", &[])
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(fragment.contains("Coupon removed"));
    assert!(fragment.contains("<dd id=\"cart-total\">₹2997.00</dd>"));
}

#[tokio::test]
async fn test_rejected_coupons_keep_the_cart() {
    let ctx = TestContext::new().await.unwrap();
    add(&ctx, "20", "1").await;

    let response = ctx
        .htmx_post("/cart/coupon", &[("code", "FIRST100")])
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fragment = response.text().await.unwrap();
    assert!(fragment.contains("Minimum order amount is 500"));
    assert!(fragment.contains("<dd id=\"cart-total\">₹199.00</dd>"));

    let fragment = ctx
        .htmx_post("/cart/coupon", &[("code", "BOGUS")])
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(fragment.contains("Invalid coupon code"));

    let fragment = ctx
        .htmx_post("/cart/coupon", &[("code", "  ")])
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(fragment.contains("Please enter a coupon code"));
}

#[tokio::test]
async fn test_coupons_page_lists_live_coupons() {
    let ctx = TestContext::new().await.unwrap();

    let body = ctx.get("/coupons").await.unwrap().text().await.unwrap();
    assert!(body.contains("FIRST100"));
    assert!(body.contains("SAVE20"));
}

#[tokio::test]
async fn test_coupon_check_previews_without_applying() {
    let ctx = TestContext::new().await.unwrap();

    let fragment = ctx
        .htmx_post("/coupons/check", &[("code", "FIRST100")])
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(fragment.contains("Add a service to your cart to check this coupon"));

    add(&ctx, "10", "1").await;
    let response = ctx
        .htmx_post("/coupons/check", &[("code", "first100")])
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fragment = response.text().await.unwrap();
    assert!(fragment.contains("flash-success"));
    assert!(fragment.contains("FIRST100 saves ₹100.00; you would pay ₹1899.00"));

    // Checking never applies the coupon.
    let cart = ctx.get("/cart").await.unwrap().text().await.unwrap();
    assert!(!cart.contains("id=\"cart-discount\""));
    assert!(cart.contains("<dd id=\"cart-total\">₹1999.00</dd>"));
}

#[tokio::test]
async fn test_coupon_check_explains_rejections() {
    let ctx = TestContext::new().await.unwrap();
    add(&ctx, "20", "1").await;

    let fragment = ctx
        .htmx_post("/coupons/check", &[("code", "FIRST100")])
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(fragment.contains("flash-error"));
    assert!(fragment.contains("Minimum order amount is 500"));

    let response = ctx
        .htmx_post("/coupons/check", &[("code", "BOGUS")])
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Invalid coupon code"));
}

#[tokio::test]
async fn test_clear_cart_empties_every_line() {
    let ctx = TestContext::new().await.unwrap();
    add(&ctx, "10", "1").await;
    add(&ctx, "20", "2").await;

    let response = ctx.htmx_post("/cart/clear", &[]).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("hx-trigger").unwrap(),
        "cart-updated"
    );
    let fragment = response.text().await.unwrap();
    assert!(fragment.contains("Cart cleared"));
    assert!(fragment.contains("Your cart is empty"));
    assert_eq!(ctx.backend.data().cart_line_count(), 0);

    let badge = ctx.get("/cart/count").await.unwrap().text().await.unwrap();
    assert!(badge.contains("<span id=\"cart-count\">0</span>"));
}

#[tokio::test]
async fn test_plain_form_clear_redirects_to_cart() {
    let ctx = TestContext::new().await.unwrap();
    add(&ctx, "10", "1").await;

    let response = ctx.post_form("/cart/clear", &[]).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/cart"));

    let page = ctx.get("/cart").await.unwrap().text().await.unwrap();
    assert!(page.contains("Your cart is empty"));
}
