//! Catalog pages, search and the health endpoints.

#![allow(clippy::unwrap_used)]

use handyhub_integration_tests::{TestContext, location};
use reqwest::StatusCode;

#[tokio::test]
async fn test_health_endpoints() {
    let ctx = TestContext::new().await.unwrap();

    let live = ctx.get("/health").await.unwrap();
    assert_eq!(live.status(), StatusCode::OK);
    assert_eq!(live.text().await.unwrap(), "ok");

    let ready = ctx.get("/health/ready").await.unwrap();
    assert_eq!(ready.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_home_lists_active_categories() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.get("/").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("content-security-policy"));
    assert!(response.headers().contains_key("x-request-id"));

    let body = response.text().await.unwrap();
    assert!(body.contains("/categories/cleaning"));
    assert!(body.contains("/categories/plumbing"));
    assert!(!body.contains("/categories/painting"));
    // Layout pulls support details from the contact settings.
    assert!(body.contains("support@handyhub.in"));
}

#[tokio::test]
async fn test_category_page_and_subcategory_filter() {
    let ctx = TestContext::new().await.unwrap();

    let body = ctx.get("/categories/cleaning").await.unwrap().text().await.unwrap();
    assert!(body.contains("Deep Home Cleaning"));
    assert!(body.contains("Bathroom Cleaning"));
    assert!(!body.contains("Tap Repair"));

    let body = ctx
        .get("/categories/cleaning?sub=bathroom")
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Bathroom Cleaning"));
    assert!(!body.contains("Deep Home Cleaning"));
}

#[tokio::test]
async fn test_unknown_and_inactive_pages_are_not_found() {
    let ctx = TestContext::new().await.unwrap();

    let missing = ctx.get("/categories/gardening").await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let inactive_category = ctx.get("/categories/painting").await.unwrap();
    assert_eq!(inactive_category.status(), StatusCode::NOT_FOUND);

    let inactive_service = ctx.get("/services/geyser-installation").await.unwrap();
    assert_eq!(inactive_service.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_service_page_shows_discounted_price() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.get("/services/deep-home-cleaning").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("₹1999.00"));
    assert!(body.contains("₹2499.00"));
    assert!(body.contains("name=\"service_id\" value=\"10\""));
}

#[tokio::test]
async fn test_search_matches_names() {
    let ctx = TestContext::new().await.unwrap();

    let body = ctx.get("/search?q=CLEAN").await.unwrap().text().await.unwrap();
    assert!(body.contains("Deep Home Cleaning"));
    assert!(body.contains("Bathroom Cleaning"));
    assert!(!body.contains("Tap Repair"));

    let body = ctx.get("/search?q=geyser").await.unwrap().text().await.unwrap();
    assert!(!body.contains("Geyser Installation"));
}

#[tokio::test]
async fn test_trailing_slash_is_normalized() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.get("/categories/").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_offers_list_popular_first() {
    let ctx = TestContext::new().await.unwrap();

    let body = ctx.get("/offers").await.unwrap().text().await.unwrap();
    let popular = body.find("Home Care Plus").unwrap();
    let basic = body.find("Basic Care").unwrap();
    assert!(popular < basic);
}

#[tokio::test]
async fn test_offer_detail_page() {
    let ctx = TestContext::new().await.unwrap();

    let list = ctx.get("/offers").await.unwrap().text().await.unwrap();
    assert!(list.contains("href=\"/offers/2\""));

    let response = ctx.get("/offers/2").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("<h1>Home Care Plus</h1>"));
    assert!(body.contains("₹2999.00"));
    assert!(body.contains("You save ₹1000.00"));
    assert!(body.contains("<li>Free plumbing visit</li>"));

    let response = ctx.get("/offers/99").await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_contact_form_reaches_backend() {
    let ctx = TestContext::new().await.unwrap();

    let page = ctx.get("/contact").await.unwrap().text().await.unwrap();
    assert!(page.contains("8 AM to 8 PM, all days"));

    let response = ctx
        .post_form(
            "/contact",
            &[
                ("name", "Ravi Kumar"),
                ("email", "ravi@example.in"),
                ("phone", ""),
                ("message", "Do you service Whitefield?"),
            ],
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/contact?sent=1"));

    let messages = ctx.backend.data().contact_messages().to_vec();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["email"], "ravi@example.in");
    assert!(messages[0].get("phone").is_none());
}

#[tokio::test]
async fn test_contact_form_rejects_bad_email() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .post_form(
            "/contact",
            &[("name", "Ravi"), ("email", "not-an-email"), ("message", "Hello")],
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(ctx.backend.data().contact_messages().is_empty());
}

#[tokio::test]
async fn test_contact_posts_are_rate_limited() {
    let ctx = TestContext::new().await.unwrap();

    let mut limited = false;
    for _ in 0..40 {
        let response = ctx
            .post_form(
                "/contact",
                &[("name", "Ravi"), ("email", "not-an-email"), ("message", "Hello")],
            )
            .await
            .unwrap();
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            limited = true;
            break;
        }
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
    assert!(limited);

    // Reading the page is not limited.
    assert_eq!(ctx.get("/contact").await.unwrap().status(), StatusCode::OK);
}
