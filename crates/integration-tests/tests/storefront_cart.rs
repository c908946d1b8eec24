//! Storefront cart, coupon and quantity guard, end to end.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use reqwest::StatusCode;
use vitrine_integration_tests::{StubPlatform, browser, expired_coupon_message, spawn_storefront};

const OAK: &str = "/s/oak-and-pine";
const LITTLE: &str = "/s/little-ones";

async fn setup() -> (StubPlatform, String, reqwest::Client) {
    let stub = StubPlatform::start().await;
    let base = spawn_storefront(&stub).await;
    (stub, base, browser())
}

async fn post_form(client: &reqwest::Client, url: String, form: &[(&str, &str)]) -> (StatusCode, String) {
    let response = client.post(url).form(form).send().await.unwrap();
    let status = response.status();
    (status, response.text().await.unwrap())
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_catalog_renders_with_store_theme() {
    let (_stub, base, client) = setup().await;

    let response = client.get(format!("{base}{OAK}")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let csp = response
        .headers()
        .get("content-security-policy")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(csp.contains("'nonce-"));

    let body = response.text().await.unwrap();
    assert!(body.contains("theme-furniture"));
    assert!(body.contains("Oak Chair"));
    assert!(body.contains("$100.00"));
    assert!(body.contains("$120.00"));
}

#[tokio::test]
async fn test_unknown_store_is_not_found() {
    let (_stub, base, client) = setup().await;
    let response = client.get(format!("{base}/s/nowhere")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_and_readiness() {
    let (_stub, base, client) = setup().await;
    let health = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    let ready = client.get(format!("{base}/health/ready")).send().await.unwrap();
    assert_eq!(ready.status(), StatusCode::OK);
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_add_returns_count_and_trigger() {
    let (_stub, base, client) = setup().await;

    let response = client
        .post(format!("{base}{OAK}/cart/add"))
        .form(&[("product_id", "10"), ("quantity", "2")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("hx-trigger").and_then(|v| v.to_str().ok()),
        Some("cart-updated")
    );
    let body = response.text().await.unwrap();
    assert!(body.contains(">2<"));

    let page = client
        .get(format!("{base}{OAK}/cart"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Oak Chair"));
    assert!(page.contains("$200.00"));
}

#[tokio::test]
async fn test_quantity_is_capped_at_stock_and_clamped_to_one() {
    let (_stub, base, client) = setup().await;
    post_form(&client, format!("{base}{OAK}/cart/add"), &[("product_id", "10")]).await;

    let (status, body) = post_form(
        &client,
        format!("{base}{OAK}/cart/update"),
        &[("item_id", "100"), ("quantity", "9")],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("$300.00"));

    // The furniture theme keeps the line at one
    let (_, body) = post_form(
        &client,
        format!("{base}{OAK}/cart/update"),
        &[("item_id", "100"), ("quantity", "0")],
    )
    .await;
    assert!(body.contains("Oak Chair"));
    assert!(body.contains("<span class=\"quantity\">1</span>"));
}

#[tokio::test]
async fn test_baby_kids_theme_removes_line_below_one() {
    let (_stub, base, client) = setup().await;
    post_form(&client, format!("{base}{LITTLE}/cart/add"), &[("product_id", "10")]).await;

    let (status, body) = post_form(
        &client,
        format!("{base}{LITTLE}/cart/update"),
        &[("item_id", "100"), ("quantity", "0")],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains("Oak Chair"));
    assert!(body.contains("Continue shopping"));
}

#[tokio::test]
async fn test_unknown_line_shows_notice() {
    let (_stub, base, client) = setup().await;
    post_form(&client, format!("{base}{OAK}/cart/add"), &[("product_id", "11")]).await;

    let (status, body) = post_form(
        &client,
        format!("{base}{OAK}/cart/update"),
        &[("item_id", "999"), ("quantity", "2")],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("That item is no longer in your cart."));
    assert!(body.contains("Pine Shelf"));
}

#[tokio::test]
async fn test_carts_are_separate_per_store() {
    let (_stub, base, client) = setup().await;
    post_form(&client, format!("{base}{OAK}/cart/add"), &[("product_id", "10")]).await;

    let other = client
        .get(format!("{base}{LITTLE}/cart/count"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!other.contains("count-badge"));

    let own = client
        .get(format!("{base}{OAK}/cart/count"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(own.contains(">1<"));
}

#[tokio::test]
async fn test_expired_cart_starts_over() {
    let (stub, base, client) = setup().await;
    post_form(&client, format!("{base}{OAK}/cart/add"), &[("product_id", "10")]).await;
    stub.expire_carts();

    let count = client
        .get(format!("{base}{OAK}/cart/count"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!count.contains("count-badge"));

    let (status, body) =
        post_form(&client, format!("{base}{OAK}/cart/add"), &[("product_id", "11")]).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(">1<"));
}

// =============================================================================
// Coupon
// =============================================================================

#[tokio::test]
async fn test_coupon_toggles_without_revalidating() {
    let (stub, base, client) = setup().await;
    post_form(
        &client,
        format!("{base}{OAK}/cart/add"),
        &[("product_id", "10"), ("quantity", "2")],
    )
    .await;

    let coupon = format!("{base}{OAK}/cart/coupon");
    let (_, applied) = post_form(&client, coupon.clone(), &[("code", "SAVE20")]).await;
    assert!(applied.contains("Coupon SAVE20 applied"));
    assert!(applied.contains("-$20.00"));
    assert_eq!(stub.coupon_checks(), 1);

    let (_, removed) = post_form(&client, coupon.clone(), &[("code", "SAVE20")]).await;
    assert!(removed.contains("Coupon removed"));
    assert!(!removed.contains("-$20.00"));
    assert_eq!(stub.coupon_checks(), 1);
}

#[tokio::test]
async fn test_rejected_coupon_shows_platform_message() {
    let (stub, base, client) = setup().await;
    post_form(&client, format!("{base}{OAK}/cart/add"), &[("product_id", "10")]).await;

    let (status, body) = post_form(
        &client,
        format!("{base}{OAK}/cart/coupon"),
        &[("code", "BOGUS")],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Coupon not found"));
    assert!(!body.contains("Discount"));
    assert_eq!(stub.coupon_checks(), 1);
}

#[tokio::test]
async fn test_long_coupon_rejection_is_shown_in_full() {
    let (stub, base, client) = setup().await;
    post_form(&client, format!("{base}{OAK}/cart/add"), &[("product_id", "10")]).await;

    let message = expired_coupon_message();
    assert!(message.len() > 500);
    let (status, body) = post_form(
        &client,
        format!("{base}{OAK}/cart/coupon"),
        &[("code", "WINTER19")],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(&message));
    assert!(!body.contains("Please try again"));
    assert_eq!(stub.coupon_checks(), 1);
}

#[tokio::test]
async fn test_empty_coupon_code_is_not_sent() {
    let (stub, base, client) = setup().await;
    post_form(&client, format!("{base}{OAK}/cart/add"), &[("product_id", "10")]).await;

    let (status, body) =
        post_form(&client, format!("{base}{OAK}/cart/coupon"), &[("code", "   ")]).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("notice-error"));
    assert_eq!(stub.coupon_checks(), 0);
}

#[tokio::test]
async fn test_clearing_cart_drops_coupon() {
    let (_stub, base, client) = setup().await;
    post_form(&client, format!("{base}{OAK}/cart/add"), &[("product_id", "10")]).await;
    post_form(&client, format!("{base}{OAK}/cart/coupon"), &[("code", "SAVE20")]).await;

    let (_, cleared) = post_form(&client, format!("{base}{OAK}/cart/clear"), &[]).await;
    assert!(cleared.contains("No pieces selected yet."));

    post_form(&client, format!("{base}{OAK}/cart/add"), &[("product_id", "10")]).await;
    let page = client
        .get(format!("{base}{OAK}/cart"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Oak Chair"));
    assert!(!page.contains("-$20.00"));
}
