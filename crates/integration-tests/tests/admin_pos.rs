//! Operator sign-in and the POS register, end to end.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use reqwest::StatusCode;
use vitrine_integration_tests::{LOGIN_URL, OPERATOR_TOKEN, StubPlatform, browser, spawn_admin};

async fn signed_in() -> (StubPlatform, String, reqwest::Client) {
    let stub = StubPlatform::start().await;
    let base = spawn_admin(&stub).await;
    let client = browser();

    let response = client
        .get(format!("{base}/auth/callback?token={OPERATOR_TOKEN}"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers().get("location").and_then(|v| v.to_str().ok()),
        Some("/pos")
    );
    (stub, base, client)
}

async fn pos_post(client: &reqwest::Client, url: String, form: &[(&str, &str)]) -> String {
    let response = client.post(url).form(form).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response.text().await.unwrap()
}

// =============================================================================
// Sign-in
// =============================================================================

#[tokio::test]
async fn test_anonymous_page_redirects_to_login() {
    let stub = StubPlatform::start().await;
    let base = spawn_admin(&stub).await;

    let response = browser().get(format!("{base}/pos")).send().await.unwrap();
    assert!(response.status().is_redirection());
    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(location.starts_with(LOGIN_URL));
    assert!(location.contains("return_to="));
}

#[tokio::test]
async fn test_anonymous_json_request_is_unauthorized() {
    let stub = StubPlatform::start().await;
    let base = spawn_admin(&stub).await;

    let response = browser()
        .get(format!("{base}/media/list"))
        .header("accept", "application/json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rejected_operator_token() {
    let stub = StubPlatform::start().await;
    let base = spawn_admin(&stub).await;

    let response = browser()
        .get(format!("{base}/auth/callback?token=forged"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_is_public() {
    let stub = StubPlatform::start().await;
    let base = spawn_admin(&stub).await;

    let response = browser().get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Register
// =============================================================================

#[tokio::test]
async fn test_register_page_lists_products() {
    let (_stub, base, client) = signed_in().await;

    let response = client
        .get(format!("{base}/pos?store=oak-and-pine"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Grace Hopper"));
    assert!(body.contains("Oak Chair"));
    assert!(body.contains("Ada Lovelace"));
    assert!(body.contains("Walk-in customer"));
}

#[tokio::test]
async fn test_ring_up_adjust_and_clear() {
    let (_stub, base, client) = signed_in().await;
    let store = ("store", "oak-and-pine");

    let body = pos_post(
        &client,
        format!("{base}/pos/cart/add"),
        &[store, ("product_id", "10")],
    )
    .await;
    assert!(body.contains("Oak Chair"));
    assert!(body.contains("$100.00"));

    // Capped at the 3 in stock
    let body = pos_post(
        &client,
        format!("{base}/pos/cart/add"),
        &[store, ("product_id", "10"), ("quantity", "5")],
    )
    .await;
    assert!(body.contains("$300.00"));

    // Below one clamps, the line stays
    let body = pos_post(
        &client,
        format!("{base}/pos/cart/update"),
        &[store, ("item_id", "10"), ("quantity", "0")],
    )
    .await;
    assert!(body.contains("Oak Chair"));
    assert!(body.contains("value=\"1\""));

    // The register survives a page load
    let page = client
        .get(format!("{base}/pos?store=oak-and-pine"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Clear register"));

    let body = pos_post(&client, format!("{base}/pos/cart/clear"), &[store]).await;
    assert!(body.contains("No items rung up."));
}

#[tokio::test]
async fn test_missing_line_and_out_of_stock_notices() {
    let (_stub, base, client) = signed_in().await;
    let store = ("store", "oak-and-pine");

    let body = pos_post(
        &client,
        format!("{base}/pos/cart/update"),
        &[store, ("item_id", "99"), ("quantity", "2")],
    )
    .await;
    assert!(body.contains("That line is no longer in the register"));

    let body = pos_post(
        &client,
        format!("{base}/pos/cart/add"),
        &[store, ("product_id", "42")],
    )
    .await;
    assert!(body.contains("Product not found"));
}

#[tokio::test]
async fn test_unknown_store_refuses_add() {
    let (_stub, base, client) = signed_in().await;

    let body = pos_post(
        &client,
        format!("{base}/pos/cart/add"),
        &[("store", "nowhere"), ("product_id", "10")],
    )
    .await;
    assert!(body.contains("Failed to add product"));
}

#[tokio::test]
async fn test_customer_survives_clear() {
    let (_stub, base, client) = signed_in().await;
    let store = ("store", "oak-and-pine");

    pos_post(&client, format!("{base}/pos/cart/add"), &[store, ("product_id", "11")]).await;
    let body = pos_post(
        &client,
        format!("{base}/pos/customer"),
        &[store, ("customer_id", "7")],
    )
    .await;
    assert!(body.contains("Customer: <strong>Ada Lovelace</strong>"));

    let body = pos_post(&client, format!("{base}/pos/cart/clear"), &[store]).await;
    assert!(body.contains("No items rung up."));
    assert!(body.contains("Ada Lovelace"));

    let body = pos_post(
        &client,
        format!("{base}/pos/customer"),
        &[store, ("customer_id", "")],
    )
    .await;
    assert!(body.contains("Walk-in customer"));
}

#[tokio::test]
async fn test_switching_store_starts_a_new_register() {
    let (_stub, base, client) = signed_in().await;

    let body = pos_post(
        &client,
        format!("{base}/pos/cart/add"),
        &[("store", "oak-and-pine"), ("product_id", "11")],
    )
    .await;
    assert!(body.contains("$80.00"));
    pos_post(
        &client,
        format!("{base}/pos/customer"),
        &[("store", "oak-and-pine"), ("customer_id", "7")],
    )
    .await;

    let page = client
        .get(format!("{base}/pos?store=little-ones"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("No items rung up."));
    assert!(page.contains("Customer: <strong>Ada Lovelace</strong>"));

    // The other store's line is gone, not just hidden
    let body = pos_post(
        &client,
        format!("{base}/pos/cart/update"),
        &[("store", "oak-and-pine"), ("item_id", "11"), ("quantity", "2")],
    )
    .await;
    assert!(body.contains("That line is no longer in the register"));
}

#[tokio::test]
async fn test_logout_discards_register() {
    let (_stub, base, client) = signed_in().await;
    pos_post(
        &client,
        format!("{base}/pos/cart/add"),
        &[("store", "oak-and-pine"), ("product_id", "11")],
    )
    .await;

    let response = client.post(format!("{base}/logout")).send().await.unwrap();
    assert!(response.status().is_redirection());
    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(location.starts_with(LOGIN_URL));

    let after = client.get(format!("{base}/pos")).send().await.unwrap();
    assert!(after.status().is_redirection());

    // A fresh sign-in starts with an empty register
    client
        .get(format!("{base}/auth/callback?token={OPERATOR_TOKEN}"))
        .send()
        .await
        .unwrap();
    let page = client
        .get(format!("{base}/pos?store=oak-and-pine"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("No items rung up."));
}
