//! Customer sign-in handover, profile and order confirmation.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use reqwest::StatusCode;
use vitrine_integration_tests::{CUSTOMER_TOKEN, StubPlatform, browser, spawn_storefront};

const OAK: &str = "/s/oak-and-pine";

#[tokio::test]
async fn test_account_requires_sign_in() {
    let stub = StubPlatform::start().await;
    let base = spawn_storefront(&stub).await;
    let client = browser();

    let response = client.get(format!("{base}{OAK}/account")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_callback_rejects_empty_token() {
    let stub = StubPlatform::start().await;
    let base = spawn_storefront(&stub).await;
    let client = browser();

    let response = client
        .get(format!("{base}{OAK}/account/callback?token="))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sign_in_profile_and_sign_out() {
    let stub = StubPlatform::start().await;
    let base = spawn_storefront(&stub).await;
    let client = browser();

    let callback = client
        .get(format!("{base}{OAK}/account/callback?token={CUSTOMER_TOKEN}"))
        .send()
        .await
        .unwrap();
    assert!(callback.status().is_redirection());
    assert_eq!(
        callback.headers().get("location").and_then(|v| v.to_str().ok()),
        Some("/s/oak-and-pine/account")
    );

    let profile = client.get(format!("{base}{OAK}/account")).send().await.unwrap();
    assert_eq!(profile.status(), StatusCode::OK);
    let body = profile.text().await.unwrap();
    assert!(body.contains("Ada Lovelace"));
    assert!(body.contains("VT-1001"));

    let logout = client
        .post(format!("{base}{OAK}/account/logout"))
        .send()
        .await
        .unwrap();
    assert!(logout.status().is_redirection());

    let after = client.get(format!("{base}{OAK}/account")).send().await.unwrap();
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rejected_customer_token_signs_out() {
    let stub = StubPlatform::start().await;
    let base = spawn_storefront(&stub).await;
    let client = browser();

    client
        .get(format!("{base}{OAK}/account/callback?token=stale"))
        .send()
        .await
        .unwrap();
    let response = client.get(format!("{base}{OAK}/account")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_order_confirmation() {
    let stub = StubPlatform::start().await;
    let base = spawn_storefront(&stub).await;
    let client = browser();

    let response = client
        .get(format!("{base}{OAK}/orders/VT-1001"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Pine Shelf"));
    assert!(body.contains("$160.00"));
    assert!(body.contains("$170.00"));

    let missing = client
        .get(format!("{base}{OAK}/orders/VT-0000"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
