//! Media library upload and picker, end to end.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use vitrine_integration_tests::{OPERATOR_TOKEN, StubPlatform, browser, spawn_admin};

async fn signed_in() -> (StubPlatform, String, reqwest::Client) {
    let stub = StubPlatform::start().await;
    let base = spawn_admin(&stub).await;
    let client = browser();
    client
        .get(format!("{base}/auth/callback?token={OPERATOR_TOKEN}"))
        .send()
        .await
        .unwrap();
    (stub, base, client)
}

fn file(name: &str, mime: &str) -> Part {
    Part::bytes(vec![0x89, 0x50, 0x4e, 0x47])
        .file_name(name.to_string())
        .mime_str(mime)
        .unwrap()
}

async fn select(client: &reqwest::Client, base: &str, url: &str, mode: &str) -> Value {
    client
        .post(format!("{base}/media/select"))
        .header("accept", "application/json")
        .form(&[("url", url), ("mode", mode)])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_library_page_lists_media() {
    let (_stub, base, client) = signed_in().await;
    let response = client.get(format!("{base}/media")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("hero.jpg"));
}

#[tokio::test]
async fn test_partial_batch_upload_merges_stored_files() {
    let (stub, base, client) = signed_in().await;

    let form = Form::new()
        .part("files[]", file("sofa.png", "image/png"))
        .part("files[]", file("setup.exe", "application/octet-stream"));
    let response = client
        .post(format!("{base}/media/upload"))
        .header("accept", "application/json")
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["added"], 1);
    assert_eq!(body["errors"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"][0]["name"], "sofa.png");
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(stub.media_count(), 2);
}

#[tokio::test]
async fn test_fully_rejected_batch_reports_errors() {
    let (_stub, base, client) = signed_in().await;

    let form = Form::new().part("files[]", file("setup.exe", "application/octet-stream"));
    let body: Value = client
        .post(format!("{base}/media/upload"))
        .header("accept", "application/json")
        .multipart(form)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["added"], 0);
    assert_eq!(body["errors"][0], "setup.exe: file type not allowed");
}

#[tokio::test]
async fn test_large_rejection_batch_lists_every_error() {
    let (stub, base, client) = signed_in().await;

    let form = (1..=10).fold(Form::new(), |form, n| {
        form.part("files[]", file(&format!("photo-{n}.tiff"), "image/tiff"))
    });
    let response = client
        .post(format!("{base}/media/upload"))
        .header("accept", "application/json")
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["added"], 0);
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 10);
    assert_eq!(
        errors[9],
        "photo-10.tiff: The file may not be greater than 20480 kilobytes."
    );
    assert_eq!(stub.media_count(), 1);
}

#[tokio::test]
async fn test_upload_without_files_is_bad_request() {
    let (_stub, base, client) = signed_in().await;

    let form = Form::new().text("note", "nothing attached");
    let response = client
        .post(format!("{base}/media/upload"))
        .header("accept", "application/json")
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_picker_fragment_carries_mode_and_field() {
    let (_stub, base, client) = signed_in().await;

    let body = client
        .get(format!("{base}/media/picker?mode=multiple&field=gallery"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("data-field=\"gallery\""));
    assert!(body.contains("data-multiple=\"true\""));
    assert!(body.contains("hero.jpg"));
}

#[tokio::test]
async fn test_single_selection_replaces_and_normalizes_path() {
    let (stub, base, client) = signed_in().await;
    client.get(format!("{base}/media/picker")).send().await.unwrap();

    let hero = format!("{}storage/media/hero.jpg?v=2", stub.url());
    let first = select(&client, &base, &hero, "single").await;
    assert_eq!(first["path"], "/storage/media/hero.jpg");
    assert_eq!(first["selected"], true);

    let second = select(&client, &base, "/storage/media/other.png", "single").await;
    assert_eq!(second["paths"].as_array().map(Vec::len), Some(1));
    assert_eq!(second["paths"][0], "/storage/media/other.png");
}

#[tokio::test]
async fn test_multiple_selection_toggles() {
    let (_stub, base, client) = signed_in().await;
    client
        .get(format!("{base}/media/picker?mode=multiple"))
        .send()
        .await
        .unwrap();

    select(&client, &base, "/storage/media/a.png", "multiple").await;
    let both = select(&client, &base, "/storage/media/b.png", "multiple").await;
    assert_eq!(both["paths"].as_array().map(Vec::len), Some(2));

    let toggled = select(&client, &base, "/storage/media/a.png", "multiple").await;
    assert_eq!(toggled["selected"], false);
    assert_eq!(toggled["paths"][0], "/storage/media/b.png");

    // Reopening the picker starts over
    client.get(format!("{base}/media/picker")).send().await.unwrap();
    let list: Value = client
        .get(format!("{base}/media/list"))
        .header("accept", "application/json")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list[0]["selected"], false);
}
