//! End-to-end test harness for Vitrine.
//!
//! Each test starts a [`StubPlatform`] (an in-process fake of the platform
//! API) on an ephemeral port, then serves the storefront or admin router
//! against it. Nothing outside the test process is needed:
//!
//! ```bash
//! cargo test -p vitrine-integration-tests
//! ```
//!
//! # Fixtures
//!
//! | Store          | ID | Theme                | Quantity policy |
//! |----------------|----|----------------------|-----------------|
//! | `oak-and-pine` | 1  | `furniture-interior` | clamp           |
//! | `little-ones`  | 2  | `baby-kids`          | remove          |
//!
//! Both stores sell product 10 (Oak Chair, list 120.00, sale 100.00, stock 3)
//! and product 11 (Pine Shelf, 80.00, stock 5). Coupon `SAVE20` takes 20.00
//! off; `WINTER19` is rejected with [`expired_coupon_message`], a message
//! longer than any log excerpt; every other code is rejected with
//! `Coupon not found`. Uploads ending in `.exe` are refused by type and those
//! ending in `.tiff` by size.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;

/// Customer token the stub accepts on `customers/me`.
pub const CUSTOMER_TOKEN: &str = "cust-token-1";

/// Operator token the stub accepts on `admin/me`.
pub const OPERATOR_TOKEN: &str = "op-token-1";

/// Service token both apps are configured with.
pub const SERVICE_TOKEN: &str = "svc_Hq83LmZp2Vx7Kd4T";

/// Sign-in page the admin redirects anonymous operators to.
pub const LOGIN_URL: &str = "http://login.vitrine.test/admin/login";

// =============================================================================
// Stub Platform API
// =============================================================================

#[derive(Default)]
struct StubData {
    carts: HashMap<String, Vec<Value>>,
    next_cart: u64,
    next_item: i64,
    next_media: i64,
    media: Vec<Value>,
    coupon_checks: usize,
}

/// In-process fake of the platform API.
#[derive(Clone)]
pub struct StubPlatform {
    data: Arc<Mutex<StubData>>,
    url: Url,
}

impl StubPlatform {
    /// Start the stub on an ephemeral port.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let url = Url::parse(&format!("http://{addr}/")).unwrap();

        let data = Arc::new(Mutex::new(StubData {
            next_item: 100,
            next_media: 500,
            media: vec![media_item(&url, 400, "hero.jpg", "image/jpeg")],
            ..StubData::default()
        }));
        let stub = Self { data, url };

        let router = stub_router().with_state(stub.clone());
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        stub
    }

    /// Base URL of the stub.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// How many coupon validations the platform has been asked for.
    #[must_use]
    pub fn coupon_checks(&self) -> usize {
        self.lock().coupon_checks
    }

    /// Number of items in the media library.
    #[must_use]
    pub fn media_count(&self) -> usize {
        self.lock().media.len()
    }

    /// Drop every server-side cart, as if they had expired.
    pub fn expire_carts(&self) {
        self.lock().carts.clear();
    }

    fn lock(&self) -> MutexGuard<'_, StubData> {
        self.data.lock().unwrap()
    }
}

fn stub_router() -> Router<StubPlatform> {
    Router::new()
        .route("/api/health", get(|| async { "ok" }))
        .route("/api/stores/{store}", get(stub_store))
        .route("/api/stores/{store}/products", get(stub_products))
        .route("/api/stores/{store}/products/{slug}", get(stub_product))
        .route("/api/stores/{store}/cart", post(stub_create_cart))
        .route(
            "/api/stores/{store}/cart/{token}",
            get(stub_cart).delete(stub_clear_cart),
        )
        .route("/api/stores/{store}/cart/{token}/items", post(stub_add_item))
        .route(
            "/api/stores/{store}/cart/{token}/items/{item}",
            patch(stub_update_item).delete(stub_remove_item),
        )
        .route("/api/stores/{store}/orders/{number}", get(stub_order))
        .route("/api/stores/{store}/customers/me", get(stub_customer_me))
        .route("/api/coupon/validate", post(stub_validate_coupon))
        .route("/api/admin/me", get(stub_operator))
        .route("/api/customers", get(stub_customers))
        .route("/api/media", get(stub_media))
        .route("/api/media/batch", post(stub_upload))
}

fn data(value: Value) -> Response {
    Json(json!({ "data": value })).into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Not found" }))).into_response()
}

fn store_fixture(key: &str) -> Option<Value> {
    let charges = json!({
        "shipping": { "type": "flat", "value": "10.00" },
        "tax": { "type": "flat", "value": "0.00" },
    });
    match key {
        "oak-and-pine" | "1" => Some(json!({
            "id": 1, "name": "Oak & Pine", "slug": "oak-and-pine",
            "theme": "furniture-interior", "currency": "USD", "charges": charges,
        })),
        "little-ones" | "2" => Some(json!({
            "id": 2, "name": "Little Ones", "slug": "little-ones",
            "theme": "baby-kids", "currency": "USD", "charges": charges,
        })),
        _ => None,
    }
}

fn product_fixtures() -> Vec<Value> {
    vec![
        json!({
            "id": 10, "slug": "oak-chair", "name": "Oak Chair",
            "price": "120.00", "sale_price": "100.00", "stock": 3,
            "category": "Chairs",
        }),
        json!({
            "id": 11, "slug": "pine-shelf", "name": "Pine Shelf",
            "price": "80.00", "stock": 5, "category": "Shelves",
        }),
    ]
}

fn product_by_id(id: i64) -> Option<Value> {
    product_fixtures().into_iter().find(|p| p["id"] == id)
}

fn media_item(base: &Url, id: i64, file_name: &str, mime: &str) -> Value {
    json!({
        "id": id,
        "name": file_name,
        "file_name": file_name,
        "url": format!("{base}storage/media/{file_name}"),
        "size": 2048,
        "mime_type": mime,
        "created_at": "2026-10-01T09:30:00Z",
    })
}

async fn stub_store(Path(store): Path<String>) -> Response {
    store_fixture(&store).map_or_else(not_found, data)
}

async fn stub_products(Path(store): Path<String>) -> Response {
    if store_fixture(&store).is_none() {
        return not_found();
    }
    data(Value::Array(product_fixtures()))
}

async fn stub_product(Path((_store, slug)): Path<(String, String)>) -> Response {
    product_fixtures()
        .into_iter()
        .find(|p| p["slug"] == slug.as_str())
        .map_or_else(not_found, data)
}

#[derive(Deserialize)]
struct AddItemBody {
    product_id: i64,
    quantity: u32,
}

#[derive(Deserialize)]
struct QuantityBody {
    quantity: u32,
}

fn cart_body(token: &str, items: &[Value]) -> Response {
    data(json!({ "token": token, "items": items }))
}

fn push_item(stub: &mut StubData, token: &str, body: &AddItemBody) -> bool {
    let Some(product) = product_by_id(body.product_id) else {
        return false;
    };
    let stock = product["stock"].as_u64().unwrap_or(0);
    let items = stub.carts.entry(token.to_string()).or_default();

    if let Some(item) = items.iter_mut().find(|i| i["product_id"] == body.product_id) {
        let quantity = item["quantity"].as_u64().unwrap_or(0) + u64::from(body.quantity);
        item["quantity"] = json!(quantity.min(stock));
        return true;
    }

    let id = stub.next_item;
    stub.next_item += 1;
    stub.carts.entry(token.to_string()).or_default().push(json!({
        "id": id,
        "product_id": body.product_id,
        "name": product["name"],
        "quantity": u64::from(body.quantity).min(stock),
        "price": product["price"],
        "sale_price": product["sale_price"],
        "stock": stock,
        "category": product["category"],
    }));
    true
}

async fn stub_create_cart(
    State(stub): State<StubPlatform>,
    Path(_store): Path<String>,
    Json(body): Json<AddItemBody>,
) -> Response {
    let mut guard = stub.lock();
    guard.next_cart += 1;
    let token = format!("cart-{}", guard.next_cart);
    guard.carts.insert(token.clone(), Vec::new());
    if !push_item(&mut guard, &token, &body) {
        return not_found();
    }
    cart_body(&token, &guard.carts[&token])
}

async fn stub_cart(
    State(stub): State<StubPlatform>,
    Path((_store, token)): Path<(String, String)>,
) -> Response {
    let guard = stub.lock();
    guard
        .carts
        .get(&token)
        .map_or_else(not_found, |items| cart_body(&token, items))
}

async fn stub_clear_cart(
    State(stub): State<StubPlatform>,
    Path((_store, token)): Path<(String, String)>,
) -> Response {
    let mut guard = stub.lock();
    match guard.carts.get_mut(&token) {
        Some(items) => {
            items.clear();
            cart_body(&token, items)
        }
        None => not_found(),
    }
}

async fn stub_add_item(
    State(stub): State<StubPlatform>,
    Path((_store, token)): Path<(String, String)>,
    Json(body): Json<AddItemBody>,
) -> Response {
    let mut guard = stub.lock();
    if !guard.carts.contains_key(&token) || !push_item(&mut guard, &token, &body) {
        return not_found();
    }
    cart_body(&token, &guard.carts[&token])
}

async fn stub_update_item(
    State(stub): State<StubPlatform>,
    Path((_store, token, item)): Path<(String, String, i64)>,
    Json(body): Json<QuantityBody>,
) -> Response {
    let mut guard = stub.lock();
    let Some(items) = guard.carts.get_mut(&token) else {
        return not_found();
    };
    let Some(line) = items.iter_mut().find(|i| i["id"] == item) else {
        return not_found();
    };
    line["quantity"] = json!(body.quantity);
    cart_body(&token, items)
}

async fn stub_remove_item(
    State(stub): State<StubPlatform>,
    Path((_store, token, item)): Path<(String, String, i64)>,
) -> Response {
    let mut guard = stub.lock();
    let Some(items) = guard.carts.get_mut(&token) else {
        return not_found();
    };
    items.retain(|i| i["id"] != item);
    cart_body(&token, items)
}

async fn stub_order(Path((_store, number)): Path<(String, String)>) -> Response {
    if number != "VT-1001" {
        return not_found();
    }
    data(json!({
        "number": "VT-1001",
        "status": "paid",
        "email": "ada@example.com",
        "items": [{
            "id": 1, "product_id": 11, "name": "Pine Shelf", "quantity": 2,
            "price": "80.00", "stock": 5,
        }],
        "discount": "0.00",
        "shipping": "10.00",
        "tax": "0.00",
        "placed_at": "2026-10-02T14:00:00Z",
    }))
}

async fn stub_customer_me(headers: HeaderMap) -> Response {
    let token = headers.get("x-customer-token").and_then(|v| v.to_str().ok());
    if token != Some(CUSTOMER_TOKEN) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Unauthenticated" })))
            .into_response();
    }
    data(json!({
        "id": 7,
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "orders_count": 1,
        "recent_orders": [{
            "number": "VT-1001", "status": "paid", "total": "170.00",
            "placed_at": "2026-10-02T14:00:00Z",
        }],
    }))
}

#[derive(Deserialize)]
struct CouponBody {
    code: String,
}

async fn stub_validate_coupon(
    State(stub): State<StubPlatform>,
    Json(body): Json<CouponBody>,
) -> Response {
    stub.lock().coupon_checks += 1;
    if body.code.eq_ignore_ascii_case("SAVE20") {
        return Json(json!({ "valid": true, "discount": "20.00" })).into_response();
    }
    let message = if body.code.eq_ignore_ascii_case("WINTER19") {
        expired_coupon_message()
    } else {
        "Coupon not found".to_string()
    };
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "valid": false, "message": message })),
    )
        .into_response()
}

/// Rejection message the stub sends for the `WINTER19` coupon.
#[must_use]
pub fn expired_coupon_message() -> String {
    let mut message = String::from("WINTER19 expired at the end of the 2019 winter sale.");
    for season in ["spring", "summer", "autumn", "winter"] {
        message.push_str(&format!(
            " It cannot be combined with {season} offers, it is limited to one use per \
             customer, and it only applies to full priced furniture and interior pieces."
        ));
    }
    message
}

fn operator_authorized(headers: &HeaderMap) -> bool {
    headers
        .get("x-admin-token")
        .and_then(|v| v.to_str().ok())
        == Some(OPERATOR_TOKEN)
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Unauthenticated" }))).into_response()
}

async fn stub_operator(headers: HeaderMap) -> Response {
    if !operator_authorized(&headers) {
        return unauthorized();
    }
    data(json!({ "id": 3, "name": "Grace Hopper", "email": "grace@vitrine.test" }))
}

#[derive(Deserialize)]
struct CustomerSearch {
    search: Option<String>,
}

async fn stub_customers(headers: HeaderMap, Query(query): Query<CustomerSearch>) -> Response {
    if !operator_authorized(&headers) {
        return unauthorized();
    }
    let customers = vec![
        json!({ "id": 7, "name": "Ada Lovelace", "email": "ada@example.com" }),
        json!({ "id": 8, "name": "Alan Turing", "phone": "+44 20 7946 0000" }),
    ];
    let search = query.search.unwrap_or_default().to_lowercase();
    let matching: Vec<Value> = customers
        .into_iter()
        .filter(|c| {
            c["name"]
                .as_str()
                .is_some_and(|name| name.to_lowercase().contains(&search))
        })
        .collect();
    data(Value::Array(matching))
}

async fn stub_media(State(stub): State<StubPlatform>, headers: HeaderMap) -> Response {
    if !operator_authorized(&headers) {
        return unauthorized();
    }
    data(Value::Array(stub.lock().media.clone()))
}

async fn stub_upload(
    State(stub): State<StubPlatform>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if !operator_authorized(&headers) {
        return unauthorized();
    }

    let mut stored = Vec::new();
    let mut errors = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let mime = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        if field.bytes().await.is_err() {
            errors.push(format!("{file_name}: could not be read"));
            continue;
        }
        if file_name.ends_with(".exe") {
            errors.push(format!("{file_name}: file type not allowed"));
            continue;
        }
        if file_name.ends_with(".tiff") {
            errors.push(format!(
                "{file_name}: The file may not be greater than 20480 kilobytes."
            ));
            continue;
        }
        let mut guard = stub.lock();
        let id = guard.next_media;
        guard.next_media += 1;
        let item = media_item(&stub.url, id, &file_name, &mime);
        guard.media.insert(0, item.clone());
        stored.push(item);
    }

    let status = if stored.is_empty() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    let message = (!errors.is_empty()).then(|| format!("{} file(s) rejected", errors.len()));
    (
        status,
        Json(json!({ "data": stored, "errors": errors, "message": message })),
    )
        .into_response()
}

// =============================================================================
// Apps Under Test
// =============================================================================

/// Serve the storefront against `stub`; returns its base URL.
pub async fn spawn_storefront(stub: &StubPlatform) -> String {
    use vitrine_storefront::config::{PlatformConfig, StorefrontConfig};

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let config = StorefrontConfig {
        host: addr.ip(),
        port: addr.port(),
        base_url: format!("http://{addr}"),
        platform: PlatformConfig {
            api_url: stub.url().clone(),
            api_token: SecretString::from(SERVICE_TOKEN),
            cache_ttl: Duration::from_secs(60),
        },
        log_json: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    };
    let app = vitrine_storefront::app(vitrine_storefront::state::AppState::new(config));

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    format!("http://{addr}")
}

/// Serve the admin against `stub`; returns its base URL.
pub async fn spawn_admin(stub: &StubPlatform) -> String {
    use vitrine_admin::config::{AdminConfig, PlatformConfig};

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let config = AdminConfig {
        host: addr.ip(),
        port: addr.port(),
        base_url: format!("http://{addr}"),
        login_url: Url::parse(LOGIN_URL).unwrap(),
        platform: PlatformConfig {
            api_url: stub.url().clone(),
            api_token: SecretString::from(SERVICE_TOKEN),
        },
        media_max_upload_bytes: 1024 * 1024,
        log_json: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    };
    let app = vitrine_admin::app(vitrine_admin::state::AppState::new(config));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// A browser-like client: keeps cookies, does not follow redirects.
#[must_use]
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
