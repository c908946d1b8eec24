//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! Every store tenant is served under `/s/{store}`, where `{store}` is the
//! store slug. Pages render with the store's theme.
//!
//! ```text
//! GET  /s/{store}                       - Catalog
//! GET  /s/{store}/products/{slug}       - Product detail
//!
//! # Cart (HTMX fragments)
//! GET  /s/{store}/cart                  - Cart page
//! POST /s/{store}/cart/add              - Add (returns count badge, triggers cart-updated)
//! POST /s/{store}/cart/update           - Set quantity (returns cart fragment)
//! POST /s/{store}/cart/remove           - Remove line (returns cart fragment)
//! POST /s/{store}/cart/clear            - Empty cart (returns cart fragment)
//! GET  /s/{store}/cart/count            - Count badge
//! POST /s/{store}/cart/coupon           - Apply / toggle coupon (rate limited)
//!
//! # Orders
//! GET  /s/{store}/orders/{number}       - Order confirmation
//!
//! # Account
//! GET  /s/{store}/account               - Customer profile
//! GET  /s/{store}/account/callback      - Store the token handed over after sign-in
//! POST /s/{store}/account/logout        - Forget the customer token
//! ```

pub mod account;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod products;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::error::AppError;
use crate::middleware::coupon_rate_limiter;
use crate::platform::StoreProfile;
use crate::state::AppState;

/// Load a store by slug, mapping a missing store to a 404.
pub(crate) async fn load_store(
    state: &AppState,
    slug: &str,
) -> Result<Arc<StoreProfile>, AppError> {
    state
        .platform()
        .store(slug)
        .await
        .map_err(|e| AppError::not_found_as(e, &format!("store {slug}")))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
        .route(
            "/coupon",
            post(cart::coupon).layer(coupon_rate_limiter()),
        )
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::show))
        .route("/callback", get(account::callback))
        .route("/logout", post(account::logout))
}

/// Create the routes of one store tenant.
pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        .route("/products/{slug}", get(products::show))
        .route("/orders/{number}", get(orders::show))
        .nest("/cart", cart_routes())
        .nest("/account", account_routes())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/s/{store}", store_routes())
}
