//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//! GET  /                       - Redirect to the POS
//!
//! # Auth (sign-in happens on the platform)
//! GET  /auth/callback          - Store the operator token, start a register
//! POST /logout                 - Clear the register and the session
//!
//! # Media library
//! GET  /media                  - Library page with upload form
//! GET  /media/picker           - Picker fragment (?mode=single|multiple)
//! GET  /media/list             - Library as JSON
//! POST /media/upload           - Multipart batch upload, returns merged list JSON
//! POST /media/select           - Toggle an item, returns its storage path JSON
//!
//! # Catalog & customers
//! GET  /products               - Product list (?store={slug})
//! GET  /customers              - Customer list (?search=)
//!
//! # POS (HTMX fragments)
//! GET  /pos                    - Register screen (?store={slug})
//! POST /pos/cart/add           - Ring up a product
//! POST /pos/cart/update        - Set a line's quantity
//! POST /pos/cart/remove        - Remove a line
//! POST /pos/cart/clear         - Empty the register
//! POST /pos/customer           - Select or deselect the customer
//! ```

pub mod auth;
pub mod customers;
pub mod media;
pub mod pos;
pub mod products;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::Redirect,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the media library routes router.
pub fn media_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(media::index))
        .route("/picker", get(media::picker))
        .route("/list", get(media::list))
        .route(
            "/upload",
            post(media::upload).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/select", post(media::select))
}

/// Create the POS routes router.
pub fn pos_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pos::index))
        .route("/cart/add", post(pos::add))
        .route("/cart/update", post(pos::update))
        .route("/cart/remove", post(pos::remove))
        .route("/cart/clear", post(pos::clear))
        .route("/customer", post(pos::select_customer))
}

/// Create all routes for admin.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/pos") }))
        .route("/auth/callback", get(auth::callback))
        .route("/logout", post(auth::logout))
        .route("/products", get(products::index))
        .route("/customers", get(customers::index))
        .nest("/media", media_routes(max_upload_bytes))
        .nest("/pos", pos_routes())
}
