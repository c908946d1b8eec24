//! Product detail page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::CspNonce;
use crate::routes::load_store;
use crate::state::AppState;
use crate::views::{ProductCardView, StoreView};

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "product.html")]
pub struct ProductTemplate {
    pub store: StoreView,
    pub product: ProductCardView,
    pub nonce: String,
}

/// Display a product.
///
/// # Errors
///
/// Returns 404 for an unknown store or product.
#[instrument(skip(state, nonce))]
pub async fn show(
    State(state): State<AppState>,
    Path((store_slug, slug)): Path<(String, String)>,
    CspNonce(nonce): CspNonce,
) -> Result<ProductTemplate> {
    let store = load_store(&state, &store_slug).await?;
    let product = state
        .platform()
        .product(store.id, &slug)
        .await
        .map_err(|e| AppError::not_found_as(e, &format!("product {slug}")))?;

    let view = StoreView::from(store.as_ref());
    Ok(ProductTemplate {
        product: ProductCardView::new(&product, view.currency),
        store: view,
        nonce,
    })
}
