//! Catalog page: the store's products as themed cards.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::CspNonce;
use crate::routes::load_store;
use crate::state::AppState;
use crate::views::{ProductCardView, StoreView};

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog.html")]
pub struct CatalogTemplate {
    pub store: StoreView,
    pub products: Vec<ProductCardView>,
    pub nonce: String,
}

/// Display the store's catalog.
///
/// # Errors
///
/// Returns 404 for an unknown store and 502 when the platform fails.
#[instrument(skip(state, nonce))]
pub async fn index(
    State(state): State<AppState>,
    Path(store_slug): Path<String>,
    CspNonce(nonce): CspNonce,
) -> Result<CatalogTemplate> {
    let store = load_store(&state, &store_slug).await?;
    let products = state.platform().products(store.id).await?;

    let view = StoreView::from(store.as_ref());
    let products = products
        .iter()
        .map(|product| ProductCardView::new(product, view.currency))
        .collect();

    Ok(CatalogTemplate {
        store: view,
        products,
        nonce,
    })
}
