//! Products list route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{CspNonce, RequireOperator};
use crate::platform::PlatformError;
use crate::state::AppState;
use crate::views::{OperatorView, ProductRowView};

#[derive(Debug, Deserialize)]
pub struct StoreQuery {
    pub store: Option<String>,
}

/// Products list page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub operator: OperatorView,
    pub current_path: String,
    pub nonce: String,
    pub store_slug: Option<String>,
    pub store_name: Option<String>,
    pub products: Vec<ProductRowView>,
}

/// List a store's products. Without `?store=` only the store picker shows.
///
/// # Errors
///
/// Returns 404 for an unknown store.
#[instrument(skip(operator, state, nonce))]
pub async fn index(
    RequireOperator(operator): RequireOperator,
    State(state): State<AppState>,
    Query(query): Query<StoreQuery>,
    CspNonce(nonce): CspNonce,
) -> Result<ProductsIndexTemplate> {
    let store_slug = query.store.filter(|s| !s.trim().is_empty());

    let (store_name, products) = match &store_slug {
        Some(slug) => {
            let store = state
                .platform()
                .store(&operator.token, slug)
                .await
                .map_err(|e| match e {
                    PlatformError::NotFound(_) => AppError::NotFound(format!("store {slug}")),
                    other => other.into(),
                })?;
            let products = state.platform().products(&operator.token, store.id).await?;
            let rows = products
                .iter()
                .map(|product| ProductRowView::new(product, store.currency))
                .collect();
            (Some(store.name), rows)
        }
        None => (None, Vec::new()),
    };

    Ok(ProductsIndexTemplate {
        operator: OperatorView::from(&operator),
        current_path: "/products".to_string(),
        nonce,
        store_slug,
        store_name,
        products,
    })
}
