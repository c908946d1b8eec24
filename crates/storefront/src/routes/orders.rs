//! Order confirmation page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::CspNonce;
use crate::platform::OrderConfirmation;
use crate::routes::load_store;
use crate::state::AppState;
use crate::views::{CartLineView, StoreView, SummaryView};

/// Confirmed order display data.
#[derive(Clone, Debug)]
pub struct OrderView {
    pub number: String,
    pub status: String,
    pub email: Option<String>,
    pub placed_on: String,
    pub lines: Vec<CartLineView>,
    pub summary: SummaryView,
}

impl OrderView {
    fn new(order: &OrderConfirmation, store: &StoreView) -> Self {
        Self {
            number: order.number.clone(),
            status: order.status.clone(),
            email: order.email.as_ref().map(ToString::to_string),
            placed_on: order.placed_at.format("%B %-d, %Y").to_string(),
            lines: order
                .items
                .iter()
                .map(|item| CartLineView::new(item, store.currency))
                .collect(),
            summary: SummaryView::new(&order.summary(), store.currency),
        }
    }
}

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "order.html")]
pub struct OrderTemplate {
    pub store: StoreView,
    pub order: OrderView,
    pub nonce: String,
}

/// Display an order confirmation.
///
/// # Errors
///
/// Returns 404 for an unknown store or order.
#[instrument(skip(state, nonce))]
pub async fn show(
    State(state): State<AppState>,
    Path((store_slug, number)): Path<(String, String)>,
    CspNonce(nonce): CspNonce,
) -> Result<OrderTemplate> {
    let store = load_store(&state, &store_slug).await?;
    let order = state
        .platform()
        .order(store.id, &number)
        .await
        .map_err(|e| AppError::not_found_as(e, &format!("order {number}")))?;

    let view = StoreView::from(store.as_ref());
    Ok(OrderTemplate {
        order: OrderView::new(&order, &view),
        store: view,
        nonce,
    })
}
