//! Customers list route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use crate::filters;
use crate::middleware::{CspNonce, RequireOperator};
use crate::state::AppState;
use crate::views::{CustomerRowView, Notice, OperatorView};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

/// Customers list page template.
#[derive(Template, WebTemplate)]
#[template(path = "customers/index.html")]
pub struct CustomersIndexTemplate {
    pub operator: OperatorView,
    pub current_path: String,
    pub nonce: String,
    pub customers: Vec<CustomerRowView>,
    pub search_query: Option<String>,
    pub notice: Option<Notice>,
}

/// Customers list page handler.
#[instrument(skip(operator, state, nonce))]
pub async fn index(
    RequireOperator(operator): RequireOperator,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
    CspNonce(nonce): CspNonce,
) -> CustomersIndexTemplate {
    let (customers, notice) = match state
        .platform()
        .customers(&operator.token, query.search.as_deref())
        .await
    {
        Ok(customers) => (customers.iter().map(CustomerRowView::from).collect(), None),
        Err(e) => {
            tracing::error!("Failed to fetch customers: {e}");
            (Vec::new(), Some(Notice::error("Failed to load customers")))
        }
    };

    CustomersIndexTemplate {
        operator: OperatorView::from(&operator),
        current_path: "/customers".to_string(),
        nonce,
        customers,
        search_query: query.search,
        notice,
    }
}
