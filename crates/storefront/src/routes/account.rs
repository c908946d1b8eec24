//! Customer profile pages.
//!
//! Sign-in happens on the platform, which redirects back to
//! `/s/{store}/account/callback?token=...`. The token is kept in the session
//! and sent with every profile request.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::VisitorSession;
use crate::platform::{CustomerProfile, PlatformError};
use crate::routes::load_store;
use crate::state::AppState;
use crate::views::StoreView;

/// Customer display data for templates.
#[derive(Clone, Debug)]
pub struct ProfileView {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub orders_count: u32,
    pub recent_orders: Vec<OrderRowView>,
}

/// One row in the order history table.
#[derive(Clone, Debug)]
pub struct OrderRowView {
    pub number: String,
    pub status: String,
    pub total: String,
    pub placed_on: String,
}

impl ProfileView {
    fn new(profile: &CustomerProfile, store: &StoreView) -> Self {
        Self {
            name: profile.name.clone(),
            email: profile.email.to_string(),
            phone: profile.phone.clone(),
            address: profile.address.clone(),
            orders_count: profile.orders_count,
            recent_orders: profile
                .recent_orders
                .iter()
                .map(|order| OrderRowView {
                    number: order.number.clone(),
                    status: order.status.clone(),
                    total: store.price(order.total),
                    placed_on: order.placed_at.format("%Y-%m-%d").to_string(),
                })
                .collect(),
        }
    }
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account.html")]
pub struct AccountTemplate {
    pub store: StoreView,
    pub profile: ProfileView,
    pub nonce: String,
}

/// Sign-in handover query.
#[derive(Deserialize)]
pub struct CallbackQuery {
    pub token: String,
}

/// Display the signed-in customer's profile.
///
/// # Errors
///
/// Returns 401 when no customer is signed in or the platform rejects the
/// token, and 404 for an unknown store.
#[instrument(skip(state, session, nonce))]
pub async fn show(
    State(state): State<AppState>,
    Path(store_slug): Path<String>,
    session: Session,
    CspNonce(nonce): CspNonce,
) -> Result<AccountTemplate> {
    let store = load_store(&state, &store_slug).await?;
    let visitor = VisitorSession::new(session);

    let Some(token) = visitor.customer_token().await? else {
        return Err(AppError::Unauthorized("please sign in".to_string()));
    };

    let profile = match state.platform().customer_profile(store.id, &token).await {
        Ok(profile) => profile,
        Err(PlatformError::Status { status: 401 | 403, .. }) => {
            visitor.sign_out().await?;
            return Err(AppError::Unauthorized("session expired, please sign in again".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let view = StoreView::from(store.as_ref());
    Ok(AccountTemplate {
        profile: ProfileView::new(&profile, &view),
        store: view,
        nonce,
    })
}

/// Store the customer token handed over by the platform.
///
/// # Errors
///
/// Returns 400 for an empty token.
#[instrument(skip(session, query))]
pub async fn callback(
    Path(store_slug): Path<String>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Result<Response> {
    let token = query.token.trim();
    if token.is_empty() {
        return Err(AppError::BadRequest("missing token".to_string()));
    }

    VisitorSession::new(session).sign_in(token).await?;
    Ok(Redirect::to(&format!("/s/{store_slug}/account")).into_response())
}

/// Forget the customer token and go back to the catalog.
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip(session))]
pub async fn logout(Path(store_slug): Path<String>, session: Session) -> Result<Response> {
    VisitorSession::new(session).sign_out().await?;
    Ok(Redirect::to(&format!("/s/{store_slug}")).into_response())
}
