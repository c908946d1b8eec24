//! Operator sign-in handover and logout.

use axum::{
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::auth::login_redirect;
use crate::models::{CurrentOperator, PosStore, session_keys};
use crate::platform::PlatformError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub token: String,
}

/// Resolve the handed-over token, start the session and an empty register.
///
/// # Errors
///
/// Returns 400 for an empty token and 401 if the platform rejects it.
#[instrument(skip(state, session, query))]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Result<Redirect> {
    let token = query.token.trim();
    if token.is_empty() {
        return Err(AppError::BadRequest("missing token".to_string()));
    }

    let operator = state.platform().operator(token).await.map_err(|e| match e {
        PlatformError::Unauthorized => AppError::Unauthorized("sign-in was rejected".to_string()),
        other => AppError::Platform(other),
    })?;

    // New identity, new session ID
    session.cycle_id().await?;
    let current = CurrentOperator::new(operator, token.to_string());
    session
        .insert(session_keys::CURRENT_OPERATOR, &current)
        .await?;
    PosStore::new(session).init().await?;

    set_sentry_user(current.id, Some(current.email.as_str()));
    tracing::info!(operator_id = current.id, "Operator signed in");

    Ok(Redirect::to("/pos"))
}

/// Clear the register and the whole session, then go to the sign-in page.
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    PosStore::new(session.clone()).clear().await?;
    session.flush().await?;
    clear_sentry_user();

    let config = state.config();
    Ok(Redirect::to(
        login_redirect(&config.login_url, &config.base_url).as_str(),
    ))
}
