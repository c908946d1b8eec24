//! Authentication extractor for admin.
//!
//! Operators sign in on the platform, which redirects back to
//! `/auth/callback?token=...`. Until then every page redirects to the
//! platform's sign-in page and every HTMX or JSON call gets a bare 401.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use url::Url;

use crate::models::{CurrentOperator, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in operator.
///
/// ```rust,ignore
/// async fn handler(RequireOperator(operator): RequireOperator) -> String {
///     format!("Hello, {}!", operator.name)
/// }
/// ```
pub struct RequireOperator(pub CurrentOperator);

/// Returned when no operator is signed in.
#[derive(Debug)]
pub enum OperatorRejection {
    /// Send the browser to the platform's sign-in page.
    RedirectToLogin(Url),
    /// 401 for fragment and JSON requests.
    Unauthorized,
}

impl IntoResponse for OperatorRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(url) => Redirect::to(url.as_str()).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

/// Whether the request wants a fragment or JSON rather than a full page.
fn is_partial_request(parts: &Parts) -> bool {
    parts.headers.contains_key("hx-request")
        || parts
            .headers
            .get(axum::http::header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|accept| accept.contains("application/json"))
}

/// `{login_url}?return_to={base_url}/auth/callback`
#[must_use]
pub fn login_redirect(login_url: &Url, base_url: &str) -> Url {
    let mut url = login_url.clone();
    let callback = format!("{}/auth/callback", base_url.trim_end_matches('/'));
    url.query_pairs_mut().append_pair("return_to", &callback);
    url
}

impl FromRequestParts<AppState> for RequireOperator {
    type Rejection = OperatorRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(OperatorRejection::Unauthorized)?;

        let operator: Option<CurrentOperator> = session
            .get(session_keys::CURRENT_OPERATOR)
            .await
            .ok()
            .flatten();

        operator.map(Self).ok_or_else(|| {
            if is_partial_request(parts) {
                OperatorRejection::Unauthorized
            } else {
                let config = state.config();
                OperatorRejection::RedirectToLogin(login_redirect(&config.login_url, &config.base_url))
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    #[test]
    fn test_login_redirect_carries_callback() {
        let login = Url::parse("https://platform.vitrine.test/admin/login").unwrap();
        let url = login_redirect(&login, "https://admin.vitrine.test/");
        assert_eq!(
            url.as_str(),
            "https://platform.vitrine.test/admin/login?return_to=https%3A%2F%2Fadmin.vitrine.test%2Fauth%2Fcallback"
        );
    }

    #[test]
    fn test_partial_request_detection() {
        let (parts, ()) = Request::builder()
            .header("HX-Request", "true")
            .body(())
            .unwrap()
            .into_parts();
        assert!(is_partial_request(&parts));

        let (parts, ()) = Request::builder()
            .header("Accept", "application/json")
            .body(())
            .unwrap()
            .into_parts();
        assert!(is_partial_request(&parts));

        let (parts, ()) = Request::builder()
            .header("Accept", "text/html")
            .body(())
            .unwrap()
            .into_parts();
        assert!(!is_partial_request(&parts));
    }
}
