//! Vitrine admin library.
//!
//! Media library picker, point-of-sale register and product and customer
//! lists for store operators. The binary in `main.rs` wires configuration,
//! logging and the listener around [`app`].
//!
//! # Security
//!
//! This crate holds the HIGH PRIVILEGE platform service token. Every route
//! except `/health` and the sign-in callback requires a signed-in operator.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod platform;
pub mod routes;
pub mod state;
pub mod views;

use axum::{
    Router,
    extract::State,
    http::{Request, Response, StatusCode},
    middleware::from_fn,
    routing::get,
};
use tower_http::{
    services::ServeDir,
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::middleware::{
    create_session_layer, csp_nonce_middleware, request_id_middleware,
    security_headers_middleware,
};
use crate::state::AppState;

/// Directory of static assets, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/admin/static";

/// Build the admin router with its middleware stack.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());
    let max_upload_bytes = state.config().media_max_upload_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes(max_upload_bytes))
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(csp_nonce_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<_>, latency: std::time::Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the platform API is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.platform().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Platform API not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::header::{ACCEPT, LOCATION};
    use secrecy::SecretString;
    use tower::ServiceExt;
    use url::Url;

    use super::*;
    use crate::config::{AdminConfig, PlatformConfig};

    fn offline_app() -> Router {
        let config = AdminConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            login_url: Url::parse("http://127.0.0.1:9/admin/login").unwrap(),
            platform: PlatformConfig {
                api_url: Url::parse("http://127.0.0.1:9").unwrap(),
                api_token: SecretString::from("svc_Hq83LmZp2Vx7Kd4T"),
            },
            media_max_upload_bytes: 1024,
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 0.0,
            sentry_traces_sample_rate: 0.0,
        };
        app(AppState::new(config))
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = offline_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("content-security-policy"));
    }

    #[tokio::test]
    async fn test_pages_redirect_to_sign_in() {
        let request = Request::builder().uri("/pos").body(Body::empty()).unwrap();
        let response = offline_app().oneshot(request).await.unwrap();
        assert!(response.status().is_redirection());
        let location = response.headers().get(LOCATION).unwrap().to_str().unwrap();
        assert!(location.starts_with("http://127.0.0.1:9/admin/login?return_to="));
    }

    #[tokio::test]
    async fn test_json_requests_get_401() {
        let request = Request::builder()
            .uri("/media/list")
            .header(ACCEPT, "application/json")
            .body(Body::empty())
            .unwrap();
        let response = offline_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
