//! Security headers for admin responses.
//!
//! Stricter than the storefront: no framing at all, no referrer, and
//! `blob:` images only so upload previews can render before they are sent.

use axum::{
    extract::Request,
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use super::csp::CspNonce;

/// Build the admin Content-Security-Policy value.
#[must_use]
pub fn content_security_policy(nonce: Option<&CspNonce>) -> String {
    let nonce_source = nonce
        .filter(|n| !n.0.is_empty())
        .map(|n| format!(" 'nonce-{}'", n.0))
        .unwrap_or_default();
    format!(
        "default-src 'none'; \
         script-src 'self' https://unpkg.com{nonce_source}; \
         style-src 'self'; \
         img-src 'self' https: blob:; \
         connect-src 'self'; \
         object-src 'none'; \
         base-uri 'none'; \
         form-action 'self'; \
         frame-ancestors 'none'"
    )
}

pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let nonce = request.extensions().get::<CspNonce>().cloned();
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
    if let Ok(value) = HeaderValue::from_str(&content_security_policy(nonce.as_ref())) {
        headers.insert(CONTENT_SECURITY_POLICY, value);
    }
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_policy() {
        let policy = content_security_policy(Some(&CspNonce("n0nce".to_string())));
        assert!(policy.contains("'nonce-n0nce'"));
        assert!(policy.contains("img-src 'self' https: blob:"));
        assert!(policy.contains("base-uri 'none'"));

        let policy = content_security_policy(None);
        assert!(policy.contains("script-src 'self' https://unpkg.com;"));
    }
}
