//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Request ID (`x-request-id`, recorded on the span)
//! 4. CSP nonce (per-request nonce for inline scripts)
//! 5. Security headers (stricter CSP for admin)
//! 6. Session layer (tower-sessions, in-memory store, `SameSite=Strict`)
//!
//! Authentication is an extractor, [`RequireOperator`], on every route except
//! `/health` and the sign-in callback.

pub mod auth;
pub mod csp;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OperatorRejection, RequireOperator};
pub use csp::{CspNonce, csp_nonce_middleware};
pub use request_id::{RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
