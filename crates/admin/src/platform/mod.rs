//! Platform JSON API client for the admin panel.
//!
//! Every request carries the service token as a bearer credential and, once
//! an operator has signed in, their token in `X-Admin-Token` so the platform
//! can attribute and authorize the call. Nothing is cached: the admin edits
//! what it reads.

mod client;
pub mod types;

pub use client::{ADMIN_TOKEN_HEADER, AdminPlatformClient};
pub use types::*;

use thiserror::Error;

/// Errors that can occur when calling the platform API.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform answered with a non-success status.
    #[error("Platform returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The operator token was missing, expired or revoked.
    #[error("Operator token rejected")]
    Unauthorized,

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The configured base URL cannot carry a path.
    #[error("Invalid platform base URL: {0}")]
    InvalidBaseUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_error_display() {
        assert_eq!(
            PlatformError::NotFound("/api/stores/x".to_string()).to_string(),
            "Not found: /api/stores/x"
        );
        assert_eq!(
            PlatformError::Unauthorized.to_string(),
            "Operator token rejected"
        );
    }
}
