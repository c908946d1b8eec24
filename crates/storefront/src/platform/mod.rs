//! Platform JSON API client for the storefront.
//!
//! # Architecture
//!
//! - The platform is the source of truth for stores, products, carts, orders
//!   and customers. The storefront keeps no copy beyond a short-lived cache.
//! - Store profiles and catalog reads are cached with `moka` (TTL from config).
//!   Carts, coupons, orders and profiles are always fetched live.
//!
//! # Example
//!
//! ```rust,ignore
//! use vitrine_storefront::platform::PlatformClient;
//!
//! let client = PlatformClient::new(&config.platform);
//! let store = client.store("little-ones").await?;
//! let cart = client.create_cart(store.id, product_id, 1).await?;
//! ```

mod cache;
mod client;
pub mod types;

pub use client::PlatformClient;
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
    Status {
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the platform.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The configured base URL cannot carry a path.
    #[error("Invalid platform base URL: {0}")]
    InvalidBaseUrl(String),
}

impl PlatformError {
    /// Whether the error means the requested resource doesn't exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_error_display() {
        let err = PlatformError::NotFound("/api/stores/nope".to_string());
        assert_eq!(err.to_string(), "Not found: /api/stores/nope");
        assert!(err.is_not_found());

        let err = PlatformError::Status {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Platform returned HTTP 500: boom");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_rate_limited_error() {
        let err = PlatformError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
