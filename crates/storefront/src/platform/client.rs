//! HTTP client for the storefront's platform API calls.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;
use vitrine_core::{CartItemId, CouponValidation, Product, ProductId, StoreId};

use super::PlatformError;
use super::cache::{CacheKey, CacheValue};
use super::types::{
    AddItemRequest, CartResource, CouponRequest, CustomerProfile, Envelope, OrderConfirmation,
    StoreProfile, UpdateItemRequest,
};
use crate::config::PlatformConfig;

/// Header carrying the signed-in customer's token.
pub const CUSTOMER_TOKEN_HEADER: &str = "X-Customer-Token";

/// Maximum characters of an error body kept for logs and errors.
const ERROR_BODY_LIMIT: usize = 500;

// =============================================================================
// PlatformClient
// =============================================================================

/// Client for the platform JSON API.
///
/// Cheap to clone; all clones share one connection pool and cache.
#[derive(Clone)]
pub struct PlatformClient {
    inner: Arc<PlatformClientInner>,
}

struct PlatformClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_token: SecretString,
    cache: Cache<CacheKey, CacheValue>,
}

impl PlatformClient {
    /// Create a new platform API client.
    #[must_use]
    pub fn new(config: &PlatformConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        Self {
            inner: Arc::new(PlatformClientInner {
                client: reqwest::Client::new(),
                base_url: config.api_url.clone(),
                api_token: config.api_token.clone(),
                cache,
            }),
        }
    }

    /// Build an endpoint URL from path segments, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, PlatformError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| PlatformError::InvalidBaseUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.inner
            .client
            .request(method, url)
            .bearer_auth(self.inner.api_token.expose_secret())
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// Send a request and decode its JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, PlatformError> {
        self.send_with(request, false).await
    }

    /// Like [`Self::send`], but a `422` body is decoded as the answer.
    ///
    /// The platform reports rejected input with the same body shape as a
    /// success, so the full body is parsed before anything is truncated.
    async fn send_validation<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, PlatformError> {
        self.send_with(request, true).await
    }

    async fn send_with<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        accept_unprocessable: bool,
    ) -> Result<T, PlatformError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(PlatformError::RateLimited(retry_after));
        }

        if status == StatusCode::NOT_FOUND {
            return Err(PlatformError::NotFound(response.url().path().to_string()));
        }

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        let validation = accept_unprocessable && status == StatusCode::UNPROCESSABLE_ENTITY;
        if !status.is_success() && !validation {
            let body = body.chars().take(ERROR_BODY_LIMIT).collect::<String>();
            tracing::error!(status = %status, body = %body, "Platform API returned non-success status");
            return Err(PlatformError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(ERROR_BODY_LIMIT).collect::<String>(),
                "Failed to parse platform API response"
            );
            PlatformError::Parse(e)
        })
    }

    /// Send a request whose response is wrapped in `{ "data": ... }`.
    async fn send_data<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, PlatformError> {
        self.send::<Envelope<T>>(request)
            .await
            .map(|envelope| envelope.data)
    }

    /// Check that the platform API answers.
    ///
    /// # Errors
    ///
    /// Returns an error if the API is unreachable or unhealthy.
    pub async fn ping(&self) -> Result<(), PlatformError> {
        let url = self.endpoint(&["api", "health"])?;
        let response = self.request(Method::GET, url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(PlatformError::Status {
                status: status.as_u16(),
                body: String::new(),
            })
        }
    }

    // =========================================================================
    // Store & Catalog Methods
    // =========================================================================

    /// Get a store tenant by its URL slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the store doesn't exist or the request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn store(&self, slug: &str) -> Result<Arc<StoreProfile>, PlatformError> {
        let key = CacheKey::Store(slug.to_string());
        if let Some(CacheValue::Store(store)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for store");
            return Ok(store);
        }

        let url = self.endpoint(&["api", "stores", slug])?;
        let store: Arc<StoreProfile> = Arc::new(self.send_data(self.request(Method::GET, url)).await?);

        self.inner
            .cache
            .insert(key, CacheValue::Store(Arc::clone(&store)))
            .await;
        Ok(store)
    }

    /// List a store's products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(store_id = %store_id))]
    pub async fn products(&self, store_id: StoreId) -> Result<Arc<Vec<Product>>, PlatformError> {
        let key = CacheKey::Products(store_id);
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let url = self.endpoint(&["api", "stores", &store_id.to_string(), "products"])?;
        let products: Arc<Vec<Product>> =
            Arc::new(self.send_data(self.request(Method::GET, url)).await?);

        self.inner
            .cache
            .insert(key, CacheValue::Products(Arc::clone(&products)))
            .await;
        Ok(products)
    }

    /// Get a single product by slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the product doesn't exist or the request fails.
    #[instrument(skip(self), fields(store_id = %store_id, slug = %slug))]
    pub async fn product(&self, store_id: StoreId, slug: &str) -> Result<Arc<Product>, PlatformError> {
        let key = CacheKey::Product(store_id, slug.to_string());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let url = self.endpoint(&["api", "stores", &store_id.to_string(), "products", slug])?;
        let product: Arc<Product> = Arc::new(self.send_data(self.request(Method::GET, url)).await?);

        self.inner
            .cache
            .insert(key, CacheValue::Product(Arc::clone(&product)))
            .await;
        Ok(product)
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Fetch a visitor's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart has expired or the request fails.
    #[instrument(skip(self, token), fields(store_id = %store_id))]
    pub async fn cart(&self, store_id: StoreId, token: &str) -> Result<CartResource, PlatformError> {
        let url = self.endpoint(&["api", "stores", &store_id.to_string(), "cart", token])?;
        self.send_data(self.request(Method::GET, url)).await
    }

    /// Create a cart holding one product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(store_id = %store_id, product_id = %product_id))]
    pub async fn create_cart(
        &self,
        store_id: StoreId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartResource, PlatformError> {
        let url = self.endpoint(&["api", "stores", &store_id.to_string(), "cart"])?;
        let body = AddItemRequest {
            product_id,
            quantity,
        };
        self.send_data(self.request(Method::POST, url).json(&body))
            .await
    }

    /// Add a product to an existing cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(store_id = %store_id, product_id = %product_id))]
    pub async fn add_item(
        &self,
        store_id: StoreId,
        token: &str,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartResource, PlatformError> {
        let url =
            self.endpoint(&["api", "stores", &store_id.to_string(), "cart", token, "items"])?;
        let body = AddItemRequest {
            product_id,
            quantity,
        };
        self.send_data(self.request(Method::POST, url).json(&body))
            .await
    }

    /// Set a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(store_id = %store_id, item_id = %item_id))]
    pub async fn update_item(
        &self,
        store_id: StoreId,
        token: &str,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<CartResource, PlatformError> {
        let url = self.endpoint(&[
            "api",
            "stores",
            &store_id.to_string(),
            "cart",
            token,
            "items",
            &item_id.to_string(),
        ])?;
        self.send_data(
            self.request(Method::PATCH, url)
                .json(&UpdateItemRequest { quantity }),
        )
        .await
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(store_id = %store_id, item_id = %item_id))]
    pub async fn remove_item(
        &self,
        store_id: StoreId,
        token: &str,
        item_id: CartItemId,
    ) -> Result<CartResource, PlatformError> {
        let url = self.endpoint(&[
            "api",
            "stores",
            &store_id.to_string(),
            "cart",
            token,
            "items",
            &item_id.to_string(),
        ])?;
        self.send_data(self.request(Method::DELETE, url)).await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(store_id = %store_id))]
    pub async fn clear_cart(
        &self,
        store_id: StoreId,
        token: &str,
    ) -> Result<CartResource, PlatformError> {
        let url = self.endpoint(&["api", "stores", &store_id.to_string(), "cart", token])?;
        self.send_data(self.request(Method::DELETE, url)).await
    }

    // =========================================================================
    // Coupon, Order & Customer Methods
    // =========================================================================

    /// Ask the platform whether `code` is valid for this store.
    ///
    /// A rejected code is a normal answer (`valid: false`), whether the
    /// platform sends it with `200` or `422`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an unreadable response.
    #[instrument(skip(self), fields(store_id = %store_id, code = %code))]
    pub async fn validate_coupon(
        &self,
        store_id: StoreId,
        code: &str,
    ) -> Result<CouponValidation, PlatformError> {
        let url = self.endpoint(&["api", "coupon", "validate"])?;
        let request = self
            .request(Method::POST, url)
            .json(&CouponRequest { store_id, code });

        self.send_validation(request).await
    }

    /// Get a placed order by its number.
    ///
    /// # Errors
    ///
    /// Returns an error if the order doesn't exist or the request fails.
    #[instrument(skip(self), fields(store_id = %store_id, number = %number))]
    pub async fn order(
        &self,
        store_id: StoreId,
        number: &str,
    ) -> Result<OrderConfirmation, PlatformError> {
        let url = self.endpoint(&["api", "stores", &store_id.to_string(), "orders", number])?;
        self.send_data(self.request(Method::GET, url)).await
    }

    /// Get the profile of the customer identified by `customer_token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip(self, customer_token), fields(store_id = %store_id))]
    pub async fn customer_profile(
        &self,
        store_id: StoreId,
        customer_token: &str,
    ) -> Result<CustomerProfile, PlatformError> {
        let url = self.endpoint(&["api", "stores", &store_id.to_string(), "customers", "me"])?;
        self.send_data(
            self.request(Method::GET, url)
                .header(CUSTOMER_TOKEN_HEADER, customer_token),
        )
        .await
    }
}
