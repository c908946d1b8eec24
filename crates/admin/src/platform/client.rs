//! HTTP client for the admin panel's platform API calls.

use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;
use vitrine_core::{MediaItem, PosCustomer, Product, StoreId, UploadBatch};

use super::PlatformError;
use super::types::{Envelope, Operator, StoreSummary, UploadFile};
use crate::config::PlatformConfig;

/// Header carrying the signed-in operator's token.
pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// Multipart field name for each file of an upload batch.
const UPLOAD_FIELD: &str = "files[]";

const ERROR_BODY_LIMIT: usize = 500;

/// Client for the platform JSON API, acting for one operator per call.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct AdminPlatformClient {
    inner: Arc<AdminPlatformClientInner>,
}

struct AdminPlatformClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_token: SecretString,
}

impl AdminPlatformClient {
    #[must_use]
    pub fn new(config: &PlatformConfig) -> Self {
        Self {
            inner: Arc::new(AdminPlatformClientInner {
                client: reqwest::Client::new(),
                base_url: config.api_url.clone(),
                api_token: config.api_token.clone(),
            }),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, PlatformError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| PlatformError::InvalidBaseUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, operator_token: &str) -> reqwest::RequestBuilder {
        self.inner
            .client
            .request(method, url)
            .bearer_auth(self.inner.api_token.expose_secret())
            .header(ADMIN_TOKEN_HEADER, operator_token)
            .header(reqwest::header::ACCEPT, "application/json")
    }

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

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(PlatformError::Unauthorized);
            }
            StatusCode::NOT_FOUND => {
                return Err(PlatformError::NotFound(response.url().path().to_string()));
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(1);
                return Err(PlatformError::RateLimited(retry_after));
            }
            _ => {}
        }

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

    async fn send_data<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, PlatformError> {
        self.send::<Envelope<T>>(request)
            .await
            .map(|envelope| envelope.data)
    }

    // =========================================================================
    // Operators
    // =========================================================================

    /// Resolve an operator token handed over by the platform's sign-in page.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Unauthorized`] if the token is not valid.
    #[instrument(skip_all)]
    pub async fn operator(&self, operator_token: &str) -> Result<Operator, PlatformError> {
        let url = self.endpoint(&["api", "admin", "me"])?;
        self.send_data(self.request(Method::GET, url, operator_token))
            .await
    }

    /// Check that the platform API answers.
    ///
    /// # Errors
    ///
    /// Returns an error if the API is unreachable or unhealthy.
    pub async fn ping(&self) -> Result<(), PlatformError> {
        let url = self.endpoint(&["api", "health"])?;
        let response = self.inner.client.get(url).send().await?;
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
    // Stores, Products & Customers
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the store doesn't exist or the request fails.
    #[instrument(skip(self, operator_token), fields(slug = %slug))]
    pub async fn store(&self, operator_token: &str, slug: &str) -> Result<StoreSummary, PlatformError> {
        let url = self.endpoint(&["api", "stores", slug])?;
        self.send_data(self.request(Method::GET, url, operator_token))
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, operator_token), fields(store_id = %store_id))]
    pub async fn products(
        &self,
        operator_token: &str,
        store_id: StoreId,
    ) -> Result<Vec<Product>, PlatformError> {
        let url = self.endpoint(&["api", "stores", &store_id.to_string(), "products"])?;
        self.send_data(self.request(Method::GET, url, operator_token))
            .await
    }

    /// List customers, optionally filtered by a search term.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, operator_token))]
    pub async fn customers(
        &self,
        operator_token: &str,
        search: Option<&str>,
    ) -> Result<Vec<PosCustomer>, PlatformError> {
        let mut url = self.endpoint(&["api", "customers"])?;
        if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
            url.query_pairs_mut().append_pair("search", search);
        }
        self.send_data(self.request(Method::GET, url, operator_token))
            .await
    }

    // =========================================================================
    // Media Library
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn media(&self, operator_token: &str) -> Result<Vec<MediaItem>, PlatformError> {
        let url = self.endpoint(&["api", "media"])?;
        self.send_data(self.request(Method::GET, url, operator_token))
            .await
    }

    /// Upload a batch of files in one multipart request.
    ///
    /// The platform stores what it can and reports one message per rejected
    /// file; a partially failed batch is still a success here.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails as a whole.
    #[instrument(skip(self, operator_token, files), fields(files = files.len()))]
    pub async fn upload_media(
        &self,
        operator_token: &str,
        files: Vec<UploadFile>,
    ) -> Result<UploadBatch, PlatformError> {
        let url = self.endpoint(&["api", "media", "batch"])?;

        let mut form = Form::new();
        for file in files {
            let mut part = Part::bytes(file.bytes).file_name(file.file_name);
            if let Some(content_type) = file.content_type {
                part = part.mime_str(&content_type)?;
            }
            form = form.part(UPLOAD_FIELD, part);
        }

        let request = self
            .request(Method::POST, url, operator_token)
            .multipart(form);

        self.send_validation(request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> AdminPlatformClient {
        AdminPlatformClient::new(&PlatformConfig {
            api_url: Url::parse(base).unwrap(),
            api_token: SecretString::from("svc_Hq83LmZp2Vx7Kd4T"),
        })
    }

    #[test]
    fn test_endpoint_builds_media_batch_path() {
        let client = client("https://platform.vitrine.test/");
        assert_eq!(
            client.endpoint(&["api", "media", "batch"]).unwrap().as_str(),
            "https://platform.vitrine.test/api/media/batch"
        );
    }

    #[test]
    fn test_endpoint_encodes_store_slug() {
        let client = client("https://platform.vitrine.test");
        assert_eq!(
            client.endpoint(&["api", "stores", "a b?"]).unwrap().as_str(),
            "https://platform.vitrine.test/api/stores/a%20b%3F"
        );
    }
}
