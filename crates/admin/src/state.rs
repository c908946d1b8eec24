//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AdminConfig;
use crate::platform::AdminPlatformClient;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    platform: AdminPlatformClient,
}

impl AppState {
    #[must_use]
    pub fn new(config: AdminConfig) -> Self {
        let platform = AdminPlatformClient::new(&config.platform);
        Self {
            inner: Arc::new(AppStateInner { config, platform }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn platform(&self) -> &AdminPlatformClient {
        &self.inner.platform
    }
}
