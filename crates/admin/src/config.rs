//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_BASE_URL` - Public URL for the admin panel
//! - `PLATFORM_API_URL` - Base URL of the platform JSON API
//! - `PLATFORM_API_TOKEN` - Service token for the platform API (HIGH PRIVILEGE)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_LOGIN_URL` - Platform sign-in page (default: `{PLATFORM_API_URL}/admin/login`)
//! - `ADMIN_MEDIA_MAX_UPLOAD_BYTES` - Largest accepted upload batch (default: 20 MiB)
//! - `VITRINE_LOG_JSON` - Emit JSON logs when set
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;
const DEFAULT_MAX_UPLOAD_BYTES: &str = "20971520";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin panel
    pub base_url: String,
    /// Where unauthenticated operators are sent to sign in
    pub login_url: Url,
    /// Platform API configuration
    pub platform: PlatformConfig,
    /// Largest multipart body accepted by the media upload endpoint
    pub media_max_upload_bytes: usize,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Platform API configuration.
///
/// Implements `Debug` manually to redact the HIGH PRIVILEGE service token.
#[derive(Clone)]
pub struct PlatformConfig {
    pub api_url: Url,
    pub api_token: SecretString,
}

impl std::fmt::Debug for PlatformConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_token", &"[REDACTED]")
            .finish()
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the service token looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let platform = PlatformConfig::from_env()?;
        let login_url = match get_optional_env("ADMIN_LOGIN_URL") {
            Some(raw) => parse_url("ADMIN_LOGIN_URL", &raw)?,
            None => default_login_url(&platform.api_url)?,
        };

        Ok(Self {
            host: parse_env("ADMIN_HOST", "127.0.0.1")?,
            port: parse_env("ADMIN_PORT", "3001")?,
            base_url: get_required_env("ADMIN_BASE_URL")?,
            login_url,
            platform,
            media_max_upload_bytes: parse_env(
                "ADMIN_MEDIA_MAX_UPLOAD_BYTES",
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
            log_json: get_optional_env("VITRINE_LOG_JSON").is_some(),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl PlatformConfig {
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL or token is missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_url = get_required_env("PLATFORM_API_URL")?;
        Ok(Self {
            api_url: parse_url("PLATFORM_API_URL", &raw_url)?,
            api_token: get_validated_secret("PLATFORM_API_TOKEN")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key)
        .as_deref()
        .unwrap_or(default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// `{api_url}/admin/login`
fn default_login_url(api_url: &Url) -> Result<Url, ConfigError> {
    let mut url = api_url.clone();
    url.path_segments_mut()
        .map_err(|()| {
            ConfigError::InvalidEnvVar(
                "PLATFORM_API_URL".to_string(),
                "cannot be a base URL".to_string(),
            )
        })?
        .pop_if_empty()
        .extend(["admin", "login"]);
    Ok(url)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject placeholder and low-entropy secrets.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_login_url_keeps_api_path() {
        let api = Url::parse("https://platform.vitrine.test/v1/").unwrap();
        assert_eq!(
            default_login_url(&api).unwrap().as_str(),
            "https://platform.vitrine.test/v1/admin/login"
        );
    }

    #[test]
    fn test_secret_validation() {
        assert!(validate_secret_strength("changeme-please", "PLATFORM_API_TOKEN").is_err());
        assert!(validate_secret_strength("zzzzzzzzzzzz", "PLATFORM_API_TOKEN").is_err());
        assert!(validate_secret_strength("svc_Hq83LmZp2Vx7Kd4T", "PLATFORM_API_TOKEN").is_ok());
    }

    #[test]
    fn test_platform_config_debug_redacts_token() {
        let config = PlatformConfig {
            api_url: Url::parse("https://platform.vitrine.test").unwrap(),
            api_token: SecretString::from("svc_Hq83LmZp2Vx7Kd4T"),
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("svc_Hq83LmZp2Vx7Kd4T"));
    }

    #[test]
    fn test_parse_env_default_upload_limit() {
        let limit: usize = DEFAULT_MAX_UPLOAD_BYTES.parse().unwrap();
        assert_eq!(limit, 20 * 1024 * 1024);
    }
}
