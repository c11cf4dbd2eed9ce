//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `GRAYSHOP_API_BASE` - Backend base URL (default: `http://127.0.0.1:8080`)
//! - `GRAYSHOP_TOKEN_FILE` - Token storage file (default: `.grayshop/storage.json`)
//! - `GRAYSHOP_TOKEN_KEY` - Storage key holding the bearer token (default: `token`)
//! - `GRAYSHOP_PAGE_SIZE` - Orders per page, 1-50 (default: 20)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate, 0.0-1.0 (default: 1.0)

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE: &str = "http://127.0.0.1:8080";
const DEFAULT_TOKEN_FILE: &str = ".grayshop/storage.json";
const DEFAULT_TOKEN_KEY: &str = "token";
const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page size the backend honors; anything above is reset server-side.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend base URL; API paths are joined onto it
    pub api_base: Url,
    /// File backing the token store
    pub token_file: PathBuf,
    /// Key under which the bearer token is stored
    pub token_key: String,
    /// Page size used when listing orders
    pub page_size: u32,
    /// Sentry error tracking configuration
    pub sentry: SentryConfig,
}

/// Sentry configuration. Tracking is disabled when no DSN is set.
#[derive(Debug, Clone, Default)]
pub struct SentryConfig {
    /// Sentry DSN for error tracking
    pub dsn: Option<String>,
    /// Environment tag (e.g. `production`)
    pub environment: Option<String>,
    /// Error event sample rate
    pub sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base = parse_api_base(
            "GRAYSHOP_API_BASE",
            &get_env_or_default("GRAYSHOP_API_BASE", DEFAULT_API_BASE),
        )?;
        let token_file = PathBuf::from(get_env_or_default(
            "GRAYSHOP_TOKEN_FILE",
            DEFAULT_TOKEN_FILE,
        ));
        let token_key = get_env_or_default("GRAYSHOP_TOKEN_KEY", DEFAULT_TOKEN_KEY);
        let page_size = parse_page_size(
            "GRAYSHOP_PAGE_SIZE",
            get_optional_env("GRAYSHOP_PAGE_SIZE").as_deref(),
        )?;

        Ok(Self {
            api_base,
            token_file,
            token_key,
            page_size,
            sentry: SentryConfig::from_env()?,
        })
    }

    /// Configuration pointing at `api_base` with every other setting defaulted.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_base` is not an absolute http(s) URL.
    pub fn for_base_url(api_base: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base: parse_api_base("api_base", api_base)?,
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            sentry: SentryConfig::default(),
        })
    }

    /// Override the backend base URL (e.g. from a CLI flag).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_base` is not an absolute http(s) URL.
    pub fn with_api_base(mut self, api_base: &str) -> Result<Self, ConfigError> {
        self.api_base = parse_api_base("--api-base", api_base)?;
        Ok(self)
    }
}

impl SentryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let sample_rate = match get_optional_env("SENTRY_SAMPLE_RATE") {
            Some(raw) => raw
                .parse::<f32>()
                .ok()
                .filter(|rate| (0.0..=1.0).contains(rate))
                .ok_or_else(|| {
                    ConfigError::InvalidEnvVar(
                        "SENTRY_SAMPLE_RATE".to_string(),
                        format!("expected a number between 0.0 and 1.0, got '{raw}'"),
                    )
                })?,
            None => 1.0,
        };

        Ok(Self {
            dsn: get_optional_env("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sample_rate,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse the backend base URL, requiring an absolute http(s) URL.
///
/// A trailing slash is ensured so that `Url::join` appends paths instead of
/// replacing the last segment.
fn parse_api_base(var_name: &str, raw: &str) -> Result<Url, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidEnvVar(var_name.to_string(), msg);

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Parse the order page size, defaulting when unset.
fn parse_page_size(var_name: &str, raw: Option<&str>) -> Result<u32, ConfigError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_PAGE_SIZE);
    };
    match raw.trim().parse::<u32>() {
        Ok(size) if (1..=MAX_PAGE_SIZE).contains(&size) => Ok(size),
        _ => Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("expected 1-{MAX_PAGE_SIZE}, got '{raw}'"),
        )),
    }
}
