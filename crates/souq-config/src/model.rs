// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Souq.
//!
//! [`SouqConfig`] is the merged file/environment shape and rejects unknown
//! keys. [`StorefrontConfig`] is the validated snapshot the rest of the
//! process reads; it can only be built through validation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::diagnostic::ConfigError;
use crate::validation;

/// Placeholder public URL used until a real deployment URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://your-app.onrender.com";

/// Merged configuration as read from defaults, environment, and `souq.toml`.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SouqConfig {
    /// Telegram Bot API token. Empty means "not configured" and fails validation.
    #[serde(default)]
    pub bot_token: String,

    /// Directory holding product photos.
    #[serde(default = "default_photos_dir")]
    pub photos_dir: String,

    /// Path of the JSON product catalog.
    #[serde(default = "default_catalog_file")]
    pub catalog_file: String,

    /// Public base URL used by templates for absolute links.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Refresh and bot polling timings.
    #[serde(default)]
    pub polling: PollingConfig,
}

impl Default for SouqConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            photos_dir: default_photos_dir(),
            catalog_file: default_catalog_file(),
            base_url: default_base_url(),
            log_level: default_log_level(),
            server: ServerConfig::default(),
            polling: PollingConfig::default(),
        }
    }
}

impl std::fmt::Debug for SouqConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SouqConfig")
            .field("bot_token", &redacted(&self.bot_token))
            .field("photos_dir", &self.photos_dir)
            .field("catalog_file", &self.catalog_file)
            .field("base_url", &self.base_url)
            .field("log_level", &self.log_level)
            .field("server", &self.server)
            .field("polling", &self.polling)
            .finish()
    }
}

fn default_photos_dir() -> String {
    "photos".to_string()
}

fn default_catalog_file() -> String {
    "products.json".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind. The `PORT` environment variable maps here.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    10000
}

/// Timings for the config refresher and the bot receive loop.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PollingConfig {
    /// Seconds between configuration reloads.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Seconds to wait after a failed receive loop before retrying.
    #[serde(default = "default_retry_backoff_secs")]
    pub retry_backoff_secs: u64,

    /// Long-poll timeout passed to the messaging backend. Must stay below
    /// the HTTP client's 17 second request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
            retry_backoff_secs: default_retry_backoff_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl PollingConfig {
    /// Period between configuration reloads. Zero falls back to the default.
    pub fn refresh_interval(&self) -> Duration {
        if self.refresh_interval_secs == 0 {
            warn!(
                default_secs = default_refresh_interval_secs(),
                "polling.refresh_interval_secs is 0, using the default"
            );
            return Duration::from_secs(default_refresh_interval_secs());
        }
        Duration::from_secs(self.refresh_interval_secs)
    }
}

fn default_refresh_interval_secs() -> u64 {
    60
}

fn default_retry_backoff_secs() -> u64 {
    5
}

fn default_timeout_secs() -> u32 {
    10
}

/// Validated, immutable storefront configuration snapshot.
///
/// Once built, the photo directory exists on disk. Snapshots are replaced
/// wholesale by the next successful load and never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    bot_token: String,
    photos_dir: PathBuf,
    catalog_file: PathBuf,
    base_url: String,
}

impl StorefrontConfig {
    /// Validates `raw` and creates the photo directory if it is missing.
    pub fn validated(raw: &SouqConfig) -> Result<Self, ConfigError> {
        validation::validate_config(raw)?;
        let photos_dir = PathBuf::from(&raw.photos_dir);
        validation::ensure_dir(&photos_dir)?;
        Ok(Self {
            bot_token: raw.bot_token.trim().to_string(),
            photos_dir,
            catalog_file: PathBuf::from(&raw.catalog_file),
            base_url: raw.base_url.clone(),
        })
    }

    pub fn bot_token(&self) -> &str {
        &self.bot_token
    }

    pub fn photos_dir(&self) -> &Path {
        &self.photos_dir
    }

    pub fn catalog_file(&self) -> &Path {
        &self.catalog_file
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The token shortened for logs and the admin page.
    pub fn masked_token(&self) -> String {
        mask_token(&self.bot_token)
    }
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("bot_token", &redacted(&self.bot_token))
            .field("photos_dir", &self.photos_dir)
            .field("catalog_file", &self.catalog_file)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Keeps the first 10 characters of a token and appends `...`.
pub fn mask_token(token: &str) -> String {
    let prefix: String = token.chars().take(10).collect();
    format!("{prefix}...")
}

fn redacted(token: &str) -> &'static str {
    if token.is_empty() { "<unset>" } else { "[redacted]" }
}
