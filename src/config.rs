//! Configuration management for gpt-relay
//!
//! Parses TOML configuration files and provides typed access to settings.
//! Every section is optional; a missing section falls back to the built-in
//! defaults, so the relay runs without any configuration file at all.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Configuration file read when no `--config` is given, if it exists
pub const DEFAULT_CONFIG_PATH: &str = "gpt-relay.toml";

/// Upstream chat-completions API used when none is configured
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://api.openai.com/v1";

/// Model forwarded when the caller omits `model`
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// `max_tokens` forwarded when the caller omits it
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

/// `temperature` forwarded when the caller omits it
pub const DEFAULT_TEMPERATURE: f64 = 0.9;

/// Default request body limit (10 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Upper bound for `upstream.timeout_seconds`
pub const MAX_TIMEOUT_SECONDS: u64 = 600;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest accepted request body in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Upstream chat-completions API configuration
///
/// The API key is never configured here: it is supplied per request by the
/// caller and forwarded verbatim.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Base URL including the API version prefix, e.g. `https://api.openai.com/v1`
    #[serde(default = "default_base_url")]
    base_url: String,
    #[serde(default = "default_user_agent")]
    user_agent: String,
    #[serde(default = "default_model")]
    default_model: String,
    #[serde(default = "default_max_tokens")]
    default_max_tokens: u32,
    #[serde(default = "default_temperature")]
    default_temperature: f64,
    /// Optional bound on the upstream round trip; unset means no timeout
    #[serde(default)]
    timeout_seconds: Option<u64>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            default_model: default_model(),
            default_max_tokens: default_max_tokens(),
            default_temperature: default_temperature(),
            timeout_seconds: None,
        }
    }
}

impl UpstreamConfig {
    /// Create an upstream configuration pointing at `base_url` with all other
    /// settings at their defaults
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the upstream timeout
    pub fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of the chat-completions endpoint
    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn default_max_tokens(&self) -> u32 {
        self.default_max_tokens
    }

    pub fn default_temperature(&self) -> f64 {
        self.default_temperature
    }

    pub fn timeout_seconds(&self) -> Option<u64> {
        self.timeout_seconds
    }
}

fn default_base_url() -> String {
    DEFAULT_UPSTREAM_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    format!("gpt-relay/{}", env!("CARGO_PKG_VERSION"))
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|source| AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            })?;

        let config: Self = toml::from_str(&content).map_err(|source| {
            AppError::ConfigParseFailed {
                path: path_display.clone(),
                source,
            }
        })?;

        config
            .validate()
            .map_err(|e| AppError::ConfigValidationFailed {
                path: path_display,
                reason: e.to_string(),
            })?;

        Ok(config)
    }

    /// Resolve the configuration the binary starts with
    ///
    /// An explicit path must exist. Without one, `DEFAULT_CONFIG_PATH` is
    /// loaded if present and the built-in defaults are used otherwise.
    pub fn load(explicit: Option<&Path>) -> AppResult<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_file(DEFAULT_CONFIG_PATH),
            None => Ok(Self::default()),
        }
    }

    /// Validate configuration after parsing
    ///
    /// Called automatically by `from_file()`, but can also be called
    /// explicitly when constructing Config via other means (e.g., in tests).
    pub fn validate(&self) -> AppResult<()> {
        if self.server.max_body_bytes == 0 {
            return Err(AppError::Config(
                "server.max_body_bytes must be greater than 0".to_string(),
            ));
        }

        let upstream = &self.upstream;

        if !(upstream.base_url.starts_with("http://") || upstream.base_url.starts_with("https://"))
        {
            return Err(AppError::Config(format!(
                "upstream.base_url must start with http:// or https://, got '{}'",
                upstream.base_url
            )));
        }

        if upstream.user_agent.trim().is_empty() {
            return Err(AppError::Config(
                "upstream.user_agent cannot be empty".to_string(),
            ));
        }

        if upstream.default_model.trim().is_empty() {
            return Err(AppError::Config(
                "upstream.default_model cannot be empty".to_string(),
            ));
        }

        if upstream.default_max_tokens == 0 {
            return Err(AppError::Config(
                "upstream.default_max_tokens must be greater than 0".to_string(),
            ));
        }

        // NaN fails the range check too
        if !(0.0..=2.0).contains(&upstream.default_temperature) {
            return Err(AppError::Config(format!(
                "upstream.default_temperature must be between 0.0 and 2.0, got {}",
                upstream.default_temperature
            )));
        }

        if let Some(timeout) = upstream.timeout_seconds {
            if timeout == 0 || timeout > MAX_TIMEOUT_SECONDS {
                return Err(AppError::Config(format!(
                    "upstream.timeout_seconds must be in 1..={}, got {}",
                    MAX_TIMEOUT_SECONDS, timeout
                )));
            }
        }

        if !VALID_LOG_LEVELS.contains(&self.observability.log_level.as_str()) {
            return Err(AppError::Config(format!(
                "observability.log_level must be one of {:?}, got '{}'",
                VALID_LOG_LEVELS, self.observability.log_level
            )));
        }

        Ok(())
    }
}
