//! HTTP request handlers for the relay

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::metrics::Metrics;
use crate::upstream::UpstreamClient;
use std::sync::Arc;

pub mod health;
pub mod metrics;
pub mod proxy;

/// Methods the relay endpoint answers, reported in 405 bodies and GET payloads
pub const ALLOWED_METHODS: [&str; 3] = ["GET", "POST", "OPTIONS"];

/// Current time as an RFC 3339 UTC timestamp with millisecond precision
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Application state shared across all handlers
///
/// All fields are Arc'd for cheap cloning across Axum handlers. Nothing in
/// here is mutated per request.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    upstream: Arc<UpstreamClient>,
    metrics: Arc<Metrics>,
}

impl AppState {
    /// Create a new AppState from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream HTTP client cannot be built or the
    /// metrics registry rejects a metric.
    pub fn new(config: Arc<Config>) -> AppResult<Self> {
        let upstream = Arc::new(UpstreamClient::new(&config.upstream)?);
        let metrics = Arc::new(Metrics::new().map_err(AppError::Metrics)?);

        Ok(Self {
            config,
            upstream,
            metrics,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn upstream(&self) -> &UpstreamClient {
        &self.upstream
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }
}

/// Fallback for paths the relay does not serve
pub async fn not_found() -> AppError {
    AppError::NotFound
}
