//! HTTP client for the upstream chat-completions API
//!
//! One `reqwest::Client` is built at startup and shared by every request so
//! connections to the upstream are pooled. Each call makes exactly one
//! attempt; there are no retries.

use axum::body::Bytes;
use reqwest::StatusCode;
use std::time::Duration;

use super::types::{UpstreamRequest, upstream_error_message};
use crate::config::UpstreamConfig;
use crate::error::{AppError, AppResult};

/// Details reported when the upstream error body carries no message
pub const UNKNOWN_UPSTREAM_ERROR: &str = "Unknown error";

/// Successful upstream reply, body kept byte-for-byte
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Client for the upstream chat-completions endpoint
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    endpoint: String,
}

impl UpstreamClient {
    /// Build a client from upstream configuration
    ///
    /// The configured user agent is attached to every request. A timeout is
    /// applied only when `timeout_seconds` is set.
    pub fn new(config: &UpstreamConfig) -> AppResult<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent());

        if let Some(seconds) = config.timeout_seconds() {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        let http = builder.build().map_err(AppError::HttpClient)?;

        Ok(Self {
            http,
            endpoint: config.chat_completions_url(),
        })
    }

    /// Full URL requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one chat completion request with the caller's API key
    ///
    /// # Errors
    ///
    /// - `AppError::Upstream` when the upstream answers non-2xx, carrying its
    ///   status and error message
    /// - `AppError::Transport` when the upstream cannot be reached, the body
    ///   cannot be read, or a 2xx body is not valid JSON
    pub async fn chat_completion(
        &self,
        api_key: &str,
        request: &UpstreamRequest,
    ) -> AppResult<UpstreamResponse> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Transport(error_chain(&e)))?;

        let status = response.status();

        if !status.is_success() {
            // A body that cannot be read still yields the upstream status
            let details = response
                .bytes()
                .await
                .ok()
                .and_then(|body| upstream_error_message(&body))
                .unwrap_or_else(|| UNKNOWN_UPSTREAM_ERROR.to_string());

            return Err(AppError::Upstream {
                status: status.as_u16(),
                details,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::Transport(error_chain(&e)))?;

        serde_json::from_slice::<serde::de::IgnoredAny>(&body).map_err(|e| {
            AppError::Transport(format!("Upstream returned invalid JSON: {}", e))
        })?;

        Ok(UpstreamResponse { status, body })
    }
}

/// Render an error with its full source chain
///
/// reqwest's top-level message ("error sending request for url ...") hides
/// the cause; callers need the "connection refused" underneath.
pub fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        let cause_message = cause.to_string();
        if !message.contains(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }

    message
}
