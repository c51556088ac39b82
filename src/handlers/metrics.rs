//! Prometheus metrics endpoint
//!
//! Exposes metrics in Prometheus text format for scraping.

use axum::{
    extract::State,
    http::{Method, StatusCode},
};

use crate::error::AppError;
use crate::handlers::AppState;

/// Methods the metrics endpoint answers
pub const METRICS_METHODS: [&str; 1] = ["GET"];

/// Metrics handler for Prometheus scraping
///
/// # Response
///
/// - `200 OK` with metrics in Prometheus text format
/// - `500 Internal Server Error` if metrics collection fails
///
/// # Example
///
/// ```bash
/// curl http://localhost:3000/metrics
/// # HELP gpt_relay_requests_total Total number of relayed chat completion requests by outcome
/// # TYPE gpt_relay_requests_total counter
/// gpt_relay_requests_total{outcome="success"} 42
/// ```
pub async fn handler(State(state): State<AppState>) -> (StatusCode, String) {
    match state.metrics().gather() {
        Ok(output) => (StatusCode::OK, output),
        Err(e) => {
            tracing::error!(error = %e, "Failed to gather metrics for Prometheus scraping");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to gather metrics: {}", e),
            )
        }
    }
}

/// Fallback for every method other than GET on `/metrics`
pub async fn method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed {
        method,
        allowed: &METRICS_METHODS,
    }
}
