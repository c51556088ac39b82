//! Liveness endpoint
//!
//! `GET` on the relay path answers with a small status payload so browsers
//! and load balancers can check the relay without calling the upstream.

use axum::{Json, http::StatusCode};
use serde::Serialize;

use crate::handlers::{ALLOWED_METHODS, timestamp_now};

/// Liveness response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
    pub methods: [&'static str; 3],
    pub cors: &'static str,
    pub version: &'static str,
}

/// Liveness handler
///
/// Always 200. Never contacts the upstream.
pub async fn handler() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "OK",
            message: "Chat completion relay is running",
            timestamp: timestamp_now(),
            methods: ALLOWED_METHODS,
            cors: "enabled",
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
