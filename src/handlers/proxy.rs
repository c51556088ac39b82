//! Chat completion relay handler
//!
//! Handles `POST` on the relay path: validates the caller's bearer token and
//! body, rewrites the body into an upstream chat-completion request, makes a
//! single upstream call and relays the result. Also provides the `OPTIONS`
//! preflight responder and the 405 fallback for every other method.

use axum::{
    Extension,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::time::Instant;

use crate::error::{AppError, AppResult};
use crate::handlers::{ALLOWED_METHODS, AppState};
use crate::metrics::Outcome;
use crate::middleware::RequestId;
use crate::upstream::RelayRequest;

/// Prefix stripped from the Authorization header value
const BEARER_PREFIX: &str = "Bearer ";

/// Prefix every accepted API key must carry
pub const API_KEY_PREFIX: &str = "sk-";

/// Extract the caller's API key from the Authorization header
///
/// A leading `Bearer ` is stripped; a bare key is accepted as-is. The key
/// must start with `sk-`.
///
/// # Errors
///
/// - `AppError::MissingAuthorization` if the header is absent or blank
/// - `AppError::InvalidApiKeyFormat` if the key is not valid ASCII or lacks
///   the `sk-` prefix
pub fn extract_api_key(headers: &HeaderMap) -> AppResult<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::MissingAuthorization)?;

    if value.as_bytes().iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::MissingAuthorization);
    }

    let value = value.to_str().map_err(|_| AppError::InvalidApiKeyFormat)?;
    let token = value.strip_prefix(BEARER_PREFIX).unwrap_or(value);

    if !token.starts_with(API_KEY_PREFIX) {
        return Err(AppError::InvalidApiKeyFormat);
    }

    Ok(token)
}

/// Mask an API key for logging, keeping only its ends
///
/// `sk-proj-abcdef123456` becomes `sk-p…3456`; short keys keep only the
/// `sk-` prefix.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return format!("{}…", API_KEY_PREFIX);
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

/// POST handler
///
/// # Response
///
/// - `200` with the upstream body byte-for-byte on upstream success
/// - `401` / `400` for a missing or malformed key, or a missing body
/// - the upstream status with `{error, details, status}` on upstream failure
/// - `500` with `{error, details, timestamp}` if the upstream is unreachable
pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    let result = relay(&state, request_id, &headers, body).await;

    let outcome = match &result {
        Ok(_) => Outcome::Success,
        Err(AppError::Upstream { .. }) => Outcome::UpstreamError,
        Err(e) if e.is_client_error() => Outcome::ClientError,
        Err(_) => Outcome::TransportError,
    };
    if let Err(e) = state.metrics().record_request(outcome) {
        tracing::warn!(
            request_id = %request_id,
            error = %e,
            outcome = outcome.as_str(),
            "Failed to record request metric"
        );
    }

    result
}

async fn relay(
    state: &AppState,
    request_id: RequestId,
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    let api_key = extract_api_key(headers).inspect_err(|e| {
        tracing::debug!(request_id = %request_id, error = %e, "Rejected request credentials");
    })?;

    // Checked after credentials so an oversized unauthenticated body still gets 401
    let body = body.map_err(|rejection| AppError::BodyRejected {
        status: rejection.status().as_u16(),
        message: rejection.body_text(),
    })?;

    let request = RelayRequest::from_body(&body)
        .and_then(|parsed| parsed.into_upstream(&state.config().upstream))
        .inspect_err(|e| {
            tracing::debug!(request_id = %request_id, error = %e, "Rejected request body");
        })?;

    tracing::info!(
        request_id = %request_id,
        model = %request.model,
        messages_count = request.messages_count(),
        max_tokens = %request.max_tokens,
        temperature = %request.temperature,
        api_key = %mask_api_key(api_key),
        endpoint = %state.upstream().endpoint(),
        "Sending request upstream"
    );

    let started = Instant::now();
    let result = state.upstream().chat_completion(api_key, &request).await;
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    let (outcome, upstream_status) = match &result {
        Ok(response) => {
            tracing::info!(
                request_id = %request_id,
                status = response.status.as_u16(),
                bytes = response.body.len(),
                elapsed_ms,
                "Upstream request succeeded"
            );
            (Outcome::Success, Some(response.status.as_u16()))
        }
        Err(AppError::Upstream { status, details }) => {
            tracing::warn!(
                request_id = %request_id,
                status,
                details = %details,
                elapsed_ms,
                "Upstream returned an error"
            );
            (Outcome::UpstreamError, Some(*status))
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                error = %e,
                elapsed_ms,
                "Upstream request failed"
            );
            (Outcome::TransportError, None)
        }
    };

    record_upstream_metrics(state, request_id, outcome, upstream_status, elapsed_ms);

    let response = result?;
    Ok((
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
        response.body,
    )
        .into_response())
}

fn record_upstream_metrics(
    state: &AppState,
    request_id: RequestId,
    outcome: Outcome,
    upstream_status: Option<u16>,
    elapsed_ms: f64,
) {
    let metrics = state.metrics();

    if let Err(e) = metrics.record_upstream_duration(outcome, elapsed_ms) {
        tracing::warn!(request_id = %request_id, error = %e, "Failed to record upstream duration");
    }

    if let Some(status) = upstream_status {
        if let Err(e) = metrics.record_upstream_status(status) {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to record upstream status");
        }
    }
}

/// OPTIONS handler: CORS preflight, 200 with an empty body
///
/// The CORS headers themselves are added by the CORS middleware.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Fallback for every method other than GET, POST and OPTIONS
pub async fn method_not_allowed(method: Method) -> AppError {
    tracing::debug!(method = %method, "Method not allowed");
    AppError::MethodNotAllowed {
        method,
        allowed: &ALLOWED_METHODS,
    }
}
