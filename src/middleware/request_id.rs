//! Request ID middleware for log correlation
//!
//! Tags each relayed request with a UUID that appears in every log line of
//! the forwarding path and is echoed to the caller as `x-request-id`. A
//! caller-supplied UUID is reused so browser and relay logs line up.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use uuid::Uuid;

/// Request ID header name
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID wrapper type for Axum extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// Generate a new random request ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reuse the caller's ID when it is a well-formed UUID, otherwise mint one
    pub fn from_header(value: Option<&HeaderValue>) -> Self {
        value
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .map(Self)
            .unwrap_or_default()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Middleware that attaches a request ID to each request and its response
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::from_header(request.headers().get(REQUEST_ID_HEADER));

    tracing::debug!(
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
        "Incoming request"
    );

    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;

    if let Ok(header_value) = HeaderValue::from_str(&request_id.to_string()) {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER, header_value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reuses_valid_caller_uuid() {
        let id = "6f1c2a9e-3b4d-4c5e-8f70-123456789abc";
        let value = HeaderValue::from_static(id);
        let request_id = RequestId::from_header(Some(&value));
        assert_eq!(request_id.to_string(), id);
    }

    #[test]
    fn test_mints_new_id_for_garbage_header() {
        let value = HeaderValue::from_static("not-a-uuid");
        let request_id = RequestId::from_header(Some(&value));
        assert_ne!(request_id.to_string(), "not-a-uuid");
        assert_eq!(request_id.0.get_version_num(), 4);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }
}
