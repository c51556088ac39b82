//! Error types for gpt-relay
//!
//! All errors implement `IntoResponse` for Axum handlers. Every failure path
//! produces a JSON body with at least an `error` field.

use axum::{
    Json,
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::handlers::timestamp_now;

/// `error` field reported when the upstream API answers with a non-2xx status
pub const UPSTREAM_ERROR_LABEL: &str = "OpenAI API Error";

/// `error` field reported when the upstream API could not be reached or parsed
pub const TRANSPORT_ERROR_LABEL: &str = "Proxy server error";

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read config file '{path}': {source}")]
    ConfigFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ConfigParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration in '{path}': {reason}")]
    ConfigValidationFailed { path: String, reason: String },

    #[error("Failed to build upstream HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Failed to register metrics: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Authorization header missing")]
    MissingAuthorization,

    #[error("Invalid API key format")]
    InvalidApiKeyFormat,

    #[error("Request body or messages missing")]
    MissingMessages { details: Option<String> },

    #[error("{message}")]
    BodyRejected { status: u16, message: String },

    #[error("Method not allowed: {method}")]
    MethodNotAllowed {
        method: Method,
        allowed: &'static [&'static str],
    },

    #[error("Not found")]
    NotFound,

    #[error("Upstream returned {status}: {details}")]
    Upstream { status: u16, details: String },

    #[error("Upstream request failed: {0}")]
    Transport(String),
}

impl AppError {
    /// Whether the caller caused this error (4xx other than upstream pass-through)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingAuthorization
                | Self::InvalidApiKeyFormat
                | Self::MissingMessages { .. }
                | Self::BodyRejected { .. }
                | Self::MethodNotAllowed { .. }
                | Self::NotFound
        )
    }

    /// HTTP status this error is reported with
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingAuthorization | Self::InvalidApiKeyFormat => StatusCode::UNAUTHORIZED,
            Self::MissingMessages { .. } => StatusCode::BAD_REQUEST,
            Self::BodyRejected { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
            }
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::NotFound => StatusCode::NOT_FOUND,
            // reqwest only yields representable statuses
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Transport(_)
            | Self::Config(_)
            | Self::ConfigFileRead { .. }
            | Self::ConfigParseFailed { .. }
            | Self::ConfigValidationFailed { .. }
            | Self::HttpClient(_)
            | Self::Metrics(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            Self::MissingMessages {
                details: Some(details),
            } => serde_json::json!({
                "error": self.to_string(),
                "details": details,
            }),
            Self::MethodNotAllowed { allowed, .. } => serde_json::json!({
                "error": "Method not allowed",
                "allowed": allowed,
            }),
            Self::Upstream { status, details } => serde_json::json!({
                "error": UPSTREAM_ERROR_LABEL,
                "details": details,
                "status": status,
            }),
            Self::Transport(details) => serde_json::json!({
                "error": TRANSPORT_ERROR_LABEL,
                "details": details,
                "timestamp": timestamp_now(),
            }),
            _ => serde_json::json!({
                "error": self.to_string(),
            }),
        };

        let mut response = (status, Json(body)).into_response();

        if let Self::MethodNotAllowed { allowed, .. } = &self {
            if let Ok(value) = HeaderValue::from_str(&allowed.join(", ")) {
                response.headers_mut().insert(header::ALLOW, value);
            }
        }

        response
    }
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("should read body");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    #[test]
    fn test_client_error_messages_match_wire_format() {
        assert_eq!(
            AppError::MissingAuthorization.to_string(),
            "Authorization header missing"
        );
        assert_eq!(
            AppError::InvalidApiKeyFormat.to_string(),
            "Invalid API key format"
        );
        assert_eq!(
            AppError::MissingMessages { details: None }.to_string(),
            "Request body or messages missing"
        );
    }

    #[test]
    fn test_config_error_creates() {
        let err = AppError::Config("test error".to_string());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(AppError::MissingAuthorization.is_client_error());
        assert!(
            AppError::MethodNotAllowed {
                method: Method::PUT,
                allowed: &["GET"],
            }
            .is_client_error()
        );
        assert!(
            !AppError::Upstream {
                status: 400,
                details: "bad".to_string()
            }
            .is_client_error()
        );
        assert!(!AppError::Transport("refused".to_string()).is_client_error());
    }

    #[tokio::test]
    async fn test_missing_authorization_response() {
        let response = AppError::MissingAuthorization.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(
            body,
            serde_json::json!({ "error": "Authorization header missing" })
        );
    }

    #[tokio::test]
    async fn test_missing_messages_with_details_response() {
        let response = AppError::MissingMessages {
            details: Some("expected value at line 1 column 1".to_string()),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Request body or messages missing");
        assert_eq!(body["details"], "expected value at line 1 column 1");
    }

    #[tokio::test]
    async fn test_body_rejected_keeps_status() {
        let response = AppError::BodyRejected {
            status: 413,
            message: "Failed to buffer the request body: length limit exceeded".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = body_json(response).await;
        assert_eq!(
            body["error"],
            "Failed to buffer the request body: length limit exceeded"
        );
    }

    #[tokio::test]
    async fn test_method_not_allowed_response() {
        let response = AppError::MethodNotAllowed {
            method: Method::DELETE,
            allowed: &["GET", "POST", "OPTIONS"],
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.headers().get(header::ALLOW).unwrap(),
            "GET, POST, OPTIONS"
        );
        let body = body_json(response).await;
        assert_eq!(body["error"], "Method not allowed");
        assert_eq!(body["allowed"], serde_json::json!(["GET", "POST", "OPTIONS"]));
    }

    #[tokio::test]
    async fn test_method_not_allowed_reports_route_methods() {
        let response = AppError::MethodNotAllowed {
            method: Method::POST,
            allowed: &["GET"],
        }
        .into_response();
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "GET");
        let body = body_json(response).await;
        assert_eq!(body["allowed"], serde_json::json!(["GET"]));
    }

    #[tokio::test]
    async fn test_upstream_error_passes_status_through() {
        let response = AppError::Upstream {
            status: 429,
            details: "rate limited".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = body_json(response).await;
        assert_eq!(
            body,
            serde_json::json!({
                "error": "OpenAI API Error",
                "details": "rate limited",
                "status": 429,
            })
        );
    }

    #[tokio::test]
    async fn test_transport_error_response_has_timestamp() {
        let response = AppError::Transport("connection refused".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Proxy server error");
        assert_eq!(body["details"], "connection refused");
        assert!(body["timestamp"].is_string());
    }

    #[test]
    fn test_config_error_response_status() {
        let err = AppError::Config("test".to_string());
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
