//! Inbound relay body and outbound chat-completion request
//!
//! The inbound body is loose: only `messages` is required and every field is
//! carried as raw JSON, so the upstream remains the judge of message shape and
//! sampling values. Unknown fields are dropped. The outbound body always
//! carries every sampling field, with configured defaults filling the gaps and
//! the two penalties pinned.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::UpstreamConfig;
use crate::error::{AppError, AppResult};

/// `presence_penalty` sent on every upstream request
pub const PRESENCE_PENALTY: f64 = 0.6;

/// `frequency_penalty` sent on every upstream request
pub const FREQUENCY_PENALTY: f64 = 0.8;

/// Body accepted on `POST`
///
/// A field set to JSON `null` counts as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelayRequest {
    pub messages: Option<Value>,
    pub model: Option<Value>,
    pub temperature: Option<Value>,
    pub max_tokens: Option<Value>,
}

impl RelayRequest {
    /// Parse a raw request body
    ///
    /// An empty body, a JSON `null` or a non-object body is treated as a
    /// missing body. Malformed JSON is reported as a missing body with the
    /// parse error attached.
    pub fn from_body(body: &[u8]) -> AppResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(AppError::MissingMessages { details: None });
        }

        let parsed: Value = serde_json::from_slice(body).map_err(|e| AppError::MissingMessages {
            details: Some(e.to_string()),
        })?;

        match parsed {
            Value::Object(fields) => Ok(Self::from_fields(fields)),
            _ => Err(AppError::MissingMessages { details: None }),
        }
    }

    fn from_fields(mut fields: Map<String, Value>) -> Self {
        let mut take = |key: &str| fields.remove(key).filter(|value| !value.is_null());

        Self {
            messages: take("messages"),
            model: take("model"),
            temperature: take("temperature"),
            max_tokens: take("max_tokens"),
        }
    }

    /// Rewrite into the upstream request, applying configured defaults
    pub fn into_upstream(self, defaults: &UpstreamConfig) -> AppResult<UpstreamRequest> {
        let messages = self
            .messages
            .ok_or(AppError::MissingMessages { details: None })?;

        Ok(UpstreamRequest {
            model: self
                .model
                .unwrap_or_else(|| Value::from(defaults.default_model())),
            messages,
            max_tokens: self
                .max_tokens
                .unwrap_or_else(|| Value::from(defaults.default_max_tokens())),
            temperature: self
                .temperature
                .unwrap_or_else(|| Value::from(defaults.default_temperature())),
            presence_penalty: PRESENCE_PENALTY,
            frequency_penalty: FREQUENCY_PENALTY,
        })
    }
}

/// Body sent to the upstream chat-completions endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpstreamRequest {
    pub model: Value,
    pub messages: Value,
    pub max_tokens: Value,
    pub temperature: Value,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
}

impl UpstreamRequest {
    /// Number of messages, when `messages` is an array
    pub fn messages_count(&self) -> usize {
        self.messages.as_array().map_or(0, Vec::len)
    }
}

/// Extract the upstream's error message from an error response body
///
/// Understands the OpenAI shape `{"error": {"message": ...}}` as well as a
/// bare `{"error": "..."}` used by some compatible servers.
pub fn upstream_error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let error = value.get("error")?;

    error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .map(str::to_string)
}
