//! Upstream chat-completions API: request types and HTTP client

pub mod client;
pub mod types;

pub use client::{UpstreamClient, UpstreamResponse};
pub use types::{FREQUENCY_PENALTY, PRESENCE_PENALTY, RelayRequest, UpstreamRequest};
