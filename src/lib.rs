//! gpt-relay - CORS-enabled relay for OpenAI-compatible chat completions
//!
//! Browsers cannot call most chat-completion APIs directly. This relay
//! accepts the caller's request together with their own API key, forwards a
//! single chat-completion request upstream and hands the answer back with
//! permissive CORS headers.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{MethodRouter, get, post},
};
use tower_http::trace::TraceLayer;

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod telemetry;
pub mod upstream;

use handlers::AppState;

/// Paths that serve the relay
///
/// `/` is the canonical mount; `/api/openai` matches serverless deployments
/// and `/v1/chat/completions` lets OpenAI SDKs use the relay as a base URL.
pub const RELAY_PATHS: [&str; 3] = ["/", "/api/openai", "/v1/chat/completions"];

/// Method router shared by every relay path
fn relay_methods() -> MethodRouter<AppState> {
    post(handlers::proxy::handler)
        .get(handlers::health::handler)
        .options(handlers::proxy::preflight)
        // Without an explicit HEAD route axum would answer HEAD with the GET handler
        .head(handlers::proxy::method_not_allowed)
        .fallback(handlers::proxy::method_not_allowed)
}

/// Build the application router
///
/// Layer order (outermost first): CORS, HTTP tracing, request ID. CORS is
/// outermost so that every response, including 404s, 405s and body
/// rejections, carries the CORS headers.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config().server.max_body_bytes;

    let mut router = Router::new();
    for path in RELAY_PATHS {
        router = router.route(path, relay_methods());
    }

    router
        .route(
            "/metrics",
            get(handlers::metrics::handler)
                .head(handlers::metrics::method_not_allowed)
                .fallback(handlers::metrics::method_not_allowed),
        )
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn(crate::middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(crate::middleware::cors_middleware))
}
