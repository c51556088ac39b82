//! CORS headers for every response
//!
//! Browsers call the relay directly, so every response (success, error,
//! preflight or 405) carries the same permissive CORS header set. The
//! requesting Origin is echoed back so credentialed requests are accepted;
//! without an Origin the wildcard is used.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::Response,
};

/// Methods advertised in `Access-Control-Allow-Methods`
pub const CORS_ALLOW_METHODS: &str = "GET,POST,PUT,DELETE,OPTIONS,PATCH";

/// Request headers browsers may send cross-origin
pub const CORS_ALLOW_HEADERS: &str = "X-CSRF-Token, X-Requested-With, Accept, Accept-Version, \
    Content-Length, Content-MD5, Content-Type, Date, X-Api-Version, Authorization";

/// Preflight cache lifetime in seconds (one day)
pub const CORS_MAX_AGE: &str = "86400";

/// Build the CORS response headers for a request with the given Origin
///
/// An absent or empty Origin yields `Access-Control-Allow-Origin: *`.
pub fn cors_headers(origin: Option<&HeaderValue>) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(6);

    match origin.filter(|value| !value.is_empty()) {
        Some(origin) => {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            headers.insert(header::VARY, HeaderValue::from_static("Origin"));
        }
        None => {
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            );
        }
    }

    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(CORS_ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(CORS_ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(CORS_MAX_AGE),
    );

    headers
}

/// Middleware that stamps the CORS header set onto every response
///
/// Runs outermost so that rejections, 405 fallbacks and error responses
/// carry the headers too.
pub async fn cors_middleware(request: Request, next: Next) -> Response {
    let origin = request.headers().get(header::ORIGIN).cloned();

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .extend(cors_headers(origin.as_ref()));

    response
}
