//! Middleware applied to every relay response

pub mod cors;
pub mod request_id;

pub use cors::{cors_headers, cors_middleware};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
