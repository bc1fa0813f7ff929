use axum::http::{header, HeaderName, Method};
use tower_http::cors::{Any, CorsLayer};

use super::auth::TOKEN_HEADER;

pub fn api_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(TOKEN_HEADER),
        ])
        .allow_origin(Any)
}
