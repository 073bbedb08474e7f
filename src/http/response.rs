//! Response assembly from the buffered upstream response.
//!
//! The status code passes through unchanged and the body is the buffered
//! bytes, untransformed; only the headers are rewritten.

use axum::body::{Body, Bytes};
use axum::http::header::{HeaderMap, HeaderValue, HeaderName};
use axum::http::{Response, StatusCode};

use crate::http::headers::rewrite_response_headers;

static ALLOW_ORIGIN: HeaderName = HeaderName::from_static("access-control-allow-origin");
static ALLOW_METHODS: HeaderName = HeaderName::from_static("access-control-allow-methods");
static ALLOW_HEADERS: HeaderName = HeaderName::from_static("access-control-allow-headers");
static EXPOSE_HEADERS: HeaderName = HeaderName::from_static("access-control-expose-headers");

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS, PUT, DELETE, PATCH";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization, X-Requested-With";

/// Build the client-facing response from a buffered upstream response.
pub fn assemble(
    status: StatusCode,
    upstream_headers: &HeaderMap,
    body: Bytes,
    cors_enabled: bool,
) -> Response<Body> {
    let mut headers = rewrite_response_headers(upstream_headers, body.len());
    if cors_enabled {
        headers.insert(ALLOW_ORIGIN.clone(), HeaderValue::from_static("*"));
        headers.insert(
            ALLOW_METHODS.clone(),
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            ALLOW_HEADERS.clone(),
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        headers.insert(
            EXPOSE_HEADERS.clone(),
            HeaderValue::from_static("Content-Length, Content-Type"),
        );
    }

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Answer a CORS preflight locally; it never reaches the upstream.
pub fn cors_preflight() -> Response<Body> {
    let mut response = Response::new(Body::empty());
    let headers = response.headers_mut();
    headers.insert(ALLOW_ORIGIN.clone(), HeaderValue::from_static("*"));
    headers.insert(
        ALLOW_METHODS.clone(),
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        ALLOW_HEADERS.clone(),
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    response
}
