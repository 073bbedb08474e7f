//! Header rewrite policy for both forwarding directions.
//!
//! Request direction (client → upstream): everything passes through except
//! `Host`, which is forced to the authority of the configured base URL.
//! Response direction (upstream → client): everything passes through except
//! `Transfer-Encoding`, with `Content-Length` recomputed for the buffered
//! body when neither an explicit length nor chunked framing was present.

use std::net::SocketAddr;

use axum::http::header::{
    HeaderMap, HeaderValue, CONNECTION, CONTENT_LENGTH, HOST, TRANSFER_ENCODING,
};
use axum::http::HeaderName;

static X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");
static X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
static X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Rewrite client headers for the upstream request.
///
/// Copies every header except `Host` (duplicates and order preserved), then
/// sets `Host` to the upstream authority. `Connection`, `Upgrade`, and cookie
/// headers pass through unchanged.
pub fn rewrite_request_headers(client_headers: &HeaderMap, authority: &HeaderValue) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(client_headers.len() + 1);
    for (name, value) in client_headers {
        if name != HOST {
            headers.append(name.clone(), value.clone());
        }
    }
    headers.insert(HOST, authority.clone());
    headers
}

/// Stamp forwarded-client headers onto an upstream request.
///
/// `X-Forwarded-For` keeps an existing value and otherwise records the peer
/// address; `X-Real-IP` is always the direct peer; `X-Forwarded-Proto` is the
/// scheme the client used to reach the listener.
pub fn stamp_forwarded_headers(headers: &mut HeaderMap, peer: SocketAddr, proto: &'static str) {
    let peer_ip = peer.ip().to_string();
    if let Ok(value) = HeaderValue::from_str(&peer_ip) {
        if !headers.contains_key(&X_FORWARDED_FOR) {
            headers.insert(X_FORWARDED_FOR.clone(), value.clone());
        }
        headers.insert(X_REAL_IP.clone(), value);
    }
    headers.insert(X_FORWARDED_PROTO.clone(), HeaderValue::from_static(proto));
}

/// Rewrite upstream headers for the client response.
///
/// `Transfer-Encoding` is dropped unconditionally; the body is re-sent fully
/// buffered. If no `Content-Length` survives and the upstream response was
/// not chunked, the exact buffered length is inserted. `HeaderMap` keys are
/// case-insensitive, so the length is written under a single entry.
pub fn rewrite_response_headers(upstream_headers: &HeaderMap, body_len: usize) -> HeaderMap {
    let chunked = is_chunked(upstream_headers);
    let mut headers = HeaderMap::with_capacity(upstream_headers.len() + 1);
    for (name, value) in upstream_headers {
        if name != TRANSFER_ENCODING {
            headers.append(name.clone(), value.clone());
        }
    }
    if !chunked && !headers.contains_key(CONTENT_LENGTH) {
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body_len));
    }
    headers
}

/// Whether a response used chunked transfer encoding.
pub fn is_chunked(headers: &HeaderMap) -> bool {
    headers
        .get(TRANSFER_ENCODING)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.eq_ignore_ascii_case("chunked"))
        .unwrap_or(false)
}

/// Whether the client asked for a protocol upgrade: the `Connection` header
/// contains "upgrade" as a case-insensitive substring.
pub fn is_upgrade_request(headers: &HeaderMap) -> bool {
    headers
        .get(CONNECTION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_ascii_lowercase().contains("upgrade"))
        .unwrap_or(false)
}
