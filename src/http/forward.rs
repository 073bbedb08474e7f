//! The HTTP forwarder: one non-upgraded request/response cycle.
//!
//! # Responsibilities
//! - Resolve the target URL and rewrite headers for the upstream
//! - Detect upgrade requests and hand them to the WebSocket relay
//! - Buffer the request body, issue the upstream request, buffer the response
//! - Collapse every transport failure into a single 502 response
//!
//! # Design Decisions
//! - Bodies are fully buffered in both directions; memory is bounded by the
//!   largest single body in flight. Streaming is a deliberate non-goal.
//! - Every forward attempt is single-shot. No retries anywhere.
//! - Transport failures stop here. Nothing above or below this layer sees
//!   them; the client sees 502, the log sees the target URL.

use std::net::SocketAddr;
use std::time::Instant;

use axum::body::Body;
use axum::extract::ws::WebSocketUpgrade;
use axum::http::{Method, Request, Response, StatusCode, Uri};
use axum::response::IntoResponse;

use crate::error::UpstreamError;
use crate::http::headers;
use crate::http::response;
use crate::http::server::AppState;
use crate::http::websocket;
use crate::observability::metrics;
use crate::upstream::resolve_target_url;

/// Forward one inbound request to the upstream and assemble the reply.
pub async fn forward(
    state: AppState,
    peer: SocketAddr,
    ws: Option<WebSocketUpgrade>,
    request: Request<Body>,
) -> Response<Body> {
    let start = Instant::now();
    let (parts, body) = request.into_parts();
    let method = parts.method.as_str().to_string();

    if state.forwarding.cors_enabled && parts.method == Method::OPTIONS {
        return response::cors_preflight();
    }

    let target_url = resolve_target_url(
        state.upstream.base_url(),
        parts.uri.path(),
        parts.uri.query(),
    );

    let mut upstream_headers =
        headers::rewrite_request_headers(&parts.headers, state.upstream.authority());
    if state.forwarding.forwarded_headers {
        headers::stamp_forwarded_headers(&mut upstream_headers, peer, state.scheme);
    }

    tracing::debug!(
        method = %parts.method,
        target_url = %target_url,
        "Forwarding request"
    );

    if headers::is_upgrade_request(&parts.headers) {
        return websocket::relay(state, ws, target_url, upstream_headers).await;
    }

    let uri: Uri = match target_url.parse() {
        Ok(uri) => uri,
        Err(err) => {
            let err = UpstreamError::Protocol(Box::new(err));
            metrics::record_forward(&method, 502, start);
            return bad_gateway(&target_url, &err);
        }
    };

    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            // The client went away or sent a broken body; the upstream was
            // never contacted.
            tracing::warn!(target_url = %target_url, error = %err, "Failed to read client body");
            metrics::record_forward(&method, 400, start);
            return (StatusCode::BAD_REQUEST, "Bad Request").into_response();
        }
    };

    let mut upstream_request = Request::new(Body::from(body_bytes));
    *upstream_request.method_mut() = parts.method;
    *upstream_request.uri_mut() = uri;
    *upstream_request.headers_mut() = upstream_headers;

    match state.upstream.send(upstream_request).await {
        Ok((upstream_parts, upstream_body)) => {
            metrics::record_forward(&method, upstream_parts.status.as_u16(), start);
            response::assemble(
                upstream_parts.status,
                &upstream_parts.headers,
                upstream_body,
                state.forwarding.cors_enabled,
            )
        }
        Err(err) => {
            metrics::record_forward(&method, 502, start);
            bad_gateway(&target_url, &err)
        }
    }
}

/// The one client-visible shape of an upstream failure. The target URL goes
/// to the log, never to the client.
pub(crate) fn bad_gateway(target_url: &str, err: &UpstreamError) -> Response<Body> {
    tracing::error!(target_url = %target_url, error = %err, "Proxy error");
    (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response()
}
