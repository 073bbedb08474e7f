//! The WebSocket relay: bidirectional frame forwarding.
//!
//! # Data Flow
//! ```text
//! Client ←── frames ──→ Proxy ←── frames ──→ Upstream
//! ```
//!
//! The upstream session is established first, mirroring the client's upgrade
//! request (forced Host included); only then is the client handshake
//! completed. Afterwards two independent tasks forward frames, one per
//! direction.
//!
//! # Design Decisions
//! - Each direction is its own task with its own error boundary: a read or
//!   write failure ends that direction, closes the sink it owns, and takes
//!   the peer task down with it. The relay finishes when both tasks have
//!   stopped and never raises a failure after the handshake.
//! - Any close frame closes both sockets (full bidirectional close).
//! - Ping/pong frames are answered by the transport on both sides and are
//!   not forwarded.

use axum::body::Body;
use axum::extract::ws::{self, WebSocket, WebSocketUpgrade};
use axum::http::header::{HeaderMap, HOST};
use axum::http::Response;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::OwnedSemaphorePermit;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::UpstreamError;
use crate::http::forward::bad_gateway;
use crate::http::server::AppState;
use crate::observability::metrics;

type UpstreamSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Headers owned by the WebSocket client handshake. Copying them from the
/// inbound request would corrupt the upstream handshake, so they are the one
/// exception to header pass-through.
const HANDSHAKE_HEADERS: [&str; 6] = [
    "connection",
    "upgrade",
    "sec-websocket-key",
    "sec-websocket-version",
    "sec-websocket-accept",
    "sec-websocket-extensions",
];

/// Establish the upstream session and hand the connection pair to the
/// forwarding loops.
///
/// A failed upstream handshake is an upstream connect failure: the client
/// sees 502 and the upgrade never completes. Once both sides are
/// established, nothing that happens inside the relay surfaces as an error.
pub async fn relay(
    state: AppState,
    ws: Option<WebSocketUpgrade>,
    target_url: String,
    upstream_headers: HeaderMap,
) -> Response<Body> {
    let Some(ws) = ws else {
        // Upgrade was requested but the client handshake cannot be completed.
        let err = UpstreamError::Protocol("not a valid WebSocket upgrade".into());
        return bad_gateway(&target_url, &err);
    };

    let ws_url = ws_target_url(&target_url);
    let upstream_request = match build_upstream_request(&ws_url, &upstream_headers) {
        Ok(request) => request,
        Err(err) => return bad_gateway(&target_url, &err),
    };

    // The pool slot wait and the upstream handshake share one budget.
    let timeout = state.upstream.timeout();
    let establish = async {
        let permit = state.upstream.acquire().await;
        (permit, connect_async(upstream_request).await)
    };
    let (permit, upstream_socket) = match tokio::time::timeout(timeout, establish).await {
        Ok((permit, Ok((socket, _response)))) => (permit, socket),
        Ok((_, Err(err))) => return bad_gateway(&target_url, &UpstreamError::from_handshake(err)),
        Err(_) => return bad_gateway(&target_url, &UpstreamError::Timeout(timeout)),
    };

    tracing::debug!(target_url = %ws_url, "WebSocket session established");

    ws.on_upgrade(move |client_socket| run_relay(client_socket, upstream_socket, permit))
}

/// Swap the base scheme for its WebSocket counterpart.
fn ws_target_url(target_url: &str) -> String {
    if let Some(rest) = target_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = target_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        target_url.to_string()
    }
}

/// Build the upstream handshake request: the rewritten client headers minus
/// the handshake-owned set, on top of the generated handshake.
fn build_upstream_request(
    ws_url: &str,
    headers: &HeaderMap,
) -> Result<tokio_tungstenite::tungstenite::handshake::client::Request, UpstreamError> {
    let mut request = ws_url
        .into_client_request()
        .map_err(|err| UpstreamError::Protocol(Box::new(err)))?;
    for (name, value) in headers {
        if HANDSHAKE_HEADERS.contains(&name.as_str()) {
            continue;
        }
        if name == HOST {
            request.headers_mut().insert(HOST, value.clone());
        } else {
            request.headers_mut().append(name.clone(), value.clone());
        }
    }
    Ok(request)
}

/// Run both forwarding loops to completion.
///
/// Whichever direction stops first, for any reason, aborts the other; both
/// sockets are closed by the time this returns. The pool permit spans the
/// whole session.
async fn run_relay(
    client_socket: WebSocket,
    upstream_socket: UpstreamSocket,
    permit: OwnedSemaphorePermit,
) {
    let (client_tx, client_rx) = client_socket.split();
    let (upstream_tx, upstream_rx) = upstream_socket.split();

    let mut client_to_upstream = tokio::spawn(forward_client_to_upstream(client_rx, upstream_tx));
    let mut upstream_to_client = tokio::spawn(forward_upstream_to_client(upstream_rx, client_tx));

    tokio::select! {
        _ = &mut client_to_upstream => {
            upstream_to_client.abort();
            let _ = upstream_to_client.await;
        }
        _ = &mut upstream_to_client => {
            client_to_upstream.abort();
            let _ = client_to_upstream.await;
        }
    }

    drop(permit);
    metrics::record_relay_session();
    tracing::debug!("WebSocket relay finished");
}

/// Loop A: client → upstream.
async fn forward_client_to_upstream(
    mut client_rx: SplitStream<WebSocket>,
    mut upstream_tx: SplitSink<UpstreamSocket, Message>,
) {
    while let Some(inbound) = client_rx.next().await {
        let inbound = match inbound {
            Ok(message) => message,
            Err(err) => {
                tracing::debug!(error = %err, "Client socket read failed");
                break;
            }
        };
        let outbound = match inbound {
            ws::Message::Text(text) => Message::Text(text.as_str().into()),
            ws::Message::Binary(data) => Message::Binary(data),
            ws::Message::Close(frame) => {
                let _ = upstream_tx
                    .send(Message::Close(frame.map(close_to_upstream)))
                    .await;
                break;
            }
            ws::Message::Ping(_) | ws::Message::Pong(_) => continue,
        };
        if let Err(err) = upstream_tx.send(outbound).await {
            tracing::debug!(error = %err, "Upstream socket write failed");
            break;
        }
    }
    let _ = upstream_tx.close().await;
}

/// Loop B: upstream → client.
async fn forward_upstream_to_client(
    mut upstream_rx: SplitStream<UpstreamSocket>,
    mut client_tx: SplitSink<WebSocket, ws::Message>,
) {
    while let Some(inbound) = upstream_rx.next().await {
        let inbound = match inbound {
            Ok(message) => message,
            Err(err) => {
                tracing::debug!(error = %err, "Upstream socket read failed");
                break;
            }
        };
        let outbound = match inbound {
            Message::Text(text) => ws::Message::Text(text.as_str().into()),
            Message::Binary(data) => ws::Message::Binary(data),
            Message::Close(frame) => {
                let _ = client_tx
                    .send(ws::Message::Close(frame.map(close_to_client)))
                    .await;
                break;
            }
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
        };
        if let Err(err) = client_tx.send(outbound).await {
            tracing::debug!(error = %err, "Client socket write failed");
            break;
        }
    }
    let _ = client_tx.close().await;
}

fn close_to_upstream(frame: ws::CloseFrame) -> CloseFrame {
    CloseFrame {
        code: CloseCode::from(frame.code),
        reason: frame.reason.as_str().into(),
    }
}

fn close_to_client(frame: CloseFrame) -> ws::CloseFrame {
    ws::CloseFrame {
        code: frame.code.into(),
        reason: frame.reason.as_str().into(),
    }
}
