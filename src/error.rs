//! Error taxonomy for upstream forwarding.

use std::time::Duration;

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A failed attempt to talk to the upstream origin.
///
/// The variants exist so log lines can name what actually went wrong; to the
/// client they are indistinguishable, and the forwarder collapses every one
/// of them into a single 502 "Bad Gateway" response.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The upstream connection could not be established.
    #[error("upstream connect failed: {0}")]
    Connect(#[source] BoxError),

    /// The overall request budget elapsed before the exchange completed.
    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),

    /// The upstream spoke, but not valid HTTP / WebSocket.
    #[error("upstream protocol error: {0}")]
    Protocol(#[source] BoxError),
}

impl UpstreamError {
    /// Classify an HTTP client error.
    pub fn from_client(err: hyper_util::client::legacy::Error) -> Self {
        if err.is_connect() {
            Self::Connect(Box::new(err))
        } else {
            Self::Protocol(Box::new(err))
        }
    }

    /// Classify a WebSocket handshake error. A failed handshake counts as a
    /// connect failure; anything after the TCP connect is a protocol error.
    pub fn from_handshake(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;
        match err {
            WsError::Io(_) | WsError::ConnectionClosed | WsError::AlreadyClosed => {
                Self::Connect(Box::new(err))
            }
            other => Self::Protocol(Box::new(other)),
        }
    }
}
