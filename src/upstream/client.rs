//! Upstream client handle: pooled HTTP client, connection bound, timeout.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::header::HeaderValue;
use axum::http::{response, Request, Uri};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::UpstreamConfig;
use crate::error::UpstreamError;

/// Error constructing the upstream handle from configuration.
#[derive(Debug, Error)]
pub enum UpstreamInitError {
    #[error("invalid target base URL: {0}")]
    InvalidUrl(#[from] axum::http::uri::InvalidUri),

    #[error("target base URL \"{0}\" has no authority")]
    MissingAuthority(String),
}

/// Handle to the single configured upstream origin.
///
/// Owns the HTTP client, the connection-count bound, and the per-request
/// timeout budget. Constructed explicitly before the listener starts and
/// passed by handle into every forwarding call; together with the listener
/// socket it is the only state shared across requests.
#[derive(Clone)]
pub struct Upstream {
    client: Client<HttpConnector, Body>,
    permits: Arc<Semaphore>,
    timeout: Duration,
    base_url: String,
    authority: HeaderValue,
}

impl Upstream {
    /// Build the handle from validated configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamInitError> {
        let base_url = config.target_base_url.trim().trim_end_matches('/').to_string();
        let uri: Uri = base_url.parse()?;
        let authority = uri
            .authority()
            .ok_or_else(|| UpstreamInitError::MissingAuthority(base_url.clone()))?;
        let authority = HeaderValue::from_str(authority.as_str())
            .map_err(|_| UpstreamInitError::MissingAuthority(base_url.clone()))?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self {
            client,
            permits: Arc::new(Semaphore::new(config.max_conn)),
            timeout: Duration::from_secs(config.timeout_secs),
            base_url,
            authority,
        })
    }

    /// The configured base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Authority component of the base URL; the forced outbound `Host`.
    pub fn authority(&self) -> &HeaderValue {
        &self.authority
    }

    /// The overall budget for one request/connection attempt.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Borrow a connection slot from the pool.
    ///
    /// Waits when `max_conn` slots are already in use. The permit is released
    /// when dropped, which includes the caller's future being dropped because
    /// the client disconnected mid-forward.
    pub async fn acquire(&self) -> OwnedSemaphorePermit {
        self.permits
            .clone()
            .acquire_owned()
            .await
            .expect("Semaphore closed unexpectedly")
    }

    /// Issue one request and buffer the full response.
    ///
    /// The whole exchange (pool slot wait, connect, write, read) runs under
    /// the single timeout budget, so a saturated pool cannot stall a request
    /// past its budget. Single-shot: no retries at this or any other layer.
    pub async fn send(
        &self,
        request: Request<Body>,
    ) -> Result<(response::Parts, Bytes), UpstreamError> {
        let exchange = async {
            let _permit = self.acquire().await;
            let response = self
                .client
                .request(request)
                .await
                .map_err(UpstreamError::from_client)?;
            let (parts, body) = response.into_parts();
            let bytes = axum::body::to_bytes(Body::new(body), usize::MAX)
                .await
                .map_err(|err| UpstreamError::Protocol(err.into()))?;
            Ok((parts, bytes))
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout(self.timeout)),
        }
    }
}
