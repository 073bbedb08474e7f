//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router: every method, every path, one handler
//! - Wire up middleware (request ID, tracing)
//! - Serve plain or TLS, with graceful shutdown
//! - Hand each request to the forwarder

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{ConnectInfo, FromRequestParts, State};
use axum::http::Request;
use axum::response::Response;
use axum::routing::any;
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::{ForwardingConfig, ProxyConfig, TlsConfig};
use crate::http::forward;
use crate::http::request_id::{propagate_request_id_layer, set_request_id_layer};
use crate::upstream::{Upstream, UpstreamInitError};

/// Application state injected into the proxy handler.
#[derive(Clone)]
pub struct AppState {
    /// Handle to the configured upstream origin.
    pub upstream: Upstream,
    /// Optional forwarding behaviors.
    pub forwarding: ForwardingConfig,
    /// Scheme clients use to reach the listener, for X-Forwarded-Proto.
    pub scheme: &'static str,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// The upstream handle is constructed here, once, before the listener
    /// starts accepting.
    pub fn new(config: ProxyConfig) -> Result<Self, UpstreamInitError> {
        let upstream = Upstream::new(&config.upstream)?;
        let scheme = if config.listener.tls.is_some() {
            "https"
        } else {
            "http"
        };
        let state = AppState {
            upstream,
            forwarding: config.forwarding.clone(),
            scheme,
        };
        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// Run the server on the given listener until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            target_base_url = %self.config.upstream.target_base_url,
            max_conn = self.config.upstream.max_conn,
            timeout_secs = self.config.upstream.timeout_secs,
            "HTTP server starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server with TLS until the shutdown signal fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: &TlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let rustls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await?;

        tracing::info!(
            address = %addr,
            target_base_url = %self.config.upstream.target_base_url,
            "HTTPS server starting"
        );

        let handle = Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            drain.graceful_shutdown(Some(std::time::Duration::from_secs(10)));
        });

        axum_server::bind_rustls(addr, rustls_config)
            .handle(handle)
            .serve(
                self.router
                    .into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// The one handler: every method, every path, straight to the forwarder.
///
/// `WebSocketUpgrade` has no optional extractor form, so the upgrade is
/// pulled out of the request parts by hand; non-upgrade requests carry on
/// with `None` and take the plain forwarding path.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response<Body> {
    let (mut parts, body) = request.into_parts();
    let ws = WebSocketUpgrade::from_request_parts(&mut parts, &()).await.ok();
    let request = Request::from_parts(parts, body);
    forward::forward(state, peer, ws, request).await
}
