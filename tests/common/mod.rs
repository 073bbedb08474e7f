//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use shadowserver::config::ProxyConfig;
use shadowserver::lifecycle::Shutdown;
use shadowserver::HttpServer;

/// One captured upstream request: raw head plus the body bytes.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub head: String,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    /// First value of a header in the captured head, case-insensitive.
    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            if key.trim().eq_ignore_ascii_case(name) {
                Some(value.trim().to_string())
            } else {
                None
            }
        })
    }

    /// The request line, e.g. "GET /path?q=1 HTTP/1.1".
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or("")
    }
}

/// Read one HTTP request (head and, if Content-Length says so, body).
async fn read_request(stream: &mut TcpStream) -> CapturedRequest {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        match stream.read(&mut byte).await {
            Ok(0) | Err(_) => break,
            Ok(_) => head.extend_from_slice(&byte),
        }
    }
    let head = String::from_utf8_lossy(&head).to_string();

    let content_length = head
        .lines()
        .find_map(|line| {
            let (key, value) = line.split_once(':')?;
            if key.trim().eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);

    let mut body = vec![0u8; content_length];
    if content_length > 0 && stream.read_exact(&mut body).await.is_err() {
        body.clear();
    }

    CapturedRequest { head, body }
}

/// Start a mock upstream that captures every request and answers each with
/// a fixed 200 response carrying an explicit Content-Length.
pub async fn start_capturing_upstream(
    body: &'static str,
) -> (SocketAddr, Arc<Mutex<Vec<CapturedRequest>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let captured = requests.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut stream, _)) => {
                    let captured = captured.clone();
                    tokio::spawn(async move {
                        let request = read_request(&mut stream).await;
                        captured.lock().await.push(request);
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = stream.write_all(response.as_bytes()).await;
                        let _ = stream.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, requests)
}

/// Start a mock upstream that answers every request with a fixed raw HTTP
/// response and closes the connection.
pub async fn start_raw_upstream(raw_response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut stream, _)) => {
                    tokio::spawn(async move {
                        let _ = read_request(&mut stream).await;
                        let _ = stream.write_all(raw_response.as_bytes()).await;
                        let _ = stream.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a mock upstream that accepts connections but never answers.
pub async fn start_silent_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut stream, _)) => {
                    tokio::spawn(async move {
                        let _ = read_request(&mut stream).await;
                        tokio::time::sleep(Duration::from_secs(120)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a mock upstream that holds every request for `hold` before
/// answering, tracking the peak number of requests in flight.
pub async fn start_slow_upstream(hold: Duration) -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let current = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let observed_peak = peak.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut stream, _)) => {
                    let current = current.clone();
                    let peak = peak.clone();
                    tokio::spawn(async move {
                        let _ = read_request(&mut stream).await;
                        let in_flight = current.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(in_flight, Ordering::SeqCst);
                        tokio::time::sleep(hold).await;
                        current.fetch_sub(1, Ordering::SeqCst);
                        let _ = stream
                            .write_all(
                                b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
                            )
                            .await;
                        let _ = stream.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, observed_peak)
}

/// An address nothing is listening on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Default proxy configuration pointed at the given upstream.
pub fn config_for(upstream: SocketAddr) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.upstream.target_base_url = format!("http://{upstream}");
    config
}

/// Start the proxy on an ephemeral port. The returned `Shutdown` must be
/// kept alive for the duration of the test.
pub async fn start_proxy(mut config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let server = HttpServer::new(config).unwrap();
    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    (addr, shutdown)
}
