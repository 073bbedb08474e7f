use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use shadowserver::config::{parse_config, validate_config, ConfigError, ProxyConfig};
use shadowserver::lifecycle::{spawn_signal_listener, Shutdown};
use shadowserver::observability::{logging, metrics};
use shadowserver::HttpServer;

/// Single-upstream reverse HTTP/WebSocket proxy.
#[derive(Parser)]
#[command(name = "shadowserver", version, about)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Upstream base URL (scheme + host + port); overrides the config file.
    #[arg(short, long)]
    target_base_url: Option<String>,

    /// Listener bind address; overrides the config file.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => parse_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(target_base_url) = cli.target_base_url {
        config.upstream.target_base_url = target_base_url;
    }
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        target_base_url = %config.upstream.target_base_url,
        timeout_secs = config.upstream.timeout_secs,
        max_conn = config.upstream.max_conn,
        tls_enabled = config.listener.tls.is_some(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(err) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %err,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    let bind_address = config.listener.bind_address.clone();
    let tls = config.listener.tls.clone();
    let server = HttpServer::new(config)?;

    match tls {
        Some(tls) => {
            let addr = bind_address.parse()?;
            server.run_tls(addr, &tls, shutdown.subscribe()).await?;
        }
        None => {
            let listener = TcpListener::bind(&bind_address).await?;
            server.run(listener, shutdown.subscribe()).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
