use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use xrelay::config::{ConfigValidator, RelayConfig, load_config};
use xrelay::ports::HttpServer;
use xrelay::{GracefulShutdown, HyperHttpClient, RelayHandler, RelayServer, metrics, tracing_setup};

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// YAML configuration file; built-in defaults are used when omitted
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Override the configured listen address
    #[clap(short, long)]
    listen_addr: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)
            .await
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => RelayConfig::default(),
    };
    if let Some(listen_addr) = args.listen_addr {
        config.listen_addr = listen_addr;
    }
    ConfigValidator::validate(&config)?;

    tracing_setup::init_tracing(config.log_format)
        .map_err(|e| anyhow!("Failed to initialize tracing: {}", e))?;

    if let Some(metrics_addr) = &config.metrics_addr {
        let addr = metrics_addr
            .parse()
            .with_context(|| format!("Invalid metrics address: {}", metrics_addr))?;
        metrics::install_exporter(addr)?;
    }

    let config = Arc::new(config);
    tracing::info!(
        listen_addr = %config.listen_addr,
        route_prefix = %config.route_prefix,
        max_redirects = config.max_redirects,
        tls = config.tls.is_some(),
        "Starting relay"
    );

    let http_client = Arc::new(HyperHttpClient::new(config.upstream_timeout()));
    let handler = Arc::new(RelayHandler::from_config(&config, http_client)?);
    let graceful_shutdown = Arc::new(GracefulShutdown::new());

    let signal_shutdown = graceful_shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = signal_shutdown.run_signal_handler().await {
            tracing::error!("Signal handler error: {}", e);
        }
    });

    let server = RelayServer::new(config, handler, graceful_shutdown);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {:#}", e);
        return Err(e);
    }

    tracing::info!("Relay shut down cleanly");
    Ok(())
}
