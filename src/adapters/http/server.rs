use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use axum::Router;
use axum::body::Body as AxumBody;
use axum::http::Request;
use axum_server::tls_rustls::RustlsConfig;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::{RelayConfig, TlsConfig};
use crate::ports::http_server::{HttpHandler, HttpServer, ServerRunFuture};
use crate::utils::graceful_shutdown::GracefulShutdown;

/// Every method on every path goes to the handler; there are no other routes.
pub fn build_router<H: HttpHandler>(handler: Arc<H>) -> Router {
    Router::new()
        .fallback(move |req: Request<AxumBody>| {
            let handler = handler.clone();
            async move { handler.handle_request(req).await }
        })
        .layer(TraceLayer::new_for_http())
}

pub struct RelayServer<H: HttpHandler> {
    config: Arc<RelayConfig>,
    handler: Arc<H>,
    graceful_shutdown: Arc<GracefulShutdown>,
}

impl<H: HttpHandler> RelayServer<H> {
    pub fn new(
        config: Arc<RelayConfig>,
        handler: Arc<H>,
        graceful_shutdown: Arc<GracefulShutdown>,
    ) -> Self {
        Self {
            config,
            handler,
            graceful_shutdown,
        }
    }
}

async fn load_rustls_config(tls_config: &TlsConfig) -> Result<RustlsConfig> {
    let cert_path = &tls_config.cert_path;
    let key_path = &tls_config.key_path;
    let cert_data = tokio::fs::read(cert_path)
        .await
        .with_context(|| format!("Failed to read certificate file: {}", cert_path))?;
    let key_data = tokio::fs::read(key_path)
        .await
        .with_context(|| format!("Failed to read key file: {}", key_path))?;
    let cert_chain: Vec<CertificateDer<'static>> =
        rustls_pemfile::certs(&mut cert_data.as_slice())
            .collect::<Result<_, _>>()
            .context("Failed to parse certificate PEM")?;
    let key_der: PrivateKeyDer<'static> = rustls_pemfile::private_key(&mut key_data.as_slice())
        .with_context(|| format!("Failed to parse private key file: {}", key_path))?
        .ok_or_else(|| anyhow!("No private key found in {}", key_path))?;

    let mut server_config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(cert_chain, key_der)
        .context("Failed to create TLS server config")?;
    server_config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(RustlsConfig::from_config(Arc::new(server_config)))
}

impl<H: HttpHandler> HttpServer for RelayServer<H> {
    fn run<'a>(&'a self) -> ServerRunFuture<'a> {
        Box::pin(async move {
            let app = build_router(self.handler.clone());
            let mut shutdown_rx = self.graceful_shutdown.subscribe();
            // A trigger sent before `subscribe` never reaches this receiver.
            if self.graceful_shutdown.is_shutdown_initiated() {
                tracing::info!("Shutdown already initiated, not starting relay");
                return Ok(());
            }

            let addr: SocketAddr = self
                .config
                .listen_addr
                .parse()
                .with_context(|| format!("Invalid listen address: {}", self.config.listen_addr))?;

            if let Some(tls_config) = &self.config.tls {
                tracing::info!("Starting relay with TLS on {}", addr);
                let tls_acceptor = load_rustls_config(tls_config).await?;

                let handle = axum_server::Handle::new();
                let shutdown_handle = handle.clone();
                let grace = self.graceful_shutdown.timeout();
                tokio::spawn(async move {
                    let _ = shutdown_rx.recv().await;
                    shutdown_handle.graceful_shutdown(Some(grace));
                });

                axum_server::bind_rustls(addr, tls_acceptor)
                    .handle(handle)
                    .serve(app.into_make_service())
                    .await
                    .map_err(|e| anyhow!("TLS Server error: {}", e))?;
            } else {
                tracing::info!("Starting relay without TLS on {}", addr);
                let listener = TcpListener::bind(addr)
                    .await
                    .with_context(|| format!("Failed to bind to address: {}", addr))?;

                axum::serve(listener, app.into_make_service())
                    .with_graceful_shutdown(async move {
                        let _ = shutdown_rx.recv().await;
                    })
                    .await
                    .map_err(|e| anyhow!("HTTP Server error: {}", e))?;
            }

            tracing::info!("Relay server on {} stopped", addr);
            Ok(())
        })
    }
}
