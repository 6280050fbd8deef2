use std::error::Error as StdError;
use std::time::Duration;

use axum::body::Body as AxumBody;
use hyper::Request;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use tokio::time::timeout;

use crate::ports::http_client::{HttpClient, HttpClientError, HttpResponseFuture};

/// Outbound transport for both `http` and `https` targets.
///
/// hyper never follows redirects on its own, so every `location` response
/// reaches the forwarder untouched.
pub struct HyperHttpClient {
    client: Client<HttpsConnector<HttpConnector>, AxumBody>,
    timeout: Option<Duration>,
}

impl HyperHttpClient {
    pub fn new(timeout: Option<Duration>) -> Self {
        // Fails only when a provider is already installed for the process.
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

        let builder = match HttpsConnectorBuilder::new().with_native_roots() {
            Ok(builder) => builder,
            Err(err) => {
                tracing::warn!(
                    "Failed to load native root certificates ({}); HTTPS targets will not verify",
                    err
                );
                HttpsConnectorBuilder::new().with_tls_config(
                    rustls::ClientConfig::builder()
                        .with_root_certificates(rustls::RootCertStore::empty())
                        .with_no_client_auth(),
                )
            }
        };
        let https = builder.https_or_http().enable_http1().build();
        let client = Client::builder(TokioExecutor::new()).build(https);

        tracing::info!(?timeout, "Created new HTTPS-capable HTTP client");
        Self { client, timeout }
    }
}

impl HttpClient for HyperHttpClient {
    fn send_request<'a>(&'a self, req: Request<AxumBody>) -> HttpResponseFuture<'a> {
        Box::pin(async move {
            let method = req.method().clone();
            let uri = req.uri().clone();
            tracing::debug!("Sending request: {} {}", method, uri);

            let pending = self.client.request(req);
            let result = match self.timeout {
                Some(limit) => timeout(limit, pending).await.map_err(|_| {
                    tracing::warn!("Request to {} {} timed out after {:?}", method, uri, limit);
                    HttpClientError::TimeoutError(limit.as_secs())
                })?,
                None => pending.await,
            };

            match result {
                Ok(response) => {
                    tracing::debug!(
                        "Received response from {} {}: status={}",
                        method,
                        uri,
                        response.status()
                    );
                    Ok(response.map(AxumBody::new))
                }
                Err(err) => {
                    let message = match err.source() {
                        Some(source) => format!("{err}: {source}"),
                        None => err.to_string(),
                    };
                    tracing::error!("Error making request to {} {}: {}", method, uri, message);
                    Err(HttpClientError::ConnectionError(message))
                }
            }
        })
    }
}
