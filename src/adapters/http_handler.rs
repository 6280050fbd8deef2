use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Body as AxumBody;
use axum::response::{IntoResponse, Response as AxumResponse};
use hyper::header::HeaderValue;
use hyper::{Method, Request, StatusCode};

use crate::config::RelayConfig;
use crate::core::headers::preflight_headers;
use crate::core::{Forwarder, RelayError, RequestTranslator};
use crate::metrics::{self, RequestTimer};
use crate::ports::http_client::HttpClient;
use crate::ports::http_server::{HandlerResponseFuture, HttpHandler};

/// The relay's single entry point: preflight, translate, forward.
///
/// Any upstream response carrying `location` is followed, whatever its status.
/// A `201 Created` with `Location` answering a POST is therefore chased too, and
/// because the streamed request body cannot be sent a second time the caller gets
/// a 502 instead of the 201. REST APIs that answer creates this way are not
/// reachable with a body through the relay.
pub struct RelayHandler<C: HttpClient> {
    translator: RequestTranslator,
    forwarder: Forwarder<C>,
}

impl<C: HttpClient> RelayHandler<C> {
    pub fn new(translator: RequestTranslator, forwarder: Forwarder<C>) -> Self {
        Self {
            translator,
            forwarder,
        }
    }

    pub fn from_config(config: &RelayConfig, client: Arc<C>) -> Result<Self> {
        let forwarded_ip = HeaderValue::from_str(&config.forwarded_ip)
            .with_context(|| format!("Invalid forwarded_ip: {}", config.forwarded_ip))?;

        Ok(Self::new(
            RequestTranslator::new(config.route_prefix.clone(), forwarded_ip),
            Forwarder::new(client, config.max_redirects),
        ))
    }

    fn preflight_response() -> AxumResponse {
        let mut response = StatusCode::NO_CONTENT.into_response();
        *response.headers_mut() = preflight_headers();
        response
    }

    fn error_response(&self, err: RelayError) -> AxumResponse {
        let status = err.status_code();
        let body = match err {
            RelayError::MissingTarget => format!(
                "Usage: {}https://example.com",
                self.translator.route_prefix()
            ),
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(status = %status, "Relay failed: {}", body);
        } else {
            tracing::debug!(status = %status, "Rejected request: {}", body);
        }

        (status, body).into_response()
    }

    async fn relay(&self, req: Request<AxumBody>) -> AxumResponse {
        let translated = match self.translator.translate(req) {
            Ok(translated) => translated,
            Err(err) => return self.error_response(err),
        };

        match self.forwarder.forward(translated).await {
            Ok(response) => response,
            Err(err) => self.error_response(err),
        }
    }
}

impl<C: HttpClient> HttpHandler for RelayHandler<C> {
    fn handle_request<'a>(&'a self, req: Request<AxumBody>) -> HandlerResponseFuture<'a> {
        Box::pin(async move {
            let method = req.method().clone();
            let _timer = RequestTimer::new(method.as_str());

            let response = if method == Method::OPTIONS {
                Self::preflight_response()
            } else {
                self.relay(req).await
            };

            metrics::increment_request_total(method.as_str(), response.status().as_u16());
            tracing::debug!(
                response_status = ?response.status(),
                response_headers = ?response.headers(),
                "RelayHandler::handle_request: final response"
            );
            response
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{ScriptedClient, response};
    use crate::ports::http_client::HttpClientError;
    use http_body_util::BodyExt;

    fn handler(script: Vec<Result<AxumResponse, HttpClientError>>) -> RelayHandler<ScriptedClient> {
        RelayHandler::from_config(
            &RelayConfig::default(),
            Arc::new(ScriptedClient::new(script)),
        )
        .unwrap()
    }

    fn request(method: Method, uri: &str) -> Request<AxumBody> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(AxumBody::empty())
            .unwrap()
    }

    async fn body_string(response: AxumResponse) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_options_is_preflight_on_any_path() {
        let handler = handler(vec![]);

        for uri in ["/", "/x/https://example.com/", "/anything/else"] {
            let res = handler.handle_request(request(Method::OPTIONS, uri)).await;
            assert_eq!(res.status(), StatusCode::NO_CONTENT);
            assert_eq!(res.headers().len(), 4);
            assert_eq!(res.headers()["access-control-allow-origin"], "*");
            assert_eq!(
                res.headers()["access-control-allow-methods"],
                "GET,POST,PUT,PATCH,TRACE,DELETE,HEAD,OPTIONS"
            );
            assert_eq!(res.headers()["access-control-max-age"], "1728000");
            assert_eq!(res.headers()["access-control-allow-headers"], "*");
        }
    }

    #[tokio::test]
    async fn test_missing_target_returns_usage() {
        let handler = handler(vec![]);

        let res = handler.handle_request(request(Method::GET, "/favicon.ico")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(res).await, "Usage: /x/https://example.com");
    }

    #[tokio::test]
    async fn test_invalid_target_echoes_input() {
        let handler = handler(vec![]);

        let res = handler.handle_request(request(Method::GET, "/x/https://")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(res).await, "Invalid URL: https://");
    }

    #[tokio::test]
    async fn test_forwards_and_sanitizes() {
        let handler = handler(vec![Ok(response(
            200,
            &[("clear-site-data", "\"*\"")],
            "payload",
        ))]);

        let res = handler
            .handle_request(request(Method::GET, "/x/https:/example.com/data.json"))
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()["access-control-allow-origin"], "*");
        assert!(res.headers().get("clear-site-data").is_none());
        assert_eq!(body_string(res).await, "payload");
    }

    #[tokio::test]
    async fn test_origin_error_status_passes_through() {
        let handler = handler(vec![Ok(response(404, &[], "not here"))]);

        let res = handler
            .handle_request(request(Method::GET, "/x/https://example.com/missing"))
            .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(res).await, "not here");
    }

    #[tokio::test]
    async fn test_unreachable_origin_is_bad_gateway() {
        let handler = handler(vec![Err(HttpClientError::ConnectionError(
            "dns error".to_string(),
        ))]);

        let res = handler
            .handle_request(request(Method::GET, "/x/https://nowhere.invalid/"))
            .await;
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
        assert!(body_string(res).await.contains("dns error"));
    }

    #[tokio::test]
    async fn test_timeout_is_gateway_timeout() {
        let handler = handler(vec![Err(HttpClientError::TimeoutError(30))]);

        let res = handler
            .handle_request(request(Method::GET, "/x/https://slow.example/"))
            .await;
        assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn test_usage_follows_custom_prefix() {
        let config = RelayConfig {
            route_prefix: "/relay/".to_string(),
            ..Default::default()
        };
        let handler =
            RelayHandler::from_config(&config, Arc::new(ScriptedClient::new(vec![]))).unwrap();

        let res = handler.handle_request(request(Method::GET, "/x/https://a.com")).await;
        assert_eq!(body_string(res).await, "Usage: /relay/https://example.com");
    }
}
