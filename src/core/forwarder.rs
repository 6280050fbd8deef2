use std::sync::Arc;

use axum::body::Body as AxumBody;
use http_body::Body as _;
use hyper::header::{self, HeaderValue};
use hyper::{HeaderMap, Method, Request, Response, StatusCode, Uri};
use url::Url;

use crate::core::error::RelayError;
use crate::core::headers::sanitize_response_headers;
use crate::core::translator::{OutboundRequest, TranslatedRequest, carries_body};
use crate::metrics;
use crate::ports::http_client::HttpClient;

/// Request headers that describe the body and go away with it.
const BODY_HEADERS: [&str; 5] = [
    "content-length",
    "content-type",
    "content-encoding",
    "content-language",
    "content-location",
];

/// Issues outbound requests and chases `location` headers until a terminal response.
pub struct Forwarder<C: HttpClient> {
    client: Arc<C>,
    max_redirects: usize,
}

impl<C: HttpClient> Forwarder<C> {
    pub fn new(client: Arc<C>, max_redirects: usize) -> Self {
        Self {
            client,
            max_redirects,
        }
    }

    /// Resolve the request through zero or more redirect hops.
    ///
    /// Only the terminal response is sanitized, and its body is handed back
    /// still streaming.
    pub async fn forward(
        &self,
        translated: TranslatedRequest,
    ) -> Result<Response<AxumBody>, RelayError> {
        let TranslatedRequest {
            mut target,
            outbound:
                OutboundRequest {
                    mut method,
                    mut headers,
                    mut body,
                },
        } = translated;
        let mut hops = 0usize;

        loop {
            let streamed_body = body
                .as_ref()
                .is_some_and(|b| b.size_hint().exact() != Some(0));
            let req = build_request(&method, &target, &headers, body.take())?;

            tracing::debug!(
                method = %method,
                url = %target,
                hop = hops,
                "Issuing outbound request"
            );
            let response = self.client.send_request(req).await?;
            metrics::increment_upstream_request_total(method.as_str(), response.status().as_u16());

            let Some(location) = response.headers().get(header::LOCATION).cloned() else {
                tracing::debug!(
                    status = %response.status(),
                    hops,
                    "Terminal response received"
                );
                return Ok(into_terminal(response));
            };

            if hops >= self.max_redirects {
                tracing::warn!(
                    url = %target,
                    limit = self.max_redirects,
                    "Redirect limit exceeded"
                );
                return Err(RelayError::TooManyRedirects(self.max_redirects));
            }

            let next = resolve_location(&target, &location)?;
            let status = response.status();
            // Intermediate bodies are never relayed.
            drop(response);

            tracing::info!(
                status = %status,
                from = %target,
                to = %next,
                hop = hops + 1,
                "Following redirect"
            );
            metrics::increment_redirect_hops();

            if rewrites_to_get(status, &method) {
                method = Method::GET;
                for name in BODY_HEADERS {
                    headers.remove(name);
                }
            } else if streamed_body && carries_body(&method) {
                return Err(RelayError::BodyNotReplayable);
            }

            target = next;
            hops += 1;
        }
    }
}

/// Redirects that turn the next hop into a body-less GET, as browsers do.
fn rewrites_to_get(status: StatusCode, method: &Method) -> bool {
    match status {
        StatusCode::SEE_OTHER => method != Method::GET && method != Method::HEAD,
        StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND => method == Method::POST,
        _ => false,
    }
}

/// Resolve a `location` value (absolute or relative) against the URL that produced it.
fn resolve_location(current: &Url, location: &HeaderValue) -> Result<Url, RelayError> {
    let raw = String::from_utf8_lossy(location.as_bytes());
    match current.join(&raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
        _ => Err(RelayError::InvalidTarget(raw.into_owned())),
    }
}

fn build_request(
    method: &Method,
    target: &Url,
    headers: &HeaderMap,
    body: Option<AxumBody>,
) -> Result<Request<AxumBody>, RelayError> {
    let mut without_fragment = target.clone();
    without_fragment.set_fragment(None);
    let uri: Uri = without_fragment
        .as_str()
        .parse()
        .map_err(|_| RelayError::InvalidTarget(target.to_string()))?;

    let mut req = Request::new(body.unwrap_or_else(AxumBody::empty));
    *req.method_mut() = method.clone();
    *req.uri_mut() = uri;
    *req.headers_mut() = headers.clone();
    Ok(req)
}

fn into_terminal(response: Response<AxumBody>) -> Response<AxumBody> {
    let (mut parts, body) = response.into_parts();
    sanitize_response_headers(&mut parts.headers);
    Response::from_parts(parts, body)
}
