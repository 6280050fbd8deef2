use std::borrow::Cow;

use axum::body::Body as AxumBody;
use hyper::header::{self, HeaderValue};
use hyper::{HeaderMap, Method, Request};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::core::error::RelayError;
use crate::core::headers::strip_hop_by_hop;

// Some front ends merge `//` into `/`, turning `https://host` into `https:/host`.
static SCHEME_SLASHES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(https?):/+").expect("scheme slash pattern is valid"));

/// Outbound half of a translated request.
///
/// Redirects are never delegated to the transport: the forwarder re-drives
/// every hop itself from this description.
#[derive(Debug)]
pub struct OutboundRequest {
    pub method: Method,
    pub headers: HeaderMap,
    /// Absent for GET and HEAD.
    pub body: Option<AxumBody>,
}

#[derive(Debug)]
pub struct TranslatedRequest {
    pub target: Url,
    pub outbound: OutboundRequest,
}

/// Turns an inbound `<prefix><target-url>` request into an outbound request description.
#[derive(Debug, Clone)]
pub struct RequestTranslator {
    route_prefix: String,
    forwarded_ip: HeaderValue,
}

impl RequestTranslator {
    pub fn new(route_prefix: impl Into<String>, forwarded_ip: HeaderValue) -> Self {
        Self {
            route_prefix: route_prefix.into(),
            forwarded_ip,
        }
    }

    pub fn route_prefix(&self) -> &str {
        &self.route_prefix
    }

    /// Everything after the first occurrence of the route prefix, query included.
    pub fn extract_target<'a>(&self, path_and_query: &'a str) -> Result<&'a str, RelayError> {
        path_and_query
            .find(&self.route_prefix)
            .map(|idx| &path_and_query[idx + self.route_prefix.len()..])
            .filter(|target| !target.is_empty())
            .ok_or(RelayError::MissingTarget)
    }

    pub fn translate(&self, req: Request<AxumBody>) -> Result<TranslatedRequest, RelayError> {
        let raw_target = {
            let path_and_query = req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or_else(|| req.uri().path());
            self.extract_target(path_and_query)?.to_string()
        };

        let target = parse_target(&repair_scheme_slashes(&raw_target))?;

        let (parts, body) = req.into_parts();
        let mut headers = parts.headers;
        strip_hop_by_hop(&mut headers);
        headers.remove(header::HOST);
        headers.insert("x-forwarded-for", self.forwarded_ip.clone());
        headers.insert("x-real-ip", self.forwarded_ip.clone());

        let body = if carries_body(&parts.method) {
            Some(body)
        } else {
            headers.remove(header::CONTENT_LENGTH);
            None
        };

        tracing::debug!(method = %parts.method, url = %target, "Translated inbound request");

        Ok(TranslatedRequest {
            target,
            outbound: OutboundRequest {
                method: parts.method,
                headers,
                body,
            },
        })
    }
}

/// Restore `scheme://` when the slashes after an http(s) scheme were collapsed or multiplied.
///
/// Idempotent: an already well-formed URL is returned unchanged.
pub fn repair_scheme_slashes(raw: &str) -> Cow<'_, str> {
    SCHEME_SLASHES.replace(raw, "${1}://")
}

/// Parse an absolute http(s) URL, echoing the offending input on failure.
pub fn parse_target(raw: &str) -> Result<Url, RelayError> {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
        _ => Err(RelayError::InvalidTarget(raw.to_string())),
    }
}

/// GET and HEAD never carry a body outbound.
pub fn carries_body(method: &Method) -> bool {
    method != Method::GET && method != Method::HEAD
}
