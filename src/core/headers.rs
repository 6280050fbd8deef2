use hyper::HeaderMap;
use hyper::header::{self, HeaderName, HeaderValue};

/// Fixed answer to every CORS preflight. Copied into a fresh map per request.
pub const PREFLIGHT_HEADERS: [(&str, &str); 4] = [
    ("access-control-allow-origin", "*"),
    (
        "access-control-allow-methods",
        "GET,POST,PUT,PATCH,TRACE,DELETE,HEAD,OPTIONS",
    ),
    ("access-control-max-age", "1728000"),
    ("access-control-allow-headers", "*"),
];

/// Headers that only describe a single connection and must not be relayed.
const HOP_BY_HOP_HEADERS: [&str; 7] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Headers an origin uses to restrict what a browser caller may do with the response.
const RESTRICTIVE_RESPONSE_HEADERS: [&str; 3] = [
    "content-security-policy",
    "content-security-policy-report-only",
    "clear-site-data",
];

pub fn preflight_headers() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(PREFLIGHT_HEADERS.len());
    for (name, value) in PREFLIGHT_HEADERS {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    headers
}

/// Remove hop-by-hop headers, including any extra names listed in `connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(name);
    }
}

/// Make a terminal response consumable by a cross-origin browser caller.
///
/// The relay's CORS values always overwrite whatever the origin sent.
pub fn sanitize_response_headers(headers: &mut HeaderMap) {
    strip_hop_by_hop(headers);

    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );

    for name in RESTRICTIVE_RESPONSE_HEADERS {
        headers.remove(name);
    }
}
