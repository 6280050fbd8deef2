use metrics::{Unit, counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

pub const RELAY_REQUESTS_TOTAL: &str = "relay_requests_total";
pub const RELAY_REQUEST_DURATION_SECONDS: &str = "relay_request_duration_seconds";
pub const RELAY_UPSTREAM_REQUESTS_TOTAL: &str = "relay_upstream_requests_total";
pub const RELAY_REDIRECT_HOPS_TOTAL: &str = "relay_redirect_hops_total";

/// Install the Prometheus recorder and serve its scrape endpoint on `addr`.
pub fn install_exporter(addr: SocketAddr) -> anyhow::Result<()> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    describe_metrics();
    tracing::info!("Prometheus metrics exporter listening on {}", addr);
    Ok(())
}

fn describe_metrics() {
    describe_counter!(
        RELAY_REQUESTS_TOTAL,
        Unit::Count,
        "Total number of inbound requests answered by the relay."
    );
    describe_histogram!(
        RELAY_REQUEST_DURATION_SECONDS,
        Unit::Seconds,
        "Time until the relay produced response headers for an inbound request."
    );
    describe_counter!(
        RELAY_UPSTREAM_REQUESTS_TOTAL,
        Unit::Count,
        "Total number of outbound requests issued to target origins, one per hop."
    );
    describe_counter!(
        RELAY_REDIRECT_HOPS_TOTAL,
        Unit::Count,
        "Total number of redirect hops followed on behalf of callers."
    );
}

pub fn increment_request_total(method: &str, status: u16) {
    counter!(
        RELAY_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn increment_upstream_request_total(method: &str, status: u16) {
    counter!(
        RELAY_UPSTREAM_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn increment_redirect_hops() {
    counter!(RELAY_REDIRECT_HOPS_TOTAL).increment(1);
}

// Records the request duration when dropped
pub struct RequestTimer {
    start: Instant,
    method: String,
}

impl RequestTimer {
    pub fn new(method: &str) -> Self {
        Self {
            start: Instant::now(),
            method: method.to_string(),
        }
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        histogram!(
            RELAY_REQUEST_DURATION_SECONDS,
            "method" => self.method.clone()
        )
        .record(self.start.elapsed().as_secs_f64());
    }
}
