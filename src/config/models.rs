use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::validation::{ConfigValidator, ValidationResult};

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_ROUTE_PREFIX: &str = "/x/";
pub const DEFAULT_FORWARDED_IP: &str = "1.2.3.4";
pub const DEFAULT_MAX_REDIRECTS: usize = 20;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RelayConfig {
    pub listen_addr: String,
    /// Path marker after which the target URL starts, e.g. `/x/`.
    pub route_prefix: String,
    /// Address written to `x-forwarded-for` and `x-real-ip` on every outbound request.
    pub forwarded_ip: String,
    pub max_redirects: usize,
    pub upstream_timeout_secs: Option<u64>,
    pub metrics_addr: Option<String>,
    pub tls: Option<TlsConfig>,
    pub log_format: LogFormat,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            route_prefix: DEFAULT_ROUTE_PREFIX.to_string(),
            forwarded_ip: DEFAULT_FORWARDED_IP.to_string(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            upstream_timeout_secs: None,
            metrics_addr: None,
            tls: None,
            log_format: LogFormat::default(),
        }
    }
}

impl RelayConfig {
    /// Create a new relay configuration builder
    pub fn builder() -> RelayConfigBuilder {
        RelayConfigBuilder::default()
    }

    pub fn upstream_timeout(&self) -> Option<Duration> {
        self.upstream_timeout_secs.map(Duration::from_secs)
    }
}

/// Builder for RelayConfig to allow for cleaner configuration creation
#[derive(Default)]
pub struct RelayConfigBuilder {
    config: RelayConfig,
}

impl RelayConfigBuilder {
    /// Set the listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the path marker that precedes the target URL
    pub fn route_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.route_prefix = prefix.into();
        self
    }

    pub fn forwarded_ip(mut self, ip: impl Into<String>) -> Self {
        self.config.forwarded_ip = ip.into();
        self
    }

    /// Set the maximum number of redirect hops followed per request
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.max_redirects = max;
        self
    }

    pub fn upstream_timeout_secs(mut self, secs: u64) -> Self {
        self.config.upstream_timeout_secs = Some(secs);
        self
    }

    /// Serve Prometheus metrics on a separate address
    pub fn metrics_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.metrics_addr = Some(addr.into());
        self
    }

    /// Set TLS configuration
    pub fn tls(mut self, cert_path: impl Into<String>, key_path: impl Into<String>) -> Self {
        self.config.tls = Some(TlsConfig {
            cert_path: cert_path.into(),
            key_path: key_path.into(),
        });
        self
    }

    pub fn log_format(mut self, format: LogFormat) -> Self {
        self.config.log_format = format;
        self
    }

    /// Validate and build the final RelayConfig
    pub fn build(self) -> ValidationResult<RelayConfig> {
        ConfigValidator::validate(&self.config)?;
        Ok(self.config)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TlsConfig {
    pub cert_path: String,
    pub key_path: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    #[default]
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "pretty")]
    Pretty,
}
