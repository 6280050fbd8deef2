use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use thiserror::Error;

use crate::config::models::{RelayConfig, TlsConfig};

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Configuration validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("Invalid listen address: {address} - {reason}")]
    InvalidListenAddress { address: String, reason: String },

    #[error("Invalid TLS configuration: {message}")]
    InvalidTls { message: String },
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validator with detailed error reporting
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete relay configuration
    pub fn validate(config: &RelayConfig) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_listen_address(&config.listen_addr) {
            errors.push(e);
        }

        if let Some(metrics_addr) = &config.metrics_addr {
            if let Err(e) = Self::validate_listen_address(metrics_addr) {
                errors.push(e);
            } else if metrics_addr == &config.listen_addr {
                errors.push(ValidationError::InvalidField {
                    field: "metrics_addr".to_string(),
                    message: "Must differ from listen_addr".to_string(),
                });
            }
        }

        if let Err(e) = Self::validate_route_prefix(&config.route_prefix) {
            errors.push(e);
        }

        if config.forwarded_ip.parse::<IpAddr>().is_err() {
            errors.push(ValidationError::InvalidField {
                field: "forwarded_ip".to_string(),
                message: format!("'{}' is not an IP address", config.forwarded_ip),
            });
        }

        if config.max_redirects == 0 {
            errors.push(ValidationError::InvalidField {
                field: "max_redirects".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if config.upstream_timeout_secs == Some(0) {
            errors.push(ValidationError::InvalidField {
                field: "upstream_timeout_secs".to_string(),
                message: "Must be at least 1 second when set".to_string(),
            });
        }

        if let Some(tls_config) = &config.tls {
            if let Err(e) = Self::validate_tls_config(tls_config) {
                errors.push(e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::ValidationFailed {
                message: Self::format_multiple_errors(errors),
            })
        }
    }

    /// Validate listen address format
    fn validate_listen_address(address: &str) -> ValidationResult<()> {
        if address.parse::<SocketAddr>().is_err() {
            return Err(ValidationError::InvalidListenAddress {
                address: address.to_string(),
                reason: "Must be in format 'IP:PORT' (e.g., '127.0.0.1:3000' or '0.0.0.0:8080')"
                    .to_string(),
            });
        }
        Ok(())
    }

    fn validate_route_prefix(prefix: &str) -> ValidationResult<()> {
        if !prefix.starts_with('/') || !prefix.ends_with('/') || prefix.len() < 3 {
            return Err(ValidationError::InvalidField {
                field: format!("route_prefix: {prefix}"),
                message: "Must start and end with '/' and name a segment (e.g., '/x/')"
                    .to_string(),
            });
        }
        Ok(())
    }

    fn validate_tls_config(config: &TlsConfig) -> ValidationResult<()> {
        if !Path::new(&config.cert_path).exists() {
            return Err(ValidationError::InvalidTls {
                message: format!("Certificate file not found: {}", config.cert_path),
            });
        }

        if !Path::new(&config.key_path).exists() {
            return Err(ValidationError::InvalidTls {
                message: format!("Private key file not found: {}", config.key_path),
            });
        }

        Ok(())
    }

    fn format_multiple_errors(errors: Vec<ValidationError>) -> String {
        let mut message = format!("Found {} validation error(s):\n", errors.len());
        for (i, error) in errors.iter().enumerate() {
            message.push_str(&format!("  {}. {}\n", i + 1, error));
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = RelayConfig::default();
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_invalid_listen_address() {
        let config = RelayConfig {
            listen_addr: "invalid_address".to_string(),
            ..Default::default()
        };

        let result = ConfigValidator::validate(&config);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid listen address")
        );
    }

    #[test]
    fn test_route_prefix_rules() {
        assert!(ConfigValidator::validate_route_prefix("/x/").is_ok());
        assert!(ConfigValidator::validate_route_prefix("/relay/").is_ok());
        assert!(ConfigValidator::validate_route_prefix("/").is_err());
        assert!(ConfigValidator::validate_route_prefix("//").is_err());
        assert!(ConfigValidator::validate_route_prefix("/x").is_err());
        assert!(ConfigValidator::validate_route_prefix("x/").is_err());
    }

    #[test]
    fn test_invalid_forwarded_ip() {
        let config = RelayConfig {
            forwarded_ip: "not-an-ip".to_string(),
            ..Default::default()
        };

        let message = ConfigValidator::validate(&config).unwrap_err().to_string();
        assert!(message.contains("forwarded_ip"));
    }

    #[test]
    fn test_metrics_addr_must_differ() {
        let config = RelayConfig {
            listen_addr: "127.0.0.1:8080".to_string(),
            metrics_addr: Some("127.0.0.1:8080".to_string()),
            ..Default::default()
        };

        let message = ConfigValidator::validate(&config).unwrap_err().to_string();
        assert!(message.contains("metrics_addr"));
    }

    #[test]
    fn test_collects_every_error() {
        let config = RelayConfig {
            max_redirects: 0,
            upstream_timeout_secs: Some(0),
            tls: Some(TlsConfig {
                cert_path: "/nonexistent/cert.pem".to_string(),
                key_path: "/nonexistent/key.pem".to_string(),
            }),
            ..Default::default()
        };

        let message = ConfigValidator::validate(&config).unwrap_err().to_string();
        assert!(message.contains("Found 3 validation error(s)"));
        assert!(message.contains("max_redirects"));
        assert!(message.contains("upstream_timeout_secs"));
        assert!(message.contains("Certificate file not found"));
    }
}
