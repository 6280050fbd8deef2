use std::path::Path;
use thiserror::Error;
use tokio::fs;

use crate::config::models::RelayConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML config: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

pub async fn load_config<P: AsRef<Path>>(path: P) -> ConfigResult<RelayConfig> {
    let config_content = fs::read_to_string(path).await?;
    let config: RelayConfig = serde_yaml::from_str(&config_content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "listen_addr: \"127.0.0.1:7000\"\nroute_prefix: \"/r/\"\nmax_redirects: 3"
        )
        .unwrap();

        let config = load_config(file.path()).await.unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:7000");
        assert_eq!(config.route_prefix, "/r/");
        assert_eq!(config.max_redirects, 3);
        assert_eq!(config.forwarded_ip, "1.2.3.4");
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = load_config("/nonexistent/relay.yaml").await;
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[tokio::test]
    async fn test_load_malformed_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_redirects: [not, a, number]").unwrap();

        let result = load_config(file.path()).await;
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
