//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::BalancerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<BalancerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: BalancerConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_file_round_trips() {
        let toml = r#"
            [listener]
            port = 9000

            [[backends]]
            address = "server1:8080"

            [[backends]]
            address = "server2:8080"

            [health_check]
            interval_secs = 5
            timeout_secs = 2
            path = "/healthz"

            [forwarding]
            timeout_secs = 4
            https = true
            trace_enabled = false
        "#;
        let config: BalancerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.listener.port, 9000);
        assert_eq!(config.backends.len(), 2);
        assert_eq!(config.health_check.path, "/healthz");
        assert_eq!(config.forwarding.scheme(), "https");
        assert!(!config.forwarding.trace_enabled);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let toml = r#"
            [[backends]]
            address = "server1:8080"
        "#;
        let config: BalancerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.listener.port, 8090);
        assert_eq!(config.health_check.interval_secs, 10);
        assert_eq!(config.forwarding.timeout_secs, 3);
        assert_eq!(config.forwarding.scheme(), "http");
        assert!(config.forwarding.trace_enabled);
    }
}
