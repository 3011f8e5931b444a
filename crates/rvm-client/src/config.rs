//! Client configuration with YAML support

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RvmClientError};
use crate::retry::RetryPolicy;

/// RVM client configuration
///
/// Can be loaded from YAML or constructed programmatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Connection settings
    pub connection: ConnectionConfig,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: TimeoutsConfig,

    /// Retry policy for actuation commands
    #[serde(default)]
    pub retry: RetryConfig,

    /// Range-prediction telemetry upload (optional)
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}

/// Connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Base URL of the telematics backend
    pub base_url: String,

    /// Account username; the login identifier is derived from it
    pub username: String,

    /// Account password
    pub password: String,

    /// Client-identifying user agent, sent on every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Fixed Accept-Language header
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

fn default_user_agent() -> String {
    "MG iSMART/1.1.1 (iPhone; iOS 16.3; Scale/3.00)".to_string()
}

fn default_accept_language() -> String {
    "de-DE;q=1, en-DE;q=0.9, lu-DE;q=0.8, fr-DE;q=0.7".to_string()
}

/// Timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    /// Request timeout in milliseconds
    #[serde(default = "default_request_ms")]
    pub request_ms: u64,

    /// Connection timeout in milliseconds
    #[serde(default = "default_connect_ms")]
    pub connect_ms: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            request_ms: default_request_ms(),
            connect_ms: default_connect_ms(),
        }
    }
}

fn default_request_ms() -> u64 {
    30_000
}

fn default_connect_ms() -> u64 {
    10_000
}

/// Retry configuration for actuation commands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per command, first attempt included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between consecutive attempts, milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2_000
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            delay: Duration::from_millis(self.delay_ms),
        }
    }
}

/// Range-prediction telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// API key of the range-prediction service
    pub api_key: String,

    /// Per-user upload token
    pub user_token: String,

    /// Upload endpoint
    #[serde(default = "default_telemetry_endpoint")]
    pub endpoint: String,
}

fn default_telemetry_endpoint() -> String {
    "https://api.iternio.com/1/tlm/send".to_string()
}

impl ClientConfig {
    /// Configuration with defaults for everything but the credentials
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            connection: ConnectionConfig {
                base_url: base_url.into(),
                username: username.into(),
                password: password.into(),
                user_agent: default_user_agent(),
                accept_language: default_accept_language(),
            },
            timeouts: TimeoutsConfig::default(),
            retry: RetryConfig::default(),
            telemetry: None,
        }
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| RvmClientError::Config(e.to_string()))
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| RvmClientError::Config(e.to_string()))?;
        Self::from_yaml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behavior() {
        let config = ClientConfig::new("https://tap.example.com", "user", "pw");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay_ms, 2_000);
        assert!(config.telemetry.is_none());
        assert!(config.connection.user_agent.contains("iSMART"));
    }

    #[test]
    fn yaml_fills_missing_sections_with_defaults() {
        let yaml = r#"
connection:
  base_url: "https://tap.example.com"
  username: "abc"
  password: "secret"
telemetry:
  api_key: "key"
  user_token: "tok"
"#;
        let config = ClientConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.timeouts.request_ms, 30_000);
        assert_eq!(config.retry.policy().max_attempts, 3);
        let telemetry = config.telemetry.unwrap();
        assert_eq!(telemetry.endpoint, "https://api.iternio.com/1/tlm/send");
    }

    #[test]
    fn invalid_yaml_is_a_config_error() {
        let err = ClientConfig::from_yaml("connection: [").unwrap_err();
        assert!(matches!(err, RvmClientError::Config(_)));
    }
}
