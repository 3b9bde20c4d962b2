//! Operator configuration
//!
//! Settings come from an optional TOML file layered under command line flags
//! and environment variables. The binary parses both into [`ConfigLayer`]s and
//! [`OperatorConfig::resolve`] merges them.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::mediatailor::HttpClientConfig;

pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_REQUEUE_SECONDS: u64 = 300;
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_API_PORT: u16 = 8080;

/// Log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// One source of settings; every field is optional
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    /// Base URL of the MediaTailor control plane
    pub endpoint: Option<String>,
    pub token: Option<String>,
    pub namespace: Option<String>,
    pub requeue_seconds: Option<u64>,
    pub request_timeout_seconds: Option<u64>,
    pub log_format: Option<LogFormat>,
    pub api_port: Option<u16>,
}

impl ConfigLayer {
    /// Read a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&raw)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::ConfigError(format!("Invalid config: {e}")))
    }

    /// Values from `self` win over values from `base`
    pub fn over(self, base: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            endpoint: self.endpoint.or(base.endpoint),
            token: self.token.or(base.token),
            namespace: self.namespace.or(base.namespace),
            requeue_seconds: self.requeue_seconds.or(base.requeue_seconds),
            request_timeout_seconds: self
                .request_timeout_seconds
                .or(base.request_timeout_seconds),
            log_format: self.log_format.or(base.log_format),
            api_port: self.api_port.or(base.api_port),
        }
    }
}

/// Fully resolved operator settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperatorConfig {
    pub endpoint: String,
    pub token: Option<String>,
    pub namespace: String,
    pub requeue_interval: Duration,
    pub request_timeout: Duration,
    pub log_format: LogFormat,
    pub api_port: u16,
}

impl OperatorConfig {
    /// Merge command line/environment values over an optional file layer
    pub fn resolve(overrides: ConfigLayer, file: Option<ConfigLayer>) -> Result<Self> {
        let merged = overrides.over(file.unwrap_or_default());

        let endpoint = merged
            .endpoint
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| {
                Error::ConfigError(
                    "MediaTailor endpoint is required (--endpoint or MEDIATAILOR_ENDPOINT)"
                        .to_string(),
                )
            })?;

        let requeue_seconds = merged.requeue_seconds.unwrap_or(DEFAULT_REQUEUE_SECONDS);
        if requeue_seconds == 0 {
            return Err(Error::ConfigError(
                "requeue_seconds must be greater than zero".to_string(),
            ));
        }
        let timeout_seconds = merged
            .request_timeout_seconds
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS);
        if timeout_seconds == 0 {
            return Err(Error::ConfigError(
                "request_timeout_seconds must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            endpoint,
            token: merged.token.filter(|t| !t.is_empty()),
            namespace: merged
                .namespace
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            requeue_interval: Duration::from_secs(requeue_seconds),
            request_timeout: Duration::from_secs(timeout_seconds),
            log_format: merged.log_format.unwrap_or_default(),
            api_port: merged.api_port.unwrap_or(DEFAULT_API_PORT),
        })
    }

    pub fn client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            endpoint: self.endpoint.clone(),
            token: self.token.clone(),
            timeout: self.request_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_apply() {
        let config = OperatorConfig::resolve(
            ConfigLayer {
                endpoint: Some("https://api.mediatailor.us-east-1.amazonaws.com".to_string()),
                ..Default::default()
            },
            None,
        )
        .unwrap();

        assert_eq!(config.namespace, "default");
        assert_eq!(config.requeue_interval, Duration::from_secs(300));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.api_port, 8080);
        assert!(config.token.is_none());
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
endpoint = "https://file.example.com"
namespace = "media"
requeue_seconds = 120
log_format = "json"
"#
        )
        .unwrap();

        let from_file = ConfigLayer::from_file(file.path()).unwrap();
        let config = OperatorConfig::resolve(
            ConfigLayer {
                endpoint: Some("https://flag.example.com".to_string()),
                requeue_seconds: Some(60),
                ..Default::default()
            },
            Some(from_file),
        )
        .unwrap();

        assert_eq!(config.endpoint, "https://flag.example.com");
        assert_eq!(config.namespace, "media");
        assert_eq!(config.requeue_interval, Duration::from_secs(60));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_missing_endpoint_is_rejected() {
        let err = OperatorConfig::resolve(ConfigLayer::default(), None).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_zero_requeue_is_rejected() {
        let err = OperatorConfig::resolve(
            ConfigLayer {
                endpoint: Some("https://example.com".to_string()),
                requeue_seconds: Some(0),
                ..Default::default()
            },
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("requeue_seconds"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(ConfigLayer::from_toml("endpoint = \"x\"\nregion = \"us-east-1\"").is_err());
    }

    #[test]
    fn test_client_config_carries_timeout() {
        let config = OperatorConfig::resolve(
            ConfigLayer {
                endpoint: Some("https://example.com".to_string()),
                token: Some("secret".to_string()),
                request_timeout_seconds: Some(5),
                ..Default::default()
            },
            None,
        )
        .unwrap();

        let client = config.client_config();
        assert_eq!(client.timeout, Duration::from_secs(5));
        assert_eq!(client.token.as_deref(), Some("secret"));
    }
}
