//! Process configuration.
//!
//! The inference credential is intentionally absent: it is entered per
//! session through the page and lives only in session memory.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};

use crate::error::ConfigError;

/// Default listen port (same as the usual local dashboard port).
pub const DEFAULT_PORT: u16 = 8501;

/// Default chat completions API base.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Remote inference endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpstreamConfig {
    /// Base URL; `/chat/completions` is appended to it
    pub api_base: String,
    /// TCP connect timeout in seconds. Nothing bounds the stream itself.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl UpstreamConfig {
    /// Check the API base parses as an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.api_base)
            .map_err(|e| ConfigError::from_url_error(&self.api_base, &e))?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ConfigError::InvalidApiBase {
                value: self.api_base.clone(),
                message: format!("unsupported scheme '{}'", other),
            }),
        }
    }

    /// Full chat completions URL, tolerating a trailing slash on the base.
    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Largest accepted multipart body, in bytes
    pub max_upload_bytes: usize,
    /// Idle sessions older than this are dropped
    pub session_ttl_secs: u64,
    /// Inference endpoint settings
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: 200 * 1024 * 1024,
            session_ttl_secs: 3600,
            upstream: UpstreamConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::ValidationError {
                field: "max_upload_bytes".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.session_ttl_secs == 0 {
            return Err(ConfigError::ValidationError {
                field: "session_ttl_secs".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        self.upstream.validate()
    }

    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.host.parse().map_err(|e: std::net::AddrParseError| {
            ConfigError::InvalidBindAddress { value: self.host.clone(), message: e.to_string() }
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_address().ok(), Some(SocketAddr::from(([127, 0, 0, 1], 8501))));
    }

    #[test]
    fn test_rejects_non_http_api_base() {
        let upstream =
            UpstreamConfig { api_base: "ftp://example.com".to_string(), ..Default::default() };
        assert!(matches!(upstream.validate(), Err(ConfigError::InvalidApiBase { .. })));

        let upstream = UpstreamConfig { api_base: "not a url".to_string(), ..Default::default() };
        assert!(matches!(upstream.validate(), Err(ConfigError::InvalidApiBase { .. })));
    }

    #[test]
    fn test_chat_completions_url_trims_slash() {
        let upstream = UpstreamConfig {
            api_base: "http://localhost:9000/v1/".to_string(),
            ..Default::default()
        };
        assert_eq!(upstream.chat_completions_url(), "http://localhost:9000/v1/chat/completions");
    }

    #[test]
    fn test_invalid_bind_address() {
        let config = ServerConfig { host: "localhost:80".to_string(), ..Default::default() };
        assert!(matches!(config.bind_address(), Err(ConfigError::InvalidBindAddress { .. })));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let config = ServerConfig { session_ttl_secs: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError { .. })));
    }
}
