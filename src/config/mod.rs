#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_range, validate_socket_addr, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use toml_config::TomlConfig;

pub const DEFAULT_BASE_URL: &str = "https://frontend-take-home-service.fetch.com";
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_COOKIE_NAME: &str = "fetch-access-token";

/// Effective settings after merging defaults, the TOML file and CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    pub base_url: String,
    pub timeout_seconds: u64,
    pub cookie_name: String,
    pub allowed_origins: Vec<String>,
    pub json_logs: bool,
    pub verbose: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            allowed_origins: Vec::new(),
            json_logs: false,
            verbose: false,
        }
    }
}

impl ServerConfig {
    /// 以檔案中有設定的欄位覆蓋預設值
    pub fn from_toml(file: TomlConfig) -> Self {
        let defaults = Self::default();
        Self {
            bind: file.server.bind.unwrap_or(defaults.bind),
            base_url: file.upstream.base_url.unwrap_or(defaults.base_url),
            timeout_seconds: file
                .upstream
                .timeout_seconds
                .unwrap_or(defaults.timeout_seconds),
            cookie_name: file.upstream.cookie_name.unwrap_or(defaults.cookie_name),
            allowed_origins: file.cors.allowed_origins.unwrap_or(defaults.allowed_origins),
            json_logs: file.logging.json.unwrap_or(defaults.json_logs),
            verbose: file.logging.verbose.unwrap_or(defaults.verbose),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        validate_socket_addr("server.bind", &self.bind)
    }
}

impl ConfigProvider for ServerConfig {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<()> {
        validate_url("upstream.base_url", &self.base_url)?;
        validate_socket_addr("server.bind", &self.bind)?;
        validate_non_empty_string("upstream.cookie_name", &self.cookie_name)?;
        validate_range("upstream.timeout_seconds", self.timeout_seconds, 1, 300)?;
        for origin in &self.allowed_origins {
            validate_url("cors.allowed_origins", origin)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.cookie_name(), "fetch-access-token");
    }

    #[test]
    fn test_from_toml_overrides_defaults() {
        let file = TomlConfig::from_toml_str(
            r#"
[upstream]
base_url = "http://localhost:9000"
timeout_seconds = 5
"#,
        )
        .unwrap();

        let config = ServerConfig::from_toml(file);
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.timeout_seconds, 5);
        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.cookie_name, DEFAULT_COOKIE_NAME);
    }

    #[test]
    fn test_validation_failures() {
        let config = ServerConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ServerConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ServerConfig {
            bind: "nowhere".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ServerConfig {
            allowed_origins: vec!["localhost:5173".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
