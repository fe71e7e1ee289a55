use super::toml_config::TomlConfig;
use super::ServerConfig;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "dogmatch")]
#[command(about = "Cookie-forwarding proxy for the dog adoption API")]
pub struct CliConfig {
    #[arg(long, short = 'c', env = "DOGMATCH_CONFIG", help = "Path to a TOML config file")]
    pub config: Option<String>,

    #[arg(long, env = "DOGMATCH_BASE_URL", help = "Base URL of the remote dog API")]
    pub base_url: Option<String>,

    #[arg(long, env = "DOGMATCH_BIND", help = "Socket address to listen on")]
    pub bind: Option<String>,

    #[arg(long, help = "Timeout for each upstream request")]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "Name of the access-token cookie")]
    pub cookie_name: Option<String>,

    #[arg(long, value_delimiter = ',', help = "Origins allowed by CORS")]
    pub allowed_origins: Vec<String>,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, short = 'v', help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// 合併順序：命令列 > 設定檔 > 預設值
    pub fn resolve(&self) -> Result<ServerConfig> {
        let file = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        let mut config = ServerConfig::from_toml(file);

        if let Some(bind) = &self.bind {
            config.bind = bind.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            config.timeout_seconds = timeout;
        }
        if let Some(cookie_name) = &self.cookie_name {
            config.cookie_name = cookie_name.clone();
        }
        if !self.allowed_origins.is_empty() {
            config.allowed_origins = self.allowed_origins.clone();
        }
        config.json_logs |= self.json_logs;
        config.verbose |= self.verbose;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cli_overrides_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                br#"
[server]
bind = "127.0.0.1:4000"

[upstream]
base_url = "http://file.example.com"
timeout_seconds = 12
"#,
            )
            .unwrap();

        let path = temp_file.path().to_str().unwrap().to_string();
        let cli = CliConfig::parse_from([
            "dogmatch",
            "--config",
            path.as_str(),
            "--base-url",
            "http://cli.example.com",
            "--allowed-origins",
            "http://a.example.com,http://b.example.com",
        ]);

        let config = cli.resolve().unwrap();
        assert_eq!(config.base_url, "http://cli.example.com");
        assert_eq!(config.bind, "127.0.0.1:4000");
        assert_eq!(config.timeout_seconds, 12);
        assert_eq!(config.allowed_origins.len(), 2);
        assert!(!config.verbose);
    }

    #[test]
    fn test_missing_config_file_fails() {
        let cli = CliConfig::parse_from(["dogmatch", "--config", "/nonexistent/dogmatch.toml"]);
        assert!(cli.resolve().is_err());
    }
}
