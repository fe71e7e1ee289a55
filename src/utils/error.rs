use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Upstream request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("{message}")]
    NotFound { message: String },

    #[error("Upstream {endpoint} responded with status {status}")]
    UpstreamStatus { endpoint: &'static str, status: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 呼叫端的請求有問題 (4xx)
    Client,
    /// 遠端 API 回傳非成功狀態
    Upstream,
    /// 網路或序列化失敗
    Transport,
    /// 啟動時的配置問題
    Configuration,
}

impl ProxyError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. } | Self::Unauthenticated | Self::NotFound { .. } => {
                ErrorCategory::Client
            }
            Self::UpstreamStatus { .. } => ErrorCategory::Upstream,
            Self::HttpError(_) | Self::IoError(_) | Self::SerializationError(_) => {
                ErrorCategory::Transport
            }
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    /// 給終端使用者看的錯誤訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::HttpError(e) if e.is_timeout() => {
                "The dog service took too long to respond".to_string()
            }
            Self::HttpError(e) if e.is_connect() => "Could not reach the dog service".to_string(),
            Self::HttpError(_) => "Request to the dog service failed".to_string(),
            Self::MissingConfigError { field } => {
                format!("Missing required setting '{}'", field)
            }
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Client => "Check the request parameters and authentication cookie",
            ErrorCategory::Upstream => "Check the status of the remote dog API",
            ErrorCategory::Transport => "Check network connectivity and the configured base URL",
            ErrorCategory::Configuration => "Fix the configuration file or command-line flags",
        }
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;
