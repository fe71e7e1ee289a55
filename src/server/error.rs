use crate::utils::error::ProxyError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Error reply of every route: `{"error": message}` with `status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthenticated() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Not authenticated")
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// 上游的非成功狀態碼原樣回傳給瀏覽器
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
        Self::new(status, message)
    }

    /// Client-side errors keep their own message; anything else is logged
    /// and answered with the route's fixed 500 message.
    pub fn from_proxy(err: ProxyError, internal: &'static str) -> Self {
        match err {
            ProxyError::Unauthenticated => Self::unauthenticated(),
            ProxyError::ValidationError { message } => Self::bad_request(message),
            ProxyError::NotFound { message } => Self::new(StatusCode::NOT_FOUND, message),
            ProxyError::UpstreamStatus { endpoint, status } => {
                tracing::warn!("{}: {} responded with status {}", internal, endpoint, status);
                Self::upstream(status, internal)
            }
            other => {
                tracing::error!(
                    "{}: {} (category: {:?})",
                    internal,
                    other,
                    other.category()
                );
                Self::internal(internal)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub trait ProxyResultExt<T> {
    /// Maps any failure through [`ApiError::from_proxy`].
    fn or_internal(self, internal: &'static str) -> Result<T, ApiError>;

    /// Like `or_internal`, but upstream status failures get a custom message.
    fn or_upstream<F>(self, on_status: F, internal: &'static str) -> Result<T, ApiError>
    where
        F: FnOnce(&'static str, u16) -> String;
}

impl<T> ProxyResultExt<T> for Result<T, ProxyError> {
    fn or_internal(self, internal: &'static str) -> Result<T, ApiError> {
        self.map_err(|err| ApiError::from_proxy(err, internal))
    }

    fn or_upstream<F>(self, on_status: F, internal: &'static str) -> Result<T, ApiError>
    where
        F: FnOnce(&'static str, u16) -> String,
    {
        self.map_err(|err| match err {
            ProxyError::UpstreamStatus { endpoint, status } => {
                tracing::warn!("{} responded with status {}", endpoint, status);
                ApiError::upstream(status, on_status(endpoint, status))
            }
            other => ApiError::from_proxy(other, internal),
        })
    }
}
