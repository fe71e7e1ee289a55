use crate::utils::error::{ProxyError, Result};
use std::net::SocketAddr;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ProxyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ProxyError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ProxyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_socket_addr(field_name: &str, value: &str) -> Result<SocketAddr> {
    value
        .parse::<SocketAddr>()
        .map_err(|e| ProxyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Invalid socket address: {}", e),
        })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ProxyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ProxyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 遠端 `/locations` 一次最多接受 100 個郵遞區號
pub const MAX_ZIP_CODES_PER_REQUEST: usize = 100;

pub const INVALID_ZIP_BATCH: &str = "Invalid request: must provide array of up to 100 zip codes";

pub fn validate_zip_code_batch(zip_codes: &[String]) -> Result<()> {
    if zip_codes.len() > MAX_ZIP_CODES_PER_REQUEST {
        return Err(ProxyError::validation(INVALID_ZIP_BATCH));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("upstream.base_url", "https://example.com").is_ok());
        assert!(validate_url("upstream.base_url", "http://localhost:8080").is_ok());
        assert!(validate_url("upstream.base_url", "").is_err());
        assert!(validate_url("upstream.base_url", "invalid-url").is_err());
        assert!(validate_url("upstream.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_socket_addr() {
        assert!(validate_socket_addr("server.bind", "0.0.0.0:3000").is_ok());
        assert!(validate_socket_addr("server.bind", "[::1]:8080").is_ok());
        assert!(validate_socket_addr("server.bind", "localhost").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("upstream.timeout_seconds", 30u64, 1, 300).is_ok());
        assert!(validate_range("upstream.timeout_seconds", 0u64, 1, 300).is_err());
        assert!(validate_range("upstream.timeout_seconds", 301u64, 1, 300).is_err());
    }

    #[test]
    fn test_validate_zip_code_batch() {
        let ok: Vec<String> = (0..100).map(|i| format!("{:05}", i)).collect();
        assert!(validate_zip_code_batch(&ok).is_ok());

        let too_many: Vec<String> = (0..101).map(|i| format!("{:05}", i)).collect();
        let err = validate_zip_code_batch(&too_many).unwrap_err();
        assert!(
            matches!(err, ProxyError::ValidationError { ref message } if message == INVALID_ZIP_BATCH)
        );
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("upstream.cookie_name", "fetch-access-token").is_ok());
        assert!(validate_non_empty_string("upstream.cookie_name", "   ").is_err());
    }
}
