use super::error::ApiError;
use super::state::SharedState;
use crate::domain::model::AccessToken;
use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;

/// 從 Cookie 標頭取出指定名稱的值
pub fn token_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<AccessToken> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| AccessToken::new(value))
}

/// Requires the access-token cookie; rejects with 401 when it is missing.
#[derive(Debug, Clone)]
pub struct AuthToken(pub AccessToken);

impl FromRequestParts<SharedState> for AuthToken {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        token_from_headers(&parts.headers, &state.cookie_name)
            .map(AuthToken)
            .ok_or_else(ApiError::unauthenticated)
    }
}

/// The access-token cookie, if the browser sent one.
#[derive(Debug, Clone)]
pub struct MaybeAuthToken(pub Option<AccessToken>);

impl FromRequestParts<SharedState> for MaybeAuthToken {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthToken(token_from_headers(
            &parts.headers,
            &state.cookie_name,
        )))
    }
}
