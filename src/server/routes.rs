use super::auth::{AuthToken, MaybeAuthToken};
use super::error::{ApiError, ProxyResultExt};
use super::state::SharedState;
use crate::core::breeds::breed_options;
use crate::core::geocode::geocode;
use crate::core::query::DogQuery;
use crate::domain::model::{
    Dog, GeocodeResult, Location, LocationSearchParams, LocationSearchResult, Relay, SearchResponse,
    SearchResult,
};
use crate::domain::ports::endpoints;
use crate::utils::error::ProxyError;
use crate::utils::validation::{validate_zip_code_batch, INVALID_ZIP_BATCH};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, RawQuery, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

fn relay_response(relay: Relay) -> Response {
    let status = StatusCode::from_u16(relay.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, Json(relay.body)).into_response()
}

fn auth_response(status: u16, text: String, set_cookie: Vec<String>) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut response = (status, Json(json!({ "message": text }))).into_response();

    for cookie in set_cookie {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::warn!("Dropping unparsable Set-Cookie header: {}", e),
        }
    }

    response
}

pub async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn login_handler(
    State(state): State<SharedState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(credentials) = payload?;

    let reply = state
        .api
        .login(&credentials)
        .await
        .or_internal("Authentication failed")?;

    tracing::info!("Login responded with status {}", reply.status);
    Ok(auth_response(reply.status, reply.text, reply.set_cookie))
}

pub async fn logout_handler(
    State(state): State<SharedState>,
    MaybeAuthToken(token): MaybeAuthToken,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    // 登出時 body 可有可無
    let body = payload.map(|Json(body)| body).unwrap_or(json!({}));

    let reply = state
        .api
        .logout(token.as_ref(), &body)
        .await
        .or_internal("Logout failed")?;

    Ok(auth_response(reply.status, reply.text, Vec::new()))
}

pub async fn breeds_handler(
    State(state): State<SharedState>,
    AuthToken(token): AuthToken,
) -> Result<Response, ApiError> {
    let relay = state
        .api
        .breeds(&token)
        .await
        .or_internal("Failed to fetch breeds")?;

    Ok(relay_response(relay))
}

pub async fn breed_options_handler(
    State(state): State<SharedState>,
    AuthToken(token): AuthToken,
) -> Result<Response, ApiError> {
    let relay = state
        .api
        .breeds(&token)
        .await
        .or_internal("Failed to fetch breeds")?;

    if !relay.is_success() {
        return Ok(relay_response(relay));
    }

    let names: Vec<String> = serde_json::from_value(relay.body)
        .map_err(ProxyError::from)
        .or_internal("Failed to fetch breeds")?;

    Ok(Json(breed_options(names)).into_response())
}

pub async fn dogs_handler(
    State(state): State<SharedState>,
    AuthToken(token): AuthToken,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(ids) = payload?;

    let relay = state
        .api
        .dogs(&token, &ids)
        .await
        .or_internal("Failed to fetch dogs")?;

    Ok(relay_response(relay))
}

pub async fn dog_handler(
    State(state): State<SharedState>,
    AuthToken(token): AuthToken,
    Path(id): Path<String>,
) -> Result<Json<Dog>, ApiError> {
    let dogs = state
        .api
        .fetch_dogs(&token, std::slice::from_ref(&id))
        .await
        .or_internal("Failed to fetch dog")?;

    dogs.into_iter()
        .find(|dog| dog.id == id)
        .map(Json)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "Dog not found"))
}

pub async fn match_handler(
    State(state): State<SharedState>,
    AuthToken(token): AuthToken,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(ids) = payload?;

    let relay = state
        .api
        .match_dogs(&token, &ids)
        .await
        .or_internal("Failed to fetch dogs")?;

    if !relay.is_success() {
        return Ok(relay_response(relay));
    }

    let matched = relay.body.get("match").cloned().unwrap_or(Value::Null);
    tracing::debug!("Match result: {}", matched);
    Ok(relay_response(Relay {
        status: relay.status,
        body: matched,
    }))
}

fn search_failure_message(endpoint: &'static str, _status: u16) -> String {
    match endpoint {
        endpoints::DOGS => "Failed to fetch dog details",
        endpoints::LOCATION_SEARCH => "Failed to fetch locations in bounding box",
        _ => "Search request failed",
    }
    .to_string()
}

pub async fn search_handler(
    State(state): State<SharedState>,
    AuthToken(token): AuthToken,
    RawQuery(raw): RawQuery,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = DogQuery::from_query_string(raw.as_deref().unwrap_or_default())
        .or_internal("Failed to fetch search results")?;

    let response = state
        .search
        .search_with_dogs(&token, &query)
        .await
        .or_upstream(search_failure_message, "Failed to fetch search results")?;

    Ok(Json(response))
}

pub async fn area_search_handler(
    State(state): State<SharedState>,
    AuthToken(token): AuthToken,
    payload: Result<Json<DogQuery>, JsonRejection>,
) -> Result<Json<SearchResult>, ApiError> {
    let Json(query) = payload?;

    let result = state
        .search
        .search_in_area(&token, &query)
        .await
        .or_upstream(search_failure_message, "Internal server error")?;

    Ok(Json(result))
}

pub async fn locations_handler(
    State(state): State<SharedState>,
    AuthToken(token): AuthToken,
    payload: Result<Json<Vec<String>>, JsonRejection>,
) -> Result<Json<Vec<Location>>, ApiError> {
    let Json(zip_codes) = payload.map_err(|_| ApiError::bad_request(INVALID_ZIP_BATCH))?;
    validate_zip_code_batch(&zip_codes).or_internal("Failed to fetch locations")?;

    let locations = state
        .api
        .locations(&token, &zip_codes)
        .await
        .or_upstream(
            |_, status| format!("Failed to fetch locations with status {}", status),
            "Failed to fetch locations",
        )?;

    Ok(Json(locations))
}

pub async fn location_search_handler(
    State(state): State<SharedState>,
    AuthToken(token): AuthToken,
    payload: Result<Json<LocationSearchParams>, JsonRejection>,
) -> Result<Json<LocationSearchResult>, ApiError> {
    let Json(params) = payload?;

    if let Some(bbox) = &params.geo_bounding_box {
        if !bbox.is_well_formed() {
            return Err(ApiError::bad_request("Invalid geoBoundingBox format"));
        }
    }

    let result = state
        .api
        .search_locations(&token, &params)
        .await
        .or_upstream(
            |_, status| format!("Failed to search locations with status {}", status),
            "Failed to search locations",
        )?;

    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct GeocodeParams {
    pub address: Option<String>,
}

pub async fn geocode_handler(
    State(state): State<SharedState>,
    MaybeAuthToken(token): MaybeAuthToken,
    Query(params): Query<GeocodeParams>,
) -> Result<Json<Vec<GeocodeResult>>, ApiError> {
    // 先檢查參數再檢查登入狀態
    let zip_code = params
        .address
        .filter(|address| !address.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("ZIP code is required"))?;
    let token = token.ok_or_else(ApiError::unauthenticated)?;

    let result = geocode(&*state.api, &token, zip_code.trim())
        .await
        .or_upstream(
            |_, _| "Failed to get location data".to_string(),
            "Failed to geocode address",
        )?;

    Ok(Json(vec![result]))
}
