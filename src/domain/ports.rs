use crate::domain::model::{
    AccessToken, AuthReply, Dog, Location, LocationSearchParams, LocationSearchResult, Relay,
    SearchResult,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn cookie_name(&self) -> &str;
    fn request_timeout(&self) -> Duration;
}

/// 遠端狗狗 API 的邊界；路由只透過這個 trait 與上游溝通
#[async_trait]
pub trait DogApi: Send + Sync {
    async fn login(&self, credentials: &Value) -> Result<AuthReply>;

    async fn logout(&self, token: Option<&AccessToken>, body: &Value) -> Result<AuthReply>;

    async fn breeds(&self, token: &AccessToken) -> Result<Relay>;

    async fn dogs(&self, token: &AccessToken, ids: &Value) -> Result<Relay>;

    async fn match_dogs(&self, token: &AccessToken, ids: &Value) -> Result<Relay>;

    async fn search_dogs(
        &self,
        token: &AccessToken,
        query: &[(String, String)],
    ) -> Result<SearchResult>;

    async fn fetch_dogs(&self, token: &AccessToken, ids: &[String]) -> Result<Vec<Dog>>;

    async fn locations(&self, token: &AccessToken, zip_codes: &[String]) -> Result<Vec<Location>>;

    async fn search_locations(
        &self,
        token: &AccessToken,
        params: &LocationSearchParams,
    ) -> Result<LocationSearchResult>;
}

/// Paths on the remote API, used to tag upstream failures.
pub mod endpoints {
    pub const LOGIN: &str = "/auth/login";
    pub const LOGOUT: &str = "/auth/logout";
    pub const BREEDS: &str = "/dogs/breeds";
    pub const DOGS: &str = "/dogs";
    pub const DOG_SEARCH: &str = "/dogs/search";
    pub const MATCH: &str = "/dogs/match";
    pub const LOCATIONS: &str = "/locations";
    pub const LOCATION_SEARCH: &str = "/locations/search";
}
