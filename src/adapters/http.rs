use crate::domain::model::{
    AccessToken, AuthReply, Dog, Location, LocationSearchParams, LocationSearchResult, Relay,
    SearchResult,
};
use crate::domain::ports::{endpoints, ConfigProvider, DogApi};
use crate::utils::error::{ProxyError, Result};
use async_trait::async_trait;
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

/// reqwest implementation of [`DogApi`]; one pooled client shared by every route.
#[derive(Debug, Clone)]
pub struct HttpDogApi {
    client: Client,
    base_url: String,
    cookie_name: String,
}

impl HttpDogApi {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            cookie_name: config.cookie_name().to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn cookie_header(&self, token: &AccessToken) -> String {
        format!("{}={}", self.cookie_name, token.value())
    }

    fn authed(&self, builder: RequestBuilder, token: &AccessToken) -> RequestBuilder {
        builder.header(COOKIE, self.cookie_header(token))
    }

    async fn relay(endpoint: &str, response: Response) -> Result<Relay> {
        let status = response.status();
        let text = response.text().await?;
        tracing::debug!("{} responded {} ({} bytes)", endpoint, status, text.len());

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str::<Value>(&text) {
                Ok(value) => value,
                // 上游偶爾回傳純文字 (例如 "Unauthorized")
                Err(_) if status.is_success() => Value::String(text),
                Err(_) => json!({ "error": text }),
            }
        };

        Ok(Relay {
            status: status.as_u16(),
            body,
        })
    }

    async fn expect_json<T: DeserializeOwned>(
        endpoint: &'static str,
        response: Response,
    ) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            tracing::warn!("{} responded with status {}", endpoint, status);
            return Err(ProxyError::UpstreamStatus {
                endpoint,
                status: status.as_u16(),
            });
        }
        Ok(response.json::<T>().await?)
    }

    async fn auth_reply(response: Response) -> Result<AuthReply> {
        let status = response.status().as_u16();
        let set_cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok().map(str::to_string))
            .collect();
        let text = response.text().await?;

        Ok(AuthReply {
            status,
            text,
            set_cookie,
        })
    }
}

#[async_trait]
impl DogApi for HttpDogApi {
    async fn login(&self, credentials: &Value) -> Result<AuthReply> {
        tracing::debug!("Sending auth request to: {}", self.url(endpoints::LOGIN));
        let response = self
            .client
            .post(self.url(endpoints::LOGIN))
            .json(credentials)
            .send()
            .await?;

        tracing::debug!("Auth response status: {}", response.status());
        Self::auth_reply(response).await
    }

    async fn logout(&self, token: Option<&AccessToken>, body: &Value) -> Result<AuthReply> {
        let mut request = self.client.post(self.url(endpoints::LOGOUT)).json(body);
        if let Some(token) = token {
            request = self.authed(request, token);
        }

        let response = request.send().await?;
        Self::auth_reply(response).await
    }

    async fn breeds(&self, token: &AccessToken) -> Result<Relay> {
        let response = self
            .authed(self.client.get(self.url(endpoints::BREEDS)), token)
            .send()
            .await?;
        Self::relay(endpoints::BREEDS, response).await
    }

    async fn dogs(&self, token: &AccessToken, ids: &Value) -> Result<Relay> {
        let response = self
            .authed(self.client.post(self.url(endpoints::DOGS)), token)
            .json(ids)
            .send()
            .await?;
        Self::relay(endpoints::DOGS, response).await
    }

    async fn match_dogs(&self, token: &AccessToken, ids: &Value) -> Result<Relay> {
        let response = self
            .authed(self.client.post(self.url(endpoints::MATCH)), token)
            .json(ids)
            .send()
            .await?;
        Self::relay(endpoints::MATCH, response).await
    }

    async fn search_dogs(
        &self,
        token: &AccessToken,
        query: &[(String, String)],
    ) -> Result<SearchResult> {
        tracing::debug!("Searching dogs with {} query parameters", query.len());
        let response = self
            .authed(self.client.get(self.url(endpoints::DOG_SEARCH)), token)
            .query(query)
            .send()
            .await?;
        Self::expect_json(endpoints::DOG_SEARCH, response).await
    }

    async fn fetch_dogs(&self, token: &AccessToken, ids: &[String]) -> Result<Vec<Dog>> {
        let response = self
            .authed(self.client.post(self.url(endpoints::DOGS)), token)
            .json(ids)
            .send()
            .await?;
        Self::expect_json(endpoints::DOGS, response).await
    }

    async fn locations(&self, token: &AccessToken, zip_codes: &[String]) -> Result<Vec<Location>> {
        let response = self
            .authed(self.client.post(self.url(endpoints::LOCATIONS)), token)
            .json(zip_codes)
            .send()
            .await?;
        Self::expect_json(endpoints::LOCATIONS, response).await
    }

    async fn search_locations(
        &self,
        token: &AccessToken,
        params: &LocationSearchParams,
    ) -> Result<LocationSearchResult> {
        let response = self
            .authed(self.client.post(self.url(endpoints::LOCATION_SEARCH)), token)
            .json(params)
            .send()
            .await?;
        Self::expect_json(endpoints::LOCATION_SEARCH, response).await
    }
}
