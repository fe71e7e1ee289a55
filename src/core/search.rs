use crate::core::query::DogQuery;
use crate::domain::model::{
    AccessToken, GeoBoundingBox, LocationSearchParams, SearchArea, SearchResponse, SearchResult,
};
use crate::domain::ports::DogApi;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::sync::Arc;

/// 邊界框查詢地點時一次取回的上限
pub const AREA_LOCATION_LIMIT: u32 = 100;

/// Composes the remote search, location and dog endpoints into one call.
pub struct DogSearch<A: DogApi + ?Sized> {
    api: Arc<A>,
}

impl<A: DogApi + ?Sized> Clone for DogSearch<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
        }
    }
}

impl<A: DogApi + ?Sized> DogSearch<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    /// Runs the search, then fetches the full records of the matched ids.
    pub async fn search_with_dogs(
        &self,
        token: &AccessToken,
        query: &DogQuery,
    ) -> Result<SearchResponse> {
        query.validate()?;

        let result = self.api.search_dogs(token, &query.to_query_pairs()).await?;
        tracing::debug!(
            "Search matched {} dogs, {} ids on this page",
            result.total,
            result.result_ids.len()
        );

        if result.result_ids.is_empty() {
            return Ok(SearchResponse {
                result,
                dogs: Vec::new(),
            });
        }

        let dogs = self.api.fetch_dogs(token, &result.result_ids).await?;
        Ok(SearchResponse { result, dogs })
    }

    /// Narrows the search to the ZIP codes inside `query.geo_bounding_box`, when set.
    pub async fn search_in_area(&self, token: &AccessToken, query: &DogQuery) -> Result<SearchResult> {
        query.validate()?;

        let mut query = query.clone();
        if let Some(area) = query.geo_bounding_box.take() {
            let zip_codes = self.zip_codes_in(token, area).await?;
            // 框內沒有任何地點時不加地區條件，照常搜尋全部
            if zip_codes.is_empty() {
                tracing::debug!("Bounding box contains no locations, searching without a zip filter");
            } else {
                tracing::debug!("Bounding box contains {} zip codes", zip_codes.len());
            }
            query.append_zip_codes(zip_codes);
        }

        self.api.search_dogs(token, &query.to_query_pairs()).await
    }

    async fn zip_codes_in(&self, token: &AccessToken, area: SearchArea) -> Result<Vec<String>> {
        let params = LocationSearchParams {
            geo_bounding_box: Some(GeoBoundingBox::from_corners(area.top_left, area.bottom_right)),
            size: Some(AREA_LOCATION_LIMIT),
            ..Default::default()
        };

        let found = self.api.search_locations(token, &params).await?;
        Ok(found
            .results
            .into_iter()
            .map(|location| location.zip_code)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        AuthReply, Coordinates, Dog, Location, LocationSearchResult, Relay,
    };
    use crate::domain::ports::endpoints;
    use crate::utils::error::ProxyError;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockApi {
        search_result: SearchResult,
        locations: Vec<Location>,
        search_fails_with: Option<u16>,
        calls: Mutex<Vec<String>>,
        last_query: Mutex<Vec<(String, String)>>,
        last_location_params: Mutex<Option<LocationSearchParams>>,
    }

    impl MockApi {
        fn record(&self, call: &str) {
            self.calls.lock().unwrap().push(call.to_string());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn dog(id: &str) -> Dog {
        Dog {
            id: id.to_string(),
            img: format!("https://img.example.com/{}.jpg", id),
            name: format!("Dog {}", id),
            age: 3,
            zip_code: "10001".to_string(),
            breed: "Beagle".to_string(),
        }
    }

    fn location(zip: &str) -> Location {
        Location {
            zip_code: zip.to_string(),
            latitude: 40.7,
            longitude: -74.0,
            city: "New York".to_string(),
            state: "NY".to_string(),
            county: "New York".to_string(),
        }
    }

    #[async_trait]
    impl DogApi for MockApi {
        async fn login(&self, _credentials: &Value) -> Result<AuthReply> {
            unimplemented!()
        }

        async fn logout(&self, _token: Option<&AccessToken>, _body: &Value) -> Result<AuthReply> {
            unimplemented!()
        }

        async fn breeds(&self, _token: &AccessToken) -> Result<Relay> {
            unimplemented!()
        }

        async fn dogs(&self, _token: &AccessToken, _ids: &Value) -> Result<Relay> {
            unimplemented!()
        }

        async fn match_dogs(&self, _token: &AccessToken, _ids: &Value) -> Result<Relay> {
            unimplemented!()
        }

        async fn search_dogs(
            &self,
            _token: &AccessToken,
            query: &[(String, String)],
        ) -> Result<SearchResult> {
            self.record("search");
            *self.last_query.lock().unwrap() = query.to_vec();
            if let Some(status) = self.search_fails_with {
                return Err(ProxyError::UpstreamStatus {
                    endpoint: endpoints::DOG_SEARCH,
                    status,
                });
            }
            Ok(self.search_result.clone())
        }

        async fn fetch_dogs(&self, _token: &AccessToken, ids: &[String]) -> Result<Vec<Dog>> {
            self.record("dogs");
            Ok(ids.iter().map(|id| dog(id)).collect())
        }

        async fn locations(&self, _token: &AccessToken, _zip_codes: &[String]) -> Result<Vec<Location>> {
            unimplemented!()
        }

        async fn search_locations(
            &self,
            _token: &AccessToken,
            params: &LocationSearchParams,
        ) -> Result<LocationSearchResult> {
            self.record("locations");
            *self.last_location_params.lock().unwrap() = Some(params.clone());
            Ok(LocationSearchResult {
                results: self.locations.clone(),
                total: self.locations.len() as u64,
            })
        }
    }

    fn token() -> AccessToken {
        AccessToken::new("token")
    }

    #[tokio::test]
    async fn test_search_hydrates_dogs() {
        let api = Arc::new(MockApi {
            search_result: SearchResult {
                result_ids: vec!["a".to_string(), "b".to_string()],
                total: 2,
                ..Default::default()
            },
            ..Default::default()
        });
        let search = DogSearch::new(api.clone());

        let response = search
            .search_with_dogs(&token(), &DogQuery::default())
            .await
            .unwrap();

        assert_eq!(api.calls(), vec!["search", "dogs"]);
        assert_eq!(response.dogs.len(), 2);
        assert_eq!(response.dogs[1].id, "b");
        assert_eq!(response.result.total, 2);
    }

    #[tokio::test]
    async fn test_empty_search_skips_hydration() {
        let api = Arc::new(MockApi::default());
        let search = DogSearch::new(api.clone());

        let response = search
            .search_with_dogs(&token(), &DogQuery::default())
            .await
            .unwrap();

        assert_eq!(api.calls(), vec!["search"]);
        assert!(response.dogs.is_empty());
    }

    #[tokio::test]
    async fn test_area_search_merges_zip_codes() {
        let api = Arc::new(MockApi {
            locations: vec![location("10001"), location("10002")],
            ..Default::default()
        });
        let search = DogSearch::new(api.clone());

        let query = DogQuery {
            zip_codes: vec!["90210".to_string()],
            size: Some(25),
            geo_bounding_box: Some(SearchArea {
                top_left: Coordinates { lat: 41.0, lon: -75.0 },
                bottom_right: Coordinates { lat: 40.0, lon: -73.0 },
            }),
            ..Default::default()
        };

        search.search_in_area(&token(), &query).await.unwrap();

        assert_eq!(api.calls(), vec!["locations", "search"]);

        let params = api.last_location_params.lock().unwrap().clone().unwrap();
        assert_eq!(params.size, Some(AREA_LOCATION_LIMIT));
        let bbox = params.geo_bounding_box.unwrap();
        assert_eq!(bbox.top_left, Some(Coordinates { lat: 41.0, lon: -75.0 }));
        assert_eq!(bbox.bottom_right, Some(Coordinates { lat: 40.0, lon: -73.0 }));

        let zips: Vec<String> = api
            .last_query
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, _)| key == "zipCodes")
            .map(|(_, value)| value.clone())
            .collect();
        assert_eq!(zips, vec!["90210", "10001", "10002"]);
    }

    #[tokio::test]
    async fn test_empty_area_searches_without_zip_filter() {
        let api = Arc::new(MockApi::default());
        let search = DogSearch::new(api.clone());

        let query = DogQuery {
            geo_bounding_box: Some(SearchArea {
                top_left: Coordinates { lat: 10.0, lon: -30.0 },
                bottom_right: Coordinates { lat: 9.0, lon: -29.0 },
            }),
            ..Default::default()
        };

        search.search_in_area(&token(), &query).await.unwrap();

        assert_eq!(api.calls(), vec!["locations", "search"]);
        assert!(api
            .last_query
            .lock()
            .unwrap()
            .iter()
            .all(|(key, _)| key != "zipCodes"));
    }

    #[tokio::test]
    async fn test_area_search_without_box_is_plain_search() {
        let api = Arc::new(MockApi::default());
        let search = DogSearch::new(api.clone());

        search
            .search_in_area(&token(), &DogQuery::default())
            .await
            .unwrap();

        assert_eq!(api.calls(), vec!["search"]);
    }

    #[tokio::test]
    async fn test_search_failure_is_propagated() {
        let api = Arc::new(MockApi {
            search_fails_with: Some(502),
            ..Default::default()
        });
        let search = DogSearch::new(api.clone());

        let err = search
            .search_with_dogs(&token(), &DogQuery::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ProxyError::UpstreamStatus { status: 502, .. }));
        assert_eq!(api.calls(), vec!["search"]);
    }

    #[tokio::test]
    async fn test_invalid_age_range_makes_no_calls() {
        let api = Arc::new(MockApi::default());
        let search = DogSearch::new(api.clone());

        let query = DogQuery {
            age_min: Some(10),
            age_max: Some(1),
            ..Default::default()
        };
        assert!(search.search_in_area(&token(), &query).await.is_err());
        assert!(api.calls().is_empty());
    }
}
