use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dog {
    pub id: String,
    pub img: String,
    pub name: String,
    pub age: u32,
    pub zip_code: String,
    pub breed: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub zip_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub state: String,
    pub county: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// 下拉選單使用的品種選項，value 與 label 相同
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breed {
    pub value: String,
    pub label: String,
}

impl Breed {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            value: name.clone(),
            label: name,
        }
    }
}

/// Any of the three shapes accepted by the remote location search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoBoundingBox {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom_left: Option<Coordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_right: Option<Coordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom_right: Option<Coordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_left: Option<Coordinates>,
}

impl GeoBoundingBox {
    pub fn from_corners(top_left: Coordinates, bottom_right: Coordinates) -> Self {
        Self {
            top_left: Some(top_left),
            bottom_right: Some(bottom_right),
            ..Self::default()
        }
    }

    pub fn is_well_formed(&self) -> bool {
        let has_edges = self.top.is_some()
            && self.left.is_some()
            && self.bottom.is_some()
            && self.right.is_some();
        let has_diagonal = self.bottom_left.is_some() && self.top_right.is_some();
        let has_all_corners = has_diagonal && self.bottom_right.is_some() && self.top_left.is_some();

        has_edges || has_diagonal || has_all_corners
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub states: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_bounding_box: Option<GeoBoundingBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationSearchResult {
    pub results: Vec<Location>,
    pub total: u64,
}

/// Bounding box sent with a dog search; only the diagonal corners are used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchArea {
    pub top_left: Coordinates,
    pub bottom_right: Coordinates,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub result_ids: Vec<String>,
    pub total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(flatten)]
    pub result: SearchResult,
    pub dogs: Vec<Dog>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub place_id: u32,
    pub licence: String,
    pub lat: String,
    pub lon: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub importance: u32,
}

/// 上游回應：狀態碼加上原樣的 JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct Relay {
    pub status: u16,
    pub body: Value,
}

impl Relay {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Reply from the remote auth endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthReply {
    pub status: u16,
    pub text: String,
    pub set_cookie: Vec<String>,
}

/// Value of the access-token cookie issued by the remote auth service.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(***)")
    }
}
