use crate::domain::model::{AccessToken, GeocodeResult, Location};
use crate::domain::ports::DogApi;
use crate::utils::error::{ProxyError, Result};

impl From<&Location> for GeocodeResult {
    fn from(location: &Location) -> Self {
        Self {
            place_id: 1,
            licence: "Fetch API".to_string(),
            lat: location.latitude.to_string(),
            lon: location.longitude.to_string(),
            display_name: format!("{}, {} {}", location.city, location.state, location.zip_code),
            kind: "zipcode".to_string(),
            importance: 1,
        }
    }
}

/// 以郵遞區號查詢座標，回傳地圖元件可直接使用的格式
pub async fn geocode<A: DogApi + ?Sized>(
    api: &A,
    token: &AccessToken,
    zip_code: &str,
) -> Result<GeocodeResult> {
    let locations = api.locations(token, &[zip_code.to_string()]).await?;

    locations
        .first()
        .map(GeocodeResult::from)
        .ok_or_else(|| ProxyError::not_found("No location found for this ZIP code"))
}
