use crate::domain::model::SearchArea;
use crate::utils::error::{ProxyError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Breeds,
    ZipCodes,
    AgeMin,
    AgeMax,
    Size,
    Age,
    Name,
    Breed,
}

impl SortField {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Breeds => "breeds",
            Self::ZipCodes => "zipCodes",
            Self::AgeMin => "ageMin",
            Self::AgeMax => "ageMax",
            Self::Size => "size",
            Self::Age => "age",
            Self::Name => "name",
            Self::Breed => "breed",
        }
    }
}

impl FromStr for SortField {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "breeds" => Ok(Self::Breeds),
            "zipCodes" => Ok(Self::ZipCodes),
            "ageMin" => Ok(Self::AgeMin),
            "ageMax" => Ok(Self::AgeMax),
            "size" => Ok(Self::Size),
            "age" => Ok(Self::Age),
            "name" => Ok(Self::Name),
            "breed" => Ok(Self::Breed),
            other => Err(ProxyError::validation(format!(
                "Unsupported sort field: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// `field:asc` or `field:desc`, as the remote search expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl FromStr for Sort {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self> {
        let (field, direction) = s
            .split_once(':')
            .ok_or_else(|| ProxyError::validation(format!("Invalid sort '{}': expected field:asc|desc", s)))?;

        let direction = match direction {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            other => {
                return Err(ProxyError::validation(format!(
                    "Invalid sort direction: {}",
                    other
                )))
            }
        };

        Ok(Self {
            field: field.parse()?,
            direction,
        })
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{}:{}", self.field.as_str(), direction)
    }
}

impl TryFrom<String> for Sort {
    type Error = ProxyError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Sort> for String {
    fn from(sort: Sort) -> Self {
        sort.to_string()
    }
}

/// Dog search filters as sent by the browser, either as a query string or a JSON body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DogQuery {
    #[serde(default)]
    pub breeds: Vec<String>,
    #[serde(default)]
    pub zip_codes: Vec<String>,
    pub age_min: Option<u32>,
    pub age_max: Option<u32>,
    pub size: Option<u32>,
    pub from: Option<u32>,
    pub page: Option<u32>,
    pub sort: Option<Sort>,
    pub geo_bounding_box: Option<SearchArea>,
}

fn parse_number(key: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| ProxyError::validation(format!("Invalid value for {}: '{}'", key, value)))
}

impl DogQuery {
    /// 解析 URL query pairs；breeds 與 zipCodes 可重複出現，未知參數忽略
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = Self::default();

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "breeds" => query.breeds.push(value.to_string()),
                "zipCodes" => query.zip_codes.push(value.to_string()),
                "ageMin" => query.age_min = Some(parse_number(key, value)?),
                "ageMax" => query.age_max = Some(parse_number(key, value)?),
                "size" => query.size = Some(parse_number(key, value)?),
                "from" => query.from = Some(parse_number(key, value)?),
                "page" => query.page = Some(parse_number(key, value)?),
                "sort" => query.sort = Some(value.parse()?),
                other => tracing::debug!("Ignoring unknown search parameter: {}", other),
            }
        }

        Ok(query)
    }

    pub fn from_query_string(raw: &str) -> Result<Self> {
        Self::from_pairs(url::form_urlencoded::parse(raw.as_bytes()))
    }

    /// Offset of the first result: `page * size` wins over an explicit `from`.
    pub fn offset(&self) -> Option<u32> {
        match (self.page, self.size) {
            (Some(page), Some(size)) => Some(page.saturating_mul(size)),
            _ => self.from,
        }
    }

    pub fn append_zip_codes<I: IntoIterator<Item = String>>(&mut self, zip_codes: I) {
        self.zip_codes.extend(zip_codes);
    }

    /// Query pairs for the remote `/dogs/search`; `page` is folded into `from`.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = Vec::new();

        for breed in &self.breeds {
            pairs.push(("breeds".to_string(), breed.clone()));
        }
        for zip in &self.zip_codes {
            pairs.push(("zipCodes".to_string(), zip.clone()));
        }
        if let Some(age_min) = self.age_min {
            pairs.push(("ageMin".to_string(), age_min.to_string()));
        }
        if let Some(age_max) = self.age_max {
            pairs.push(("ageMax".to_string(), age_max.to_string()));
        }
        if let Some(size) = self.size {
            pairs.push(("size".to_string(), size.to_string()));
        }
        if let Some(from) = self.offset() {
            pairs.push(("from".to_string(), from.to_string()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort".to_string(), sort.to_string()));
        }

        pairs
    }

    #[cfg(test)]
    fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_query_pairs())
            .finish()
    }
}

impl Validate for DogQuery {
    fn validate(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.age_min, self.age_max) {
            if min > max {
                return Err(ProxyError::validation(format!(
                    "ageMin ({}) cannot be greater than ageMax ({})",
                    min, max
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_repeated_and_numeric_params() {
        let query = DogQuery::from_query_string(
            "breeds=Beagle&breeds=Golden%20Retriever&ageMin=2&ageMax=8&size=25&sort=breed:asc&foo=bar",
        )
        .unwrap();

        assert_eq!(query.breeds, vec!["Beagle", "Golden Retriever"]);
        assert_eq!(query.age_min, Some(2));
        assert_eq!(query.age_max, Some(8));
        assert_eq!(query.size, Some(25));
        assert_eq!(
            query.sort,
            Some(Sort {
                field: SortField::Breed,
                direction: SortDirection::Asc
            })
        );
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = DogQuery::from_query_string("ageMin=two").unwrap_err();
        assert!(matches!(err, ProxyError::ValidationError { .. }));
    }

    #[test]
    fn test_invalid_sort_is_rejected() {
        assert!("breed".parse::<Sort>().is_err());
        assert!("weight:asc".parse::<Sort>().is_err());
        assert!("breed:up".parse::<Sort>().is_err());
        assert_eq!("zipCodes:desc".parse::<Sort>().unwrap().to_string(), "zipCodes:desc");
    }

    #[test]
    fn test_page_folds_into_from() {
        let query = DogQuery {
            size: Some(25),
            page: Some(3),
            from: Some(5),
            ..Default::default()
        };
        assert_eq!(query.to_query_string(), "size=25&from=75");

        // 沒有 size 時 page 無法換算，改用 from
        let query = DogQuery {
            page: Some(3),
            from: Some(5),
            ..Default::default()
        };
        assert_eq!(query.to_query_string(), "from=5");
    }

    #[test]
    fn test_query_string_order_and_encoding() {
        let mut query = DogQuery {
            breeds: vec!["Cairn Terrier".to_string()],
            zip_codes: vec!["10001".to_string()],
            age_min: Some(1),
            sort: Some("name:desc".parse().unwrap()),
            ..Default::default()
        };
        query.append_zip_codes(vec!["10002".to_string()]);

        assert_eq!(
            query.to_query_string(),
            "breeds=Cairn+Terrier&zipCodes=10001&zipCodes=10002&ageMin=1&sort=name%3Adesc"
        );
    }

    #[test]
    fn test_json_body_with_null_bounding_box() {
        let query: DogQuery = serde_json::from_value(json!({
            "breeds": ["Pug"],
            "ageMax": 4,
            "sort": "age:asc",
            "geoBoundingBox": null
        }))
        .unwrap();

        assert_eq!(query.breeds, vec!["Pug"]);
        assert_eq!(query.age_max, Some(4));
        assert!(query.geo_bounding_box.is_none());
        assert!(query.zip_codes.is_empty());
    }

    #[test]
    fn test_validate_age_range() {
        let query = DogQuery {
            age_min: Some(9),
            age_max: Some(2),
            ..Default::default()
        };
        assert!(query.validate().is_err());

        let query = DogQuery {
            age_min: Some(2),
            age_max: Some(2),
            ..Default::default()
        };
        assert!(query.validate().is_ok());
    }
}
