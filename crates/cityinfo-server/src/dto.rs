use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use cityinfo_core::models::{City, PointOfInterest};

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthenticationRequest {
    pub user_name: Option<String>,
    pub password: Option<String>,
}

// ---------------------------------------------------------------------------
// Cities
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ListCitiesQuery {
    /// Exact city name
    pub name: Option<String>,
    /// Substring matched against name and description
    pub search_query: Option<String>,
    /// 1-based page number (default 1)
    pub page_number: Option<i64>,
    /// Items per page (default 10, max 20)
    pub page_size: Option<i64>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct GetCityQuery {
    /// Include the nested points of interest (default false)
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub include_points_of_interest: Option<bool>,
}

/// Accepts `true`/`false` in any letter case.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let value = raw.trim();
    if value.eq_ignore_ascii_case("true") {
        Ok(Some(true))
    } else if value.eq_ignore_ascii_case("false") {
        Ok(Some(false))
    } else {
        Err(de::Error::invalid_value(
            de::Unexpected::Str(value),
            &"true or false",
        ))
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CityWithoutPointsOfInterestDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

impl From<City> for CityWithoutPointsOfInterestDto {
    fn from(city: City) -> Self {
        Self {
            id: city.id,
            name: city.name,
            description: city.description,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CityDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub number_of_points_of_interest: usize,
    pub points_of_interest: Vec<PointOfInterestDto>,
}

impl From<City> for CityDto {
    fn from(city: City) -> Self {
        Self {
            id: city.id,
            name: city.name,
            description: city.description,
            number_of_points_of_interest: city.points_of_interest.len(),
            points_of_interest: city
                .points_of_interest
                .into_iter()
                .map(PointOfInterestDto::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PointOfInterestDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

impl From<PointOfInterest> for PointOfInterestDto {
    fn from(poi: PointOfInterest) -> Self {
        Self {
            id: poi.id,
            name: poi.name,
            description: poi.description,
        }
    }
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Multipart form accepted by the upload endpoint (documentation only).
#[derive(utoipa::ToSchema)]
pub struct UploadForm {
    /// PDF document, at most 20 MiB
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: &'static str,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
