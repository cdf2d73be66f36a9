use std::future::Future;

use crate::error::AppError;
use crate::models::{AuthenticatedUser, City};
use crate::pagination::{PageRequest, PaginationMetadata};

/// Filters applied when listing cities.
///
/// Both filters are trimmed and blank values are treated as absent.
/// When both are present they are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityFilter {
    /// Exact, case-sensitive match on the city name.
    pub name: Option<String>,
    /// Case-sensitive substring match on name or description.
    pub search: Option<String>,
}

impl CityFilter {
    pub fn new(name: Option<&str>, search: Option<&str>) -> Self {
        Self {
            name: normalize(name),
            search: normalize(search),
        }
    }

    /// Returns true if `city` satisfies every filter that is set.
    pub fn matches(&self, city: &City) -> bool {
        let name_ok = self.name.as_deref().is_none_or(|n| city.name == n);
        let search_ok = self.search.as_deref().is_none_or(|q| {
            city.name.contains(q)
                || city
                    .description
                    .as_deref()
                    .is_some_and(|d| d.contains(q))
        });
        name_ok && search_ok
    }
}

fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Read access to the city collection.
pub trait CityStore: Send + Sync + Clone {
    /// One page of cities matching `filter`, ordered by id, without points of interest.
    fn list_cities(
        &self,
        filter: &CityFilter,
        page: PageRequest,
    ) -> impl Future<Output = Result<(Vec<City>, PaginationMetadata), AppError>> + Send;

    /// A single city, loading its points of interest only when asked to.
    fn get_city(
        &self,
        city_id: i32,
        include_points_of_interest: bool,
    ) -> impl Future<Output = Result<Option<City>, AppError>> + Send;

    /// Check that the backing store is reachable.
    fn health_check(&self) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Checks a username/password pair and returns the matching identity.
pub trait CredentialValidator: Send + Sync {
    fn validate(&self, username: Option<&str>, password: Option<&str>) -> Option<AuthenticatedUser>;
}

/// Accepts every credential pair and returns a fixed demo identity.
///
/// Stand-in until a real credential store with hashed passwords exists.
#[derive(Debug, Clone, Default)]
pub struct DemoCredentials;

impl CredentialValidator for DemoCredentials {
    fn validate(&self, username: Option<&str>, _password: Option<&str>) -> Option<AuthenticatedUser> {
        Some(AuthenticatedUser {
            user_id: 1,
            username: username.unwrap_or_default().to_string(),
            first_name: "Kevi".to_string(),
            last_name: "Docx".to_string(),
            city: "Antwer".to_string(),
        })
    }
}
