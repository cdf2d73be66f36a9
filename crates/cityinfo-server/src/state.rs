use std::sync::Arc;

use cityinfo_core::pagination::{PageRequest, PaginationMetadata};
use cityinfo_core::{AppError, City, CityFilter, CityStore, CredentialValidator, SeedStore};
use cityinfo_db::CityRepository;

use crate::files::FileStorage;
use crate::token::TokenService;

/// The city store selected at start-up.
#[derive(Clone)]
pub enum CityBackend {
    Postgres(CityRepository),
    Seed(SeedStore),
}

impl CityStore for CityBackend {
    async fn list_cities(
        &self,
        filter: &CityFilter,
        page: PageRequest,
    ) -> Result<(Vec<City>, PaginationMetadata), AppError> {
        match self {
            CityBackend::Postgres(repo) => repo.list_cities(filter, page).await,
            CityBackend::Seed(store) => store.list_cities(filter, page).await,
        }
    }

    async fn get_city(
        &self,
        city_id: i32,
        include_points_of_interest: bool,
    ) -> Result<Option<City>, AppError> {
        match self {
            CityBackend::Postgres(repo) => repo.get_city(city_id, include_points_of_interest).await,
            CityBackend::Seed(store) => store.get_city(city_id, include_points_of_interest).await,
        }
    }

    async fn health_check(&self) -> Result<(), AppError> {
        match self {
            CityBackend::Postgres(repo) => repo.health_check().await,
            CityBackend::Seed(store) => store.health_check().await,
        }
    }
}

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub cities: CityBackend,
    pub tokens: TokenService,
    pub credentials: Arc<dyn CredentialValidator>,
    pub files: FileStorage,
}
