//! Immutable demo data and the in-memory [`CityStore`] built on it.
//!
//! The seed is constructed and validated once at start-up, then shared behind
//! an `Arc`. Nothing mutates it while requests are served. The PostgreSQL
//! backend inserts the same records into an empty database.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::City;
use crate::pagination::{PageRequest, PaginationMetadata};
use crate::traits::{CityFilter, CityStore};

/// Validated, id-ordered set of cities.
#[derive(Debug, Clone)]
pub struct SeedData {
    cities: Arc<[City]>,
}

impl SeedData {
    /// Validate `cities` and sort them (and their points of interest) by id.
    ///
    /// Fails on model constraint violations and on duplicate city or
    /// point-of-interest ids.
    pub fn new(mut cities: Vec<City>) -> Result<Self, AppError> {
        let mut city_ids = HashSet::new();
        let mut poi_ids = HashSet::new();
        for city in &mut cities {
            city.validate()?;
            if !city_ids.insert(city.id) {
                return Err(AppError::InvalidData(format!("duplicate city id {}", city.id)));
            }
            for poi in &city.points_of_interest {
                if !poi_ids.insert(poi.id) {
                    return Err(AppError::InvalidData(format!(
                        "duplicate point of interest id {}",
                        poi.id
                    )));
                }
            }
            city.points_of_interest.sort_by_key(|p| p.id);
        }
        cities.sort_by_key(|c| c.id);

        Ok(Self {
            cities: cities.into(),
        })
    }

    /// The demo dataset served when no database is configured.
    pub fn demo() -> Result<Self, AppError> {
        Self::new(vec![
            City::new(1, "New York City", Some("The one with that big park"))
                .with_point_of_interest(1, "Central Park", Some("The most visited park ever."))
                .with_point_of_interest(
                    2,
                    "Empire State Building",
                    Some("A 102-story skyscraper located in Midtown Manhattan."),
                ),
            City::new(
                2,
                "Antwerp",
                Some("The one with the cathedral that was never really finished"),
            )
            .with_point_of_interest(
                3,
                "Cathedral of Our Lady",
                Some("A Gothic style cathedral, conceived by architects Jan and Pieter Appelmans."),
            )
            .with_point_of_interest(
                4,
                "Antwerp Central Station",
                Some("The finest example of railway architecture in Belgium."),
            ),
            City::new(3, "Paris", Some("The one with that big tower"))
                .with_point_of_interest(
                    5,
                    "Eiffel Tower",
                    Some("A wrought iron lattice tower on the Champ de Mars."),
                )
                .with_point_of_interest(6, "The Louvre", Some("The world's largest museum.")),
        ])
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

/// [`CityStore`] answering queries straight from a [`SeedData`].
#[derive(Debug, Clone)]
pub struct SeedStore {
    seed: SeedData,
}

impl SeedStore {
    pub fn new(seed: SeedData) -> Self {
        Self { seed }
    }
}

impl CityStore for SeedStore {
    async fn list_cities(
        &self,
        filter: &CityFilter,
        page: PageRequest,
    ) -> Result<(Vec<City>, PaginationMetadata), AppError> {
        let matching: Vec<&City> = self
            .seed
            .cities()
            .iter()
            .filter(|c| filter.matches(c))
            .collect();

        let metadata = PaginationMetadata::new(matching.len() as u64, page);
        let items = matching
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.page_size() as usize)
            .map(City::without_points_of_interest)
            .collect();

        Ok((items, metadata))
    }

    async fn get_city(
        &self,
        city_id: i32,
        include_points_of_interest: bool,
    ) -> Result<Option<City>, AppError> {
        let city = self.seed.cities().iter().find(|c| c.id == city_id);

        Ok(city.map(|c| {
            if include_points_of_interest {
                c.clone()
            } else {
                c.without_points_of_interest()
            }
        }))
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
