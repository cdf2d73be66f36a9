use cityinfo_core::error::AppError;
use cityinfo_core::models::{City, PointOfInterest};
use cityinfo_core::pagination::{PageRequest, PaginationMetadata};
use cityinfo_core::traits::{CityFilter, CityStore};
use sqlx::{PgPool, Pool, Postgres, QueryBuilder};

/// Repository for city and point-of-interest reads in PostgreSQL.
#[derive(Clone)]
pub struct CityRepository {
    pool: Pool<Postgres>,
}

impl CityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get one page of cities matching `filter`, ordered by id, plus paging metadata.
    pub async fn list_cities(
        &self,
        filter: &CityFilter,
        page: PageRequest,
    ) -> Result<(Vec<City>, PaginationMetadata), AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM cities");
        push_filter(&mut count, filter);
        let (total,) = count
            .build_query_as::<(i64,)>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        let mut select =
            QueryBuilder::<Postgres>::new("SELECT id, name, description FROM cities");
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY id ASC LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let rows = select
            .build_query_as::<CityRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        let metadata = PaginationMetadata::new(total.max(0) as u64, page);
        Ok((rows.into_iter().map(Into::into).collect(), metadata))
    }

    /// Get a city by id, optionally with its points of interest.
    pub async fn get_city(
        &self,
        city_id: i32,
        include_points_of_interest: bool,
    ) -> Result<Option<City>, AppError> {
        let row = sqlx::query_as::<_, CityRow>(
            r#"SELECT id, name, description FROM cities WHERE id = $1"#,
        )
        .bind(city_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut city = City::from(row);

        if include_points_of_interest {
            city.points_of_interest = self.points_of_interest_for(city_id).await?;
        }

        Ok(Some(city))
    }

    /// Get all points of interest owned by a city, ordered by id.
    pub async fn points_of_interest_for(
        &self,
        city_id: i32,
    ) -> Result<Vec<PointOfInterest>, AppError> {
        let rows = sqlx::query_as::<_, PointOfInterestRow>(
            r#"
            SELECT id, city_id, name, description
            FROM points_of_interest
            WHERE city_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(city_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

/// Append the WHERE clause for `filter`. `strpos` keeps the substring match
/// literal, so `%` and `_` in the search text are not wildcards.
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &CityFilter) {
    let mut keyword = " WHERE ";
    if let Some(name) = &filter.name {
        builder.push(keyword).push("name = ").push_bind(name.clone());
        keyword = " AND ";
    }
    if let Some(search) = &filter.search {
        builder
            .push(keyword)
            .push("(strpos(name, ")
            .push_bind(search.clone())
            .push(") > 0 OR strpos(COALESCE(description, ''), ")
            .push_bind(search.clone())
            .push(") > 0)");
    }
}

// -- Internal row types for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct CityRow {
    id: i32,
    name: String,
    description: Option<String>,
}

impl From<CityRow> for City {
    fn from(row: CityRow) -> Self {
        City {
            id: row.id,
            name: row.name,
            description: row.description,
            points_of_interest: Vec::new(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct PointOfInterestRow {
    id: i32,
    city_id: i32,
    name: String,
    description: Option<String>,
}

impl From<PointOfInterestRow> for PointOfInterest {
    fn from(row: PointOfInterestRow) -> Self {
        PointOfInterest {
            id: row.id,
            city_id: row.city_id,
            name: row.name,
            description: row.description,
        }
    }
}

// -- Trait implementation --

impl CityStore for CityRepository {
    async fn list_cities(
        &self,
        filter: &CityFilter,
        page: PageRequest,
    ) -> Result<(Vec<City>, PaginationMetadata), AppError> {
        CityRepository::list_cities(self, filter, page).await
    }

    async fn get_city(
        &self,
        city_id: i32,
        include_points_of_interest: bool,
    ) -> Result<Option<City>, AppError> {
        CityRepository::get_city(self, city_id, include_points_of_interest).await
    }

    async fn health_check(&self) -> Result<(), AppError> {
        CityRepository::health_check(self).await
    }
}
