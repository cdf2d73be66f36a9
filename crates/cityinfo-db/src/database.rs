use cityinfo_core::{AppError, SeedData};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::DatabaseConfig;
use crate::repository::CityRepository;

/// Owns the connection pool and hands out repositories.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL with the given configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {e}")))?;

        Ok(Self { pool })
    }

    /// Create a `Database` from an existing pool (useful for testing).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run all pending migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Insert `seed` when the `cities` table is empty. Returns the number of cities inserted.
    ///
    /// Runs in one transaction; ids are taken from the seed and the serial
    /// sequences are moved past them afterwards.
    pub async fn seed(&self, seed: &SeedData) -> Result<usize, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cities")
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        if existing > 0 {
            tracing::debug!(existing, "Cities table already populated, skipping seed");
            return Ok(0);
        }

        for city in seed.cities() {
            sqlx::query("INSERT INTO cities (id, name, description) VALUES ($1, $2, $3)")
                .bind(city.id)
                .bind(&city.name)
                .bind(&city.description)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::DatabaseError(e.to_string()))?;

            for poi in &city.points_of_interest {
                sqlx::query(
                    r#"
                    INSERT INTO points_of_interest (id, city_id, name, description)
                    VALUES ($1, $2, $3, $4)
                    "#,
                )
                .bind(poi.id)
                .bind(poi.city_id)
                .bind(&poi.name)
                .bind(&poi.description)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::DatabaseError(e.to_string()))?;
            }
        }

        for table in ["cities", "points_of_interest"] {
            sqlx::query(&format!(
                "SELECT setval(pg_get_serial_sequence('{table}', 'id'), \
                 COALESCE((SELECT MAX(id) FROM {table}), 0) + 1, false)"
            ))
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        tracing::info!(cities = seed.len(), "Seeded database");
        Ok(seed.len())
    }

    /// Get a [`CityRepository`] backed by this pool.
    pub fn city_repo(&self) -> CityRepository {
        CityRepository::new(self.pool.clone())
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
