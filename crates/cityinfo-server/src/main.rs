use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use cityinfo_core::{DemoCredentials, SeedData, SeedStore};
use cityinfo_db::{Database, DatabaseConfig};
use cityinfo_server::config::ServerConfig;
use cityinfo_server::files::FileStorage;
use cityinfo_server::routes;
use cityinfo_server::state::{AppState, CityBackend};
use cityinfo_server::token::TokenService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("cityinfo=info".parse()?))
        .with_target(false)
        .init();

    let config = ServerConfig::from_env()?;
    let tokens = TokenService::new(&config.auth)?;
    let seed = SeedData::demo()?;

    let cities = match DatabaseConfig::from_env()? {
        Some(db_config) => {
            let db = Database::connect(&db_config).await?;
            db.migrate().await?;
            db.seed(&seed).await?;
            CityBackend::Postgres(db.city_repo())
        }
        None => {
            tracing::info!("DATABASE_URL not set, serving {} seeded cities from memory", seed.len());
            CityBackend::Seed(SeedStore::new(seed))
        }
    };

    let state = Arc::new(AppState {
        cities,
        tokens,
        credentials: Arc::new(DemoCredentials),
        files: FileStorage::new(&config.files_dir, &config.upload_dir),
    });

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    tracing::info!("Shutdown signal received");
}
