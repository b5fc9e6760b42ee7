use dotenvy::dotenv;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cache;
mod commands;
mod config;
mod db;
mod error;
mod patch;
mod routes;
mod state;

#[cfg(test)]
mod integration_tests;
#[cfg(test)]
mod validation_tests;

use axum::{routing::get, Router};
use cache::CacheClient;
use config::Settings;
use state::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env();
    tracing::info!(
        "Starting {} backend ({})...",
        settings.app_name,
        settings.app_env
    );

    let pool = match db::init_pool(&settings.database_path).await {
        Ok(pool) => {
            tracing::info!("Database opened at {}", settings.database_path.display());
            if let Err(e) = db::init_database(&pool).await {
                tracing::error!("Failed to run migrations: {}", e);
                return;
            }
            pool
        }
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            return;
        }
    };

    let cache = match settings.redis_url.as_deref() {
        Some(url) => match CacheClient::open(url) {
            Ok(client) => {
                tracing::info!("Redis cache configured");
                Some(client)
            }
            Err(e) => {
                tracing::error!("Invalid REDIS_URL: {}", e);
                return;
            }
        },
        None => None,
    };

    let prefix = settings.api_v1_prefix.clone();
    let port = settings.port;

    let app_state = AppState {
        pool,
        cache,
        settings: Arc::new(settings),
    };

    let app = Router::new()
        .route("/", get(commands::system::root))
        .nest(&prefix, routes::create_router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state);

    let addr_str = format!("0.0.0.0:{}", port);
    let addr = addr_str.parse::<SocketAddr>().expect("Invalid address");

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
