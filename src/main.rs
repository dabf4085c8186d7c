use std::sync::Arc;

use axum::Router;
use outfit_api::{
    config::{Config, Secrets},
    db::{self, Cache, CacheWriterHandle, ClothingStore, PgClothingStore},
    services::{CachedWeatherProvider, OpenWeatherProvider, WeatherProvider},
    AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("outfit_api=debug,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let (app, cache_handle) = match config.secrets() {
        Some(secrets) => build_app(&config, secrets).await?,
        None => {
            let missing = config.missing_secrets();
            tracing::error!(
                missing = ?missing,
                "Required configuration missing, every route will answer 500"
            );
            (outfit_api::misconfigured_router(&missing), None)
        }
    };

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %config.bind_address(), "Starting weather outfit server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Wires the store, weather provider and optional cache into the router
async fn build_app(
    config: &Config,
    secrets: Secrets,
) -> anyhow::Result<(Router, Option<CacheWriterHandle>)> {
    let pool = db::create_pool(&secrets.database_url)?;
    if let Err(e) = db::run_migrations(&pool).await {
        tracing::error!(error = %e, "Database migrations failed, continuing without them");
    }
    let clothing_store: Arc<dyn ClothingStore> = Arc::new(PgClothingStore::new(pool));

    let open_weather: Arc<dyn WeatherProvider> = Arc::new(OpenWeatherProvider::new(
        secrets.rapidapi_key,
        config.weather_api_url.clone(),
        config.weather_api_host.clone(),
    )?);

    let (weather_provider, cache_handle) = match &config.redis_url {
        Some(redis_url) => {
            let (cache, handle) = Cache::new(db::create_redis_client(redis_url)?);
            tracing::info!(ttl = config.weather_cache_ttl, "Weather cache enabled");
            let provider: Arc<dyn WeatherProvider> = Arc::new(CachedWeatherProvider::new(
                open_weather,
                cache,
                config.weather_cache_ttl,
            ));
            (provider, Some(handle))
        }
        None => (open_weather, None),
    };

    let state = AppState::new(weather_provider, clothing_store);
    Ok((outfit_api::create_router(state), cache_handle))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
