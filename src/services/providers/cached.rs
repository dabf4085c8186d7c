use std::sync::Arc;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::AppResult,
    models::{Coordinates, Location, WeatherForecast, WeatherObservation},
    services::providers::WeatherProvider,
};

/// Read-through Redis cache in front of another weather provider
///
/// Observations are keyed by lowercased city and country or by rounded
/// coordinates; forecasts by rounded coordinates. Cache failures degrade to a
/// direct provider call.
#[derive(Clone)]
pub struct CachedWeatherProvider {
    inner: Arc<dyn WeatherProvider>,
    cache: Cache,
    ttl: u64,
}

impl CachedWeatherProvider {
    pub fn new(inner: Arc<dyn WeatherProvider>, cache: Cache, ttl: u64) -> Self {
        Self { inner, cache, ttl }
    }
}

#[async_trait::async_trait]
impl WeatherProvider for CachedWeatherProvider {
    async fn current_weather(&self, location: &Location) -> AppResult<WeatherObservation> {
        let key = CacheKey::for_location(location);

        cached!(self.cache, key, self.ttl, async move {
            self.inner.current_weather(location).await
        })
    }

    async fn forecast(&self, coordinates: Coordinates) -> AppResult<WeatherForecast> {
        let key = CacheKey::Forecast(coordinates);

        cached!(self.cache, key, self.ttl, async move {
            self.inner.forecast(coordinates).await
        })
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
