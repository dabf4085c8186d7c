/// Weather data provider abstraction
///
/// Handlers depend on the `WeatherProvider` trait rather than a concrete API
/// client, so the RapidAPI client, its caching decorator and test fakes are
/// interchangeable.
use crate::{
    error::AppResult,
    models::{Coordinates, Location, WeatherForecast, WeatherObservation},
};

pub mod cached;
pub mod open_weather;

pub use cached::CachedWeatherProvider;
pub use open_weather::OpenWeatherProvider;

/// Trait for weather providers
#[async_trait::async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch current conditions for a city or a coordinate pair
    ///
    /// A city's `country` is an ISO 3166-1 alpha-2 style code. A single attempt
    /// is made; callers decide whether to retry.
    async fn current_weather(&self, location: &Location) -> AppResult<WeatherObservation>;

    /// Fetch the day-by-day forecast around a coordinate pair
    async fn forecast(&self, coordinates: Coordinates) -> AppResult<WeatherForecast>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
