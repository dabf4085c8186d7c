/// open-weather13 provider (via RapidAPI)
///
/// Current weather lives at `/city/{city}/{country}` or
/// `/city/latlon/{lat}/{lon}`, the forecast at
/// `/city/fivedaysforcast/{lat}/{lon}`. Temperatures are in Kelvin.
/// Authentication is the RapidAPI key/host header pair.
use crate::{
    error::{AppError, AppResult},
    models::{
        ApiCurrentWeather, ApiForecast, Coordinates, Location, WeatherForecast,
        WeatherObservation,
    },
    services::providers::WeatherProvider,
};
use reqwest::{Client as HttpClient, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Timeout for a single weather request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const API_KEY_HEADER: &str = "x-rapidapi-key";
const API_HOST_HEADER: &str = "x-rapidapi-host";

/// Upstream spelling of the forecast path segment
const FORECAST_SEGMENT: &str = "fivedaysforcast";

#[derive(Clone)]
pub struct OpenWeatherProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    api_host: String,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, api_url: String, api_host: String) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url,
            api_host,
        })
    }

    /// Builds `{api_url}/city/{segments..}` with percent-encoded segments
    fn endpoint_url(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| AppError::Internal(format!("Invalid weather API URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| AppError::Internal("Weather API URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push("city")
            .extend(segments);

        Ok(url)
    }

    fn current_weather_url(&self, location: &Location) -> AppResult<Url> {
        match location {
            Location::City { name, country } => {
                self.endpoint_url(&[name.as_str(), country.as_str()])
            }
            Location::Coordinates(at) => {
                let (lat, lon) = (at.lat.to_string(), at.lon.to_string());
                self.endpoint_url(&["latlon", lat.as_str(), lon.as_str()])
            }
        }
    }

    fn forecast_url(&self, at: Coordinates) -> AppResult<Url> {
        let (lat, lon) = (at.lat.to_string(), at.lon.to_string());
        self.endpoint_url(&[FORECAST_SEGMENT, lat.as_str(), lon.as_str()])
    }

    /// Sends an authenticated GET and decodes a 2xx body
    ///
    /// Non-2xx statuses are forwarded. A 2xx body that does not decode is a
    /// bad gateway; only failures to reach the API or read the body are
    /// transport errors.
    async fn fetch<T: DeserializeOwned>(&self, url: Url) -> AppResult<T> {
        let response = self
            .http_client
            .get(url.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .header(API_HOST_HEADER, &self.api_host)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                path = %url.path(),
                status = status.as_u16(),
                body = %body,
                "Weather API returned an error"
            );
            return Err(AppError::Upstream {
                status,
                message: upstream_message(status, &body),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| {
            tracing::error!(path = %url.path(), error = %e, "Weather API payload did not decode");
            malformed(e)
        })
    }
}

/// Bad-gateway error for a 2xx body that cannot be used
fn malformed(detail: impl std::fmt::Display) -> AppError {
    AppError::Upstream {
        status: StatusCode::BAD_GATEWAY,
        message: format!("Malformed weather payload: {}", detail),
    }
}

#[async_trait::async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, location: &Location) -> AppResult<WeatherObservation> {
        let url = self.current_weather_url(location)?;

        tracing::info!(location = %location, "Requesting current weather");

        let raw: ApiCurrentWeather = self.fetch(url).await?;
        let observation = raw
            .into_observation()
            .map_err(|field| malformed(format!("missing {}", field)))?;

        tracing::info!(
            city = %observation.city,
            country = %observation.country,
            temperature = observation.temperature_kelvin,
            provider = "open_weather",
            "Current weather fetched"
        );

        Ok(observation)
    }

    async fn forecast(&self, coordinates: Coordinates) -> AppResult<WeatherForecast> {
        let url = self.forecast_url(coordinates)?;

        tracing::info!(coordinates = %coordinates, "Requesting forecast");

        let raw: ApiForecast = self.fetch(url).await?;
        let forecast = raw
            .into_forecast()
            .map_err(|field| malformed(format!("missing {}", field)))?;

        tracing::info!(
            city = %forecast.city,
            days = forecast.forecast.len(),
            provider = "open_weather",
            "Forecast fetched"
        );

        Ok(forecast)
    }

    fn name(&self) -> &'static str {
        "open_weather"
    }
}

/// Picks the upstream `message` field when the body is JSON, else the status text
fn upstream_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            format!(
                "{} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Upstream error")
            )
        })
}
