use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{
        ClothingItem, Coordinates, Location, TemperatureCategory, WeatherForecast,
        WeatherObservation,
    },
    routes::AppState,
    services::recommendations,
};

/// Country used when the client sends none
pub const DEFAULT_COUNTRY: &str = "EN";

const MIN_CITY_CHARS: usize = 2;

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
    pub country: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WeatherResponse {
    pub weather: WeatherObservation,
    pub temperature_category: TemperatureCategory,
    pub clothing_recommendations: Vec<ClothingItem>,
}

/// A query string that does not deserialize is a validation failure
fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> AppResult<T> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

/// Handler for current weather plus clothing recommendations
///
/// A failing clothing store does not fail the request: the weather is still
/// returned, with no recommendations.
pub async fn get_weather(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> AppResult<Json<WeatherResponse>> {
    let location = resolve_location(&query_params(query)?)?;

    tracing::info!(
        request_id = %request_id,
        location = %location,
        provider = state.weather_provider.name(),
        "Processing weather request"
    );

    let weather = state.weather_provider.current_weather(&location).await?;
    let temperature_category = weather.temperature_category();

    let clothing_recommendations = match recommendations::resolve(
        state.clothing_store.as_ref(),
        &weather.description,
        weather.temperature_kelvin,
    )
    .await
    {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(
                request_id = %request_id,
                error = %e,
                "Clothing lookup failed, returning weather without recommendations"
            );
            Vec::new()
        }
    };

    tracing::info!(
        request_id = %request_id,
        category = %temperature_category,
        recommendations = clothing_recommendations.len(),
        "Weather request completed"
    );

    Ok(Json(WeatherResponse {
        weather,
        temperature_category,
        clothing_recommendations,
    }))
}

/// Handler for the day-by-day forecast around a coordinate pair
pub async fn get_forecast(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    query: Result<Query<ForecastQuery>, QueryRejection>,
) -> AppResult<Json<WeatherForecast>> {
    let params = query_params(query)?;
    let coordinates = match (non_blank(&params.lat), non_blank(&params.lon)) {
        (Some(lat), Some(lon)) => parse_coordinates(lat, lon)?,
        _ => {
            return Err(AppError::Validation(
                "Both latitude and longitude are required".to_string(),
            ))
        }
    };

    tracing::info!(
        request_id = %request_id,
        coordinates = %coordinates,
        provider = state.weather_provider.name(),
        "Processing forecast request"
    );

    let forecast = state.weather_provider.forecast(coordinates).await?;

    tracing::info!(
        request_id = %request_id,
        days = forecast.forecast.len(),
        "Forecast request completed"
    );

    Ok(Json(forecast))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Coordinates win when both are given; otherwise a city is required
pub fn resolve_location(params: &WeatherQuery) -> AppResult<Location> {
    if let (Some(lat), Some(lon)) = (non_blank(&params.lat), non_blank(&params.lon)) {
        return Ok(Location::Coordinates(parse_coordinates(lat, lon)?));
    }

    let city = non_blank(&params.city)
        .ok_or_else(|| AppError::Validation("City parameter is required".to_string()))?;
    let city = validate_city(city)?;
    let country = normalize_country(params.country.as_deref())?;

    Ok(Location::city(city, country))
}

/// Parses and range-checks a latitude/longitude pair
pub fn parse_coordinates(lat: &str, lon: &str) -> AppResult<Coordinates> {
    let invalid = || AppError::Validation("Invalid coordinates provided".to_string());

    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;

    Coordinates::new(lat, lon).ok_or_else(invalid)
}

/// City names are letters, spaces, hyphens, periods and apostrophes
pub fn validate_city(city: &str) -> AppResult<&str> {
    if city.chars().count() < MIN_CITY_CHARS {
        return Err(AppError::Validation(
            "City name must be at least 2 characters long".to_string(),
        ));
    }

    let allowed =
        |c: char| c.is_alphabetic() || c.is_whitespace() || matches!(c, '-' | '\'' | '.');
    if !city.chars().all(allowed) {
        return Err(AppError::Validation(
            "Invalid city name. Only letters, spaces, hyphens, periods, and apostrophes are allowed"
                .to_string(),
        ));
    }

    Ok(city)
}

/// Uppercases the country code and checks it has the alpha-2 shape
///
/// Missing or blank input falls back to `DEFAULT_COUNTRY`.
pub fn normalize_country(country: Option<&str>) -> AppResult<String> {
    let country = match country.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) => c.to_ascii_uppercase(),
        None => return Ok(DEFAULT_COUNTRY.to_string()),
    };

    if country.len() == 2 && country.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(country)
    } else {
        Err(AppError::Validation(
            "Invalid country code. Please use ISO 3166-1 alpha-2 format (e.g., US, GB, DE)"
                .to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(city: Option<&str>, lat: Option<&str>, lon: Option<&str>) -> WeatherQuery {
        WeatherQuery {
            city: city.map(str::to_string),
            country: None,
            lat: lat.map(str::to_string),
            lon: lon.map(str::to_string),
        }
    }

    fn validation_message<T: std::fmt::Debug>(result: AppResult<T>) -> String {
        match result {
            Err(AppError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_country_defaults() {
        assert_eq!(normalize_country(None).unwrap(), "EN");
        assert_eq!(normalize_country(Some("  ")).unwrap(), "EN");
    }

    #[test]
    fn test_normalize_country_uppercases() {
        assert_eq!(normalize_country(Some(" gb ")).unwrap(), "GB");
    }

    #[test]
    fn test_normalize_country_rejects_bad_shapes() {
        for bad in ["USA", "U", "1A", "é1", "G B"] {
            assert!(
                matches!(normalize_country(Some(bad)), Err(AppError::Validation(_))),
                "{} accepted",
                bad
            );
        }
    }

    #[test]
    fn test_validate_city_accepts_names() {
        for good in ["London", "New York", "St. John's", "Winston-Salem", "São Paulo", "Ōsaka"] {
            assert_eq!(validate_city(good).unwrap(), good);
        }
    }

    #[test]
    fn test_validate_city_rejects_short_and_odd_names() {
        assert_eq!(
            validation_message(validate_city("X")),
            "City name must be at least 2 characters long"
        );
        for bad in ["London1", "a/b", "Paris;DROP", "<script>"] {
            assert!(
                validation_message(validate_city(bad)).starts_with("Invalid city name"),
                "{} accepted",
                bad
            );
        }
    }

    #[test]
    fn test_parse_coordinates_ranges() {
        let at = parse_coordinates("51.5085", " -0.1257 ").unwrap();
        assert_eq!(at.lat, 51.5085);
        assert_eq!(at.lon, -0.1257);

        for (lat, lon) in [("91", "0"), ("0", "-181"), ("NaN", "0"), ("north", "0"), ("0", "")] {
            assert_eq!(
                validation_message(parse_coordinates(lat, lon)),
                "Invalid coordinates provided",
                "{},{} accepted",
                lat,
                lon
            );
        }
    }

    #[test]
    fn test_resolve_location_prefers_coordinates() {
        let location = resolve_location(&query(Some("London"), Some("10"), Some("20"))).unwrap();
        assert_eq!(location, Location::Coordinates(Coordinates::new(10.0, 20.0).unwrap()));

        let location = resolve_location(&query(Some("London"), Some("10"), None)).unwrap();
        assert_eq!(location, Location::city("London", "EN"));
    }

    #[test]
    fn test_resolve_location_requires_city_without_coordinates() {
        assert_eq!(
            validation_message(resolve_location(&query(None, None, Some("20")))),
            "City parameter is required"
        );
        assert_eq!(
            validation_message(resolve_location(&query(Some("  "), Some(" "), Some(" ")))),
            "City parameter is required"
        );
    }
}
