use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Offset between the Kelvin and Celsius scales
pub const KELVIN_OFFSET: f64 = 273.15;

/// Lower bound (Celsius, inclusive) of the mild bucket
const MILD_FROM_CELSIUS: f64 = 10.0;

/// Lower bound (Celsius, inclusive) of the hot bucket
const HOT_FROM_CELSIUS: f64 = 20.0;

/// Current conditions for a city, as returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherObservation {
    pub city: String,
    pub country: String,
    /// Temperature in Kelvin
    #[serde(rename = "temperature")]
    pub temperature_kelvin: f64,
    pub description: String,
    pub icon: String,
}

impl WeatherObservation {
    pub fn temperature_celsius(&self) -> f64 {
        kelvin_to_celsius(self.temperature_kelvin)
    }

    pub fn temperature_category(&self) -> TemperatureCategory {
        TemperatureCategory::from_kelvin(self.temperature_kelvin)
    }
}

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

/// A validated latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Returns `None` unless `lat` is in `[-90, 90]` and `lon` in `[-180, 180]`
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        let valid = (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon);
        valid.then_some(Self { lat, lon })
    }
}

impl Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// Where current weather is looked up
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    City { name: String, country: String },
    Coordinates(Coordinates),
}

impl Location {
    pub fn city(name: impl Into<String>, country: impl Into<String>) -> Self {
        Location::City {
            name: name.into(),
            country: country.into(),
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::City { name, country } => write!(f, "{},{}", name, country),
            Location::Coordinates(coordinates) => write!(f, "{}", coordinates),
        }
    }
}

/// Coarse temperature bucket used to tag clothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureCategory {
    Cold,
    Mild,
    Hot,
}

impl TemperatureCategory {
    /// Buckets a Celsius temperature into closed-open intervals:
    /// `(-inf, 10)` cold, `[10, 20)` mild, `[20, +inf)` hot.
    pub fn from_celsius(celsius: f64) -> Self {
        if celsius < MILD_FROM_CELSIUS {
            TemperatureCategory::Cold
        } else if celsius < HOT_FROM_CELSIUS {
            TemperatureCategory::Mild
        } else {
            TemperatureCategory::Hot
        }
    }

    pub fn from_kelvin(kelvin: f64) -> Self {
        Self::from_celsius(kelvin_to_celsius(kelvin))
    }

    /// The literal stored in `weather_conditions`
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureCategory::Cold => "cold",
            TemperatureCategory::Mild => "mild",
            TemperatureCategory::Hot => "hot",
        }
    }
}

impl Display for TemperatureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// open-weather13 (RapidAPI) Types
// ============================================================================

/// Raw current-weather response from the weather API
///
/// Every field is optional so that a short payload is reported by name
/// instead of failing the decode.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiCurrentWeather {
    pub name: Option<String>,
    pub sys: Option<ApiSys>,
    pub main: Option<ApiMain>,
    #[serde(default)]
    pub weather: Vec<ApiCondition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSys {
    pub country: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiMain {
    pub temp: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCondition {
    pub description: Option<String>,
    pub icon: Option<String>,
}

impl ApiCurrentWeather {
    /// Shapes the raw payload, or names the first missing field
    pub fn into_observation(self) -> Result<WeatherObservation, &'static str> {
        let city = self.name.ok_or("name")?;
        let country = self.sys.and_then(|s| s.country).ok_or("sys.country")?;
        let temperature_kelvin = self.main.and_then(|m| m.temp).ok_or("main.temp")?;
        let condition = self.weather.into_iter().next().ok_or("weather[0]")?;
        let description = condition.description.ok_or("weather[0].description")?;
        let icon = condition.icon.ok_or("weather[0].icon")?;

        Ok(WeatherObservation {
            city,
            country,
            temperature_kelvin,
            description,
            icon,
        })
    }
}
