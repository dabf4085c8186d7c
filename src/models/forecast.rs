use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::weather::{ApiCondition, ApiMain, TemperatureCategory};

/// Number of days returned by the forecast endpoint
pub const FORECAST_DAYS: usize = 5;

/// Name used when the forecast payload carries no city
const UNKNOWN_CITY: &str = "Unknown";

/// Multi-day forecast for a coordinate pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherForecast {
    pub city: String,
    pub country: String,
    pub forecast: Vec<DailyForecast>,
}

/// One calendar day of the forecast
///
/// `temperature`, `description` and `icon` come from the first 3-hour slot of
/// the day; min/max and precipitation probability span the whole day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyForecast {
    pub date: NaiveDate,
    /// Temperature in Kelvin
    #[serde(rename = "temperature")]
    pub temperature_kelvin: f64,
    #[serde(rename = "temperature_min")]
    pub temperature_min_kelvin: f64,
    #[serde(rename = "temperature_max")]
    pub temperature_max_kelvin: f64,
    pub humidity: Option<f64>,
    pub description: String,
    pub icon: String,
    /// Probability of precipitation, 0.0 to 1.0
    pub pop: f64,
    pub temperature_category: TemperatureCategory,
}

impl DailyForecast {
    fn absorb(&mut self, slot: &ForecastSlot) {
        self.temperature_min_kelvin = self.temperature_min_kelvin.min(slot.temperature_min);
        self.temperature_max_kelvin = self.temperature_max_kelvin.max(slot.temperature_max);
        self.pop = self.pop.max(slot.pop);
    }
}

// ============================================================================
// open-weather13 (RapidAPI) Types
// ============================================================================

/// Raw 5-day / 3-hour forecast response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiForecast {
    pub city: Option<ApiForecastCity>,
    pub list: Option<Vec<ApiForecastEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiForecastCity {
    pub name: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiForecastEntry {
    /// `YYYY-MM-DD hh:mm:ss`, UTC
    pub dt_txt: Option<String>,
    pub main: Option<ApiMain>,
    #[serde(default)]
    pub weather: Vec<ApiCondition>,
    pub pop: Option<f64>,
}

/// A forecast entry with every field needed for grouping
struct ForecastSlot {
    date: NaiveDate,
    temperature: f64,
    temperature_min: f64,
    temperature_max: f64,
    humidity: Option<f64>,
    description: String,
    icon: String,
    pop: f64,
}

impl ApiForecastEntry {
    /// Incomplete entries yield `None` and are left out of the grouping
    fn into_slot(self) -> Option<ForecastSlot> {
        let date = self
            .dt_txt
            .as_deref()
            .and_then(|t| t.split_whitespace().next())
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())?;
        let main = self.main?;
        let temperature = main.temp?;
        let condition = self.weather.into_iter().next()?;

        Some(ForecastSlot {
            date,
            temperature,
            temperature_min: main.temp_min.unwrap_or(temperature),
            temperature_max: main.temp_max.unwrap_or(temperature),
            humidity: main.humidity,
            description: condition.description?,
            icon: condition.icon?,
            pop: self.pop.unwrap_or(0.0),
        })
    }
}

impl ApiForecast {
    /// Groups the 3-hour entries by day, earliest first, keeping at most
    /// `FORECAST_DAYS` days. Names the missing part when nothing is usable.
    pub fn into_forecast(self) -> Result<WeatherForecast, &'static str> {
        let entries = self.list.filter(|l| !l.is_empty()).ok_or("list")?;

        let mut days: BTreeMap<NaiveDate, DailyForecast> = BTreeMap::new();
        for slot in entries.into_iter().filter_map(ApiForecastEntry::into_slot) {
            match days.get_mut(&slot.date) {
                Some(day) => day.absorb(&slot),
                None => {
                    let day = DailyForecast {
                        date: slot.date,
                        temperature_kelvin: slot.temperature,
                        temperature_min_kelvin: slot.temperature_min,
                        temperature_max_kelvin: slot.temperature_max,
                        humidity: slot.humidity,
                        description: slot.description,
                        icon: slot.icon,
                        pop: slot.pop,
                        temperature_category: TemperatureCategory::from_kelvin(slot.temperature),
                    };
                    days.insert(day.date, day);
                }
            }
        }

        if days.is_empty() {
            return Err("list[].main.temp");
        }

        let (city, country) = match self.city {
            Some(c) => (c.name, c.country),
            None => (None, None),
        };

        Ok(WeatherForecast {
            city: city.unwrap_or_else(|| UNKNOWN_CITY.to_string()),
            country: country.unwrap_or_default(),
            forecast: days.into_values().take(FORECAST_DAYS).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn entry(dt_txt: &str, temp: f64, pop: f64, description: &str) -> Value {
        json!({
            "dt_txt": dt_txt,
            "main": { "temp": temp, "temp_min": temp - 1.0, "temp_max": temp + 1.0, "humidity": 60 },
            "weather": [{ "description": description, "icon": "10d" }],
            "pop": pop
        })
    }

    fn parse(value: Value) -> ApiForecast {
        serde_json::from_value(value).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_groups_entries_by_day() {
        let raw = parse(json!({
            "city": { "name": "London", "country": "GB" },
            "list": [
                entry("2025-03-01 09:00:00", 280.0, 0.1, "light rain"),
                entry("2025-03-01 12:00:00", 285.0, 0.6, "clear sky"),
                entry("2025-03-01 15:00:00", 279.0, 0.2, "clouds"),
                entry("2025-03-02 00:00:00", 290.0, 0.0, "clear sky")
            ]
        }));

        let forecast = raw.into_forecast().unwrap();
        assert_eq!(forecast.city, "London");
        assert_eq!(forecast.country, "GB");
        assert_eq!(forecast.forecast.len(), 2);

        let first = &forecast.forecast[0];
        assert_eq!(first.date, date("2025-03-01"));
        assert_eq!(first.temperature_kelvin, 280.0);
        assert_eq!(first.description, "light rain");
        assert_eq!(first.temperature_min_kelvin, 278.0);
        assert_eq!(first.temperature_max_kelvin, 286.0);
        assert_eq!(first.pop, 0.6);
        assert_eq!(first.temperature_category, TemperatureCategory::Cold);

        assert_eq!(forecast.forecast[1].temperature_category, TemperatureCategory::Mild);
    }

    #[test]
    fn test_days_sorted_and_capped() {
        let shuffled = [
            "2025-03-07",
            "2025-03-02",
            "2025-03-05",
            "2025-03-01",
            "2025-03-06",
            "2025-03-03",
        ];
        let list: Vec<Value> = shuffled
            .iter()
            .map(|d| entry(&format!("{} 12:00:00", d), 285.0, 0.0, "clear sky"))
            .collect();

        let forecast = parse(json!({ "list": list })).into_forecast().unwrap();
        let dates: Vec<NaiveDate> = forecast.forecast.iter().map(|d| d.date).collect();
        assert_eq!(
            dates,
            vec![
                date("2025-03-01"),
                date("2025-03-02"),
                date("2025-03-03"),
                date("2025-03-05"),
                date("2025-03-06"),
            ]
        );
        assert_eq!(forecast.city, "Unknown");
        assert_eq!(forecast.country, "");
    }

    #[test]
    fn test_incomplete_entries_are_skipped() {
        let raw = parse(json!({
            "list": [
                { "dt_txt": "2025-03-01 09:00:00", "main": {}, "weather": [] },
                { "main": { "temp": 280.0 }, "weather": [{ "description": "x", "icon": "01d" }] },
                entry("2025-03-02 09:00:00", 281.0, 0.3, "mist")
            ]
        }));

        let forecast = raw.into_forecast().unwrap();
        assert_eq!(forecast.forecast.len(), 1);
        assert_eq!(forecast.forecast[0].date, date("2025-03-02"));
    }

    #[test]
    fn test_missing_or_empty_list_is_rejected() {
        assert_eq!(parse(json!({})).into_forecast().unwrap_err(), "list");
        assert_eq!(parse(json!({ "list": [] })).into_forecast().unwrap_err(), "list");
        assert_eq!(
            parse(json!({ "list": [{ "dt_txt": "2025-03-01 09:00:00" }] }))
                .into_forecast()
                .unwrap_err(),
            "list[].main.temp"
        );
    }

    #[test]
    fn test_forecast_wire_format() {
        let raw = parse(json!({ "list": [entry("2025-03-01 09:00:00", 290.0, 0.25, "clear sky")] }));
        let value = serde_json::to_value(raw.into_forecast().unwrap()).unwrap();

        let day = &value["forecast"][0];
        assert_eq!(day["date"], json!("2025-03-01"));
        assert_eq!(day["temperature"], json!(290.0));
        assert_eq!(day["temperature_min"], json!(289.0));
        assert_eq!(day["temperature_max"], json!(291.0));
        assert_eq!(day["temperature_category"], json!("mild"));
    }
}
