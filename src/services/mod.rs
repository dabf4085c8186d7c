pub mod providers;
pub mod recommendations;

pub use providers::{CachedWeatherProvider, OpenWeatherProvider, WeatherProvider};
