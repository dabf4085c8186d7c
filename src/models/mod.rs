pub mod clothing;
pub mod forecast;
pub mod weather;

pub use clothing::{
    ClothingId, ClothingItem, ClothingPatch, ClothingRecord, ConditionFilter, NewClothingItem,
};
pub use forecast::{ApiForecast, DailyForecast, WeatherForecast};
pub use weather::{
    ApiCurrentWeather, Coordinates, Location, TemperatureCategory, WeatherObservation,
};
