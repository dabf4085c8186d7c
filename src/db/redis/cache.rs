use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::AppError;
use crate::error::AppResult;
use crate::models::{Coordinates, Location};

/// Coordinates are rounded to four decimals (about 11m) in keys
#[derive(Debug, Clone, PartialEq)]
pub enum CacheKey {
    CurrentWeather { city: String, country: String },
    CurrentWeatherAt(Coordinates),
    Forecast(Coordinates),
}

impl CacheKey {
    pub fn for_location(location: &Location) -> Self {
        match location {
            Location::City { name, country } => CacheKey::CurrentWeather {
                city: name.clone(),
                country: country.clone(),
            },
            Location::Coordinates(at) => CacheKey::CurrentWeatherAt(*at),
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::CurrentWeather { city, country } => write!(
                f,
                "weather:{}:{}",
                city.trim().to_lowercase(),
                country.trim().to_lowercase()
            ),
            CacheKey::CurrentWeatherAt(at) => {
                write!(f, "weather:latlon:{:.4}:{:.4}", at.lat, at.lon)
            }
            CacheKey::Forecast(at) => write!(f, "forecast:{:.4}:{:.4}", at.lat, at.lon),
        }
    }
}

/// Creates a Redis client for caching
///
/// Connections are multiplexed and opened on demand.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Cache handler for storing and retrieving data from Redis
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
}

/// Handle for gracefully shutting down the cache writer
///
/// Dropping the handle without calling `shutdown` also stops the writer.
pub struct CacheWriterHandle {
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl CacheWriterHandle {
    /// Signals the writer task and waits until pending writes are flushed
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task panicked");
        }
        tracing::info!("Cache writer stopped");
    }
}

impl Cache {
    /// Creates a new Cache instance with a background write task
    ///
    /// Writes are queued on a channel so cache stores never delay a response.
    pub fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let client = redis_client.clone();
        let task = tokio::spawn(async move {
            Self::cache_writer_task(client, write_rx, shutdown_rx).await;
        });

        let cache = Self {
            redis_client,
            write_tx,
        };

        (cache, CacheWriterHandle { shutdown_tx, task })
    }

    /// Background task that processes cache write messages
    ///
    /// On shutdown, drains whatever is already queued and exits. Senders held
    /// by live `Cache` clones do not keep the task alive past shutdown.
    async fn cache_writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) {
        tracing::info!("Cache writer task started");

        loop {
            tokio::select! {
                msg = write_rx.recv() => match msg {
                    Some(msg) => {
                        if let Err(e) = Self::write_to_redis(&client, msg).await {
                            tracing::error!(error = %e, "Failed to write to Redis cache");
                        }
                    }
                    None => break,
                },
                _ = &mut shutdown_rx => {
                    let mut flushed = 0usize;
                    while let Ok(msg) = write_rx.try_recv() {
                        if let Err(e) = Self::write_to_redis(&client, msg).await {
                            tracing::error!(error = %e, "Failed to flush cache write during shutdown");
                        } else {
                            flushed += 1;
                        }
                    }
                    tracing::info!(flushed, "Cache writer flushed pending writes");
                    break;
                }
            }
        }
    }

    /// Writes a single message to Redis
    async fn write_to_redis(client: &Client, msg: CacheWriteMessage) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(msg.key, msg.value, msg.ttl).await?;
        Ok(())
    }

    /// Retrieves a value from the cache by key
    ///
    /// Returns `None` when the key is absent.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Queues a value for storage without waiting for Redis
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            key: key.to_string(),
            value: json,
            ttl,
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to send cache write message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather_key(city: &str, country: &str) -> CacheKey {
        CacheKey::CurrentWeather {
            city: city.to_string(),
            country: country.to_string(),
        }
    }

    fn test_client() -> Client {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        create_redis_client(&redis_url).unwrap()
    }

    #[test]
    fn test_cache_key_display_current_weather() {
        assert_eq!(weather_key("London", "GB").to_string(), "weather:london:gb");
    }

    #[test]
    fn test_cache_key_normalizes_whitespace_and_case() {
        assert_eq!(
            weather_key("LONDON", "gb").to_string(),
            weather_key("london", "GB").to_string()
        );
        assert_eq!(weather_key("  New York ", "US").to_string(), "weather:new york:us");
    }

    #[test]
    fn test_cache_key_display_coordinates() {
        let at = Coordinates::new(51.50853, -0.12574).unwrap();
        assert_eq!(
            CacheKey::CurrentWeatherAt(at).to_string(),
            "weather:latlon:51.5085:-0.1257"
        );
        assert_eq!(CacheKey::Forecast(at).to_string(), "forecast:51.5085:-0.1257");
        assert_eq!(
            CacheKey::for_location(&Location::Coordinates(at)),
            CacheKey::CurrentWeatherAt(at)
        );
        assert_eq!(
            CacheKey::for_location(&Location::city("Paris", "FR")).to_string(),
            "weather:paris:fr"
        );
    }

    #[test]
    fn test_create_redis_client_rejects_bad_url() {
        assert!(create_redis_client("not a url").is_err());
    }

    #[tokio::test]
    #[ignore = "requires a running Redis"]
    async fn test_cache_miss() {
        let (cache, _handle) = Cache::new(test_client());

        let key = weather_key("nonexistent_city_12345", "ZZ");
        let retrieved: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();

        assert_eq!(retrieved, None);
    }

    #[tokio::test]
    #[ignore = "requires a running Redis"]
    async fn test_cache_writer_flushes_on_shutdown() {
        let client = test_client();
        let (cache, handle) = Cache::new(client.clone());

        let key = weather_key("test_shutdown", "ZZ");
        let value = vec!["shutdown_test".to_string()];

        cache.set_in_background(&key, &value, 60);
        handle.shutdown().await;

        let retrieved: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, Some(value));

        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.del(key.to_string()).await.unwrap();
    }
}
