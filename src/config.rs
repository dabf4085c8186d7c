use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// RapidAPI key for the weather provider
    #[serde(default)]
    pub rapidapi_key: Option<String>,

    /// PostgreSQL connection URL for the clothing store
    #[serde(default)]
    pub database_url: Option<String>,

    /// Redis connection URL; weather caching is disabled when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Weather API base URL
    #[serde(default = "default_weather_api_url")]
    pub weather_api_url: String,

    /// Value sent in the `x-rapidapi-host` header
    #[serde(default = "default_weather_api_host")]
    pub weather_api_host: String,

    /// Seconds a cached weather observation stays valid
    #[serde(default = "default_weather_cache_ttl")]
    pub weather_cache_ttl: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_weather_api_url() -> String {
    "https://open-weather13.p.rapidapi.com".to_string()
}

fn default_weather_api_host() -> String {
    "open-weather13.p.rapidapi.com".to_string()
}

fn default_weather_cache_ttl() -> u64 {
    600
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Secrets the service cannot run without
#[derive(Debug, Clone)]
pub struct Secrets {
    pub rapidapi_key: String,
    pub database_url: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Names of required variables that are unset or blank
    pub fn missing_secrets(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.rapidapi_key) {
            missing.push("RAPIDAPI_KEY");
        }
        if is_blank(&self.database_url) {
            missing.push("DATABASE_URL");
        }
        missing
    }

    /// Returns the required secrets, or `None` if any is missing
    pub fn secrets(&self) -> Option<Secrets> {
        if !self.missing_secrets().is_empty() {
            return None;
        }
        Some(Secrets {
            rapidapi_key: self.rapidapi_key.clone()?,
            database_url: self.database_url.clone()?,
        })
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}
