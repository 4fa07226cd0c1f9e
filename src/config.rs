//! Configuration for the weather provider and geocoder
//!
//! Settings come from the environment, after loading a `.env` file if one is
//! present. The provider API key is an owner-supplied secret: the placeholder
//! fallback is only ever paired with the default provider URL.

use std::env;
use thiserror::Error;

use crate::geo::OPEN_METEO_GEOCODING_URL;
use crate::pool::PoolSettings;

/// Default weather provider base URL
pub const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com/v1";

/// Placeholder key used when none is configured for the default provider
///
/// Requests made with it are rejected by the provider; set `WEATHER_API_KEY`.
pub const FALLBACK_API_KEY: &str = "replace-with-your-weatherapi-key";

/// Default number of pooled provider clients
pub const DEFAULT_POOL_SIZE: usize = 10;

const MAX_POOL_SIZE: usize = 100;

/// Errors that can occur when loading configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable holds a value that cannot be parsed
    #[error("Invalid value '{value}' for {name}")]
    InvalidValue { name: &'static str, value: String },

    /// A setting is out of its allowed range or format
    #[error("Configuration error: {0}")]
    Invalid(String),

    /// A custom provider URL was configured without an API key
    #[error("WEATHER_API_KEY must be set when WEATHER_API_BASE_URL points to a custom provider")]
    MissingApiKey,
}

/// Provider and geocoder settings
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    /// Weather provider base URL
    pub base_url: String,
    /// Weather provider API key
    pub api_key: String,
    /// Number of pooled provider clients
    pub pool_size: usize,
    /// Geocoding API base URL
    pub geocoding_url: String,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: FALLBACK_API_KEY.to_string(),
            pool_size: DEFAULT_POOL_SIZE,
            geocoding_url: OPEN_METEO_GEOCODING_URL.to_string(),
        }
    }
}

impl ForecastConfig {
    /// Loads `.env` (if present) and then reads the process environment
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from a variable lookup function
    ///
    /// Recognized variables: `WEATHER_API_BASE_URL`, `WEATHER_API_KEY`
    /// (falling back to `OPENWEATHER_API_KEY`), `WEATHER_API_POOL_SIZE` and
    /// `GEOCODING_BASE_URL`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let base_url = var("WEATHER_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = base_url.trim().trim_end_matches('/').to_string();

        let api_key = match var("WEATHER_API_KEY").or_else(|| var("OPENWEATHER_API_KEY")) {
            Some(key) => key.trim().to_string(),
            None if base_url == DEFAULT_BASE_URL => {
                tracing::warn!("WEATHER_API_KEY is not set; using the placeholder key");
                FALLBACK_API_KEY.to_string()
            }
            None => return Err(ConfigError::MissingApiKey),
        };

        let pool_size = match var("WEATHER_API_POOL_SIZE") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "WEATHER_API_POOL_SIZE",
                value,
            })?,
            None => DEFAULT_POOL_SIZE,
        };

        let geocoding_url = var("GEOCODING_BASE_URL")
            .unwrap_or_else(|| OPEN_METEO_GEOCODING_URL.to_string());

        let config = Self {
            base_url,
            api_key,
            pool_size,
            geocoding_url,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, url) in [("weather", &self.base_url), ("geocoding", &self.geocoding_url)] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Invalid(format!(
                    "The {} API base URL must be an HTTP or HTTPS URL",
                    name
                )));
            }
        }

        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid("Weather API key cannot be empty".to_string()));
        }

        if self.pool_size == 0 || self.pool_size > MAX_POOL_SIZE {
            return Err(ConfigError::Invalid(format!(
                "Pool size must be between 1 and {}",
                MAX_POOL_SIZE
            )));
        }

        Ok(())
    }

    /// Pool settings with this configuration's size and the default policy
    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            pool_size: self.pool_size,
            ..PoolSettings::default()
        }
    }
}
