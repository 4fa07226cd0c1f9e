//! Address geolocation
//!
//! `GeoResolver` is the seam between the forecast pipeline and whatever turns
//! a free-text address into coordinates and a postal code. Not finding an
//! address is `Ok(None)`, never an error.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::data::{Coordinates, GeoResult};

/// Base URL for the Open-Meteo geocoding API
pub const OPEN_METEO_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1";

/// Errors that can occur when talking to a geocoder
#[derive(Debug, Error)]
pub enum GeoError {
    /// HTTP request failed
    #[error("Geocoding request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The geocoder answered with a non-success status
    #[error("Geocoder returned status {0}")]
    Status(u16),
}

/// Resolves free-text addresses
#[async_trait]
pub trait GeoResolver: Send + Sync {
    /// Resolves an address to coordinates and, when known, a postal code
    ///
    /// Returns `Ok(None)` for blank input or when nothing matches.
    async fn resolve(&self, address: &str) -> Result<Option<GeoResult>, GeoError>;
}

/// Geocoding response from Open-Meteo
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    postcodes: Vec<String>,
}

impl From<GeocodingResult> for GeoResult {
    fn from(result: GeocodingResult) -> Self {
        GeoResult::new(
            Coordinates::new(result.latitude, result.longitude),
            result.postcodes.into_iter().find(|code| !code.trim().is_empty()),
        )
    }
}

/// Geocoder backed by the Open-Meteo search API (no API key required)
///
/// The API matches place names, so "San Francisco" resolves while a street
/// address such as "1 Market St, San Francisco" finds nothing.
#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    client: Client,
    base_url: String,
}

impl OpenMeteoGeocoder {
    pub fn new() -> Result<Self, GeoError> {
        Self::with_base_url(OPEN_METEO_GEOCODING_URL)
    }

    /// Creates a geocoder against a custom base URL (used by tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, GeoError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            base_url: Into::<String>::into(base_url).trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl GeoResolver for OpenMeteoGeocoder {
    #[tracing::instrument(name = "geocode", level = "debug", skip(self))]
    async fn resolve(&self, address: &str) -> Result<Option<GeoResult>, GeoError> {
        let address = address.trim();
        if address.is_empty() {
            return Ok(None);
        }

        let url = format!(
            "{}/search?name={}&count=1&language=en&format=json",
            self.base_url,
            urlencoding::encode(address)
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(GeoError::Status(response.status().as_u16()));
        }

        let body: GeocodingResponse = response.json().await?;
        let result = body
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(GeoResult::from);

        tracing::debug!(found = result.is_some(), "Geocoding finished");
        Ok(result)
    }
}
