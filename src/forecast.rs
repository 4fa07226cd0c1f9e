//! Forecast orchestration
//!
//! `Forecaster` ties the pipeline together: it validates the geolocation
//! result, consults the postal-code cache, fetches from the provider through
//! the client pool on a miss, and normalizes the payload. Every failure is
//! logged here and collapses into "no forecast"; nothing propagates to the
//! presentation layer.

use std::fmt;
use std::sync::Arc;

use crate::cache::{cache_key, ForecastCache};
use crate::data::{self, ForecastResponse, GeoResult};
use crate::geo::GeoResolver;
use crate::pool::ClientPool;

/// Number of days requested when the caller does not say otherwise
pub const DEFAULT_FORECAST_DAYS: u32 = 6;

/// Provider endpoint for multi-day forecasts
const FORECAST_PATH: &str = "forecast.json";

/// Non-fatal notice attached to a successful lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    /// The address resolved without a postal code, so the cache was skipped
    NoPostalCode,
}

impl Advisory {
    pub fn message(&self) -> &'static str {
        match self {
            Advisory::NoPostalCode => {
                "Unable to determine a zip code for this address. Unable to use cache."
            }
        }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of looking up a forecast for an address
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastOutcome {
    /// A forecast was produced
    Found {
        forecast: ForecastResponse,
        advisory: Option<Advisory>,
    },
    /// The address could not be geolocated
    AddressNotFound,
    /// The provider could not deliver a usable forecast
    Unavailable,
}

/// Coordinates geolocation, caching, fetching and normalization
#[derive(Clone)]
pub struct Forecaster {
    pool: Arc<ClientPool>,
    cache: ForecastCache,
    resolver: Arc<dyn GeoResolver>,
}

impl Forecaster {
    pub fn new(pool: Arc<ClientPool>, cache: ForecastCache, resolver: Arc<dyn GeoResolver>) -> Self {
        Self {
            pool,
            cache,
            resolver,
        }
    }

    /// Resolves `address` and returns its forecast
    ///
    /// Blank addresses and addresses the resolver cannot place yield
    /// `AddressNotFound`. Resolver and provider failures yield `Unavailable`.
    #[tracing::instrument(name = "lookup_forecast", skip(self))]
    pub async fn lookup(&self, address: &str, days: u32) -> ForecastOutcome {
        let address = address.trim();
        if address.is_empty() {
            return ForecastOutcome::AddressNotFound;
        }

        let geo = match self.resolver.resolve(address).await {
            Ok(Some(geo)) => geo,
            Ok(None) => {
                tracing::info!("Address not found");
                return ForecastOutcome::AddressNotFound;
            }
            Err(e) => {
                tracing::error!(error = %e, "Geolocation failed");
                return ForecastOutcome::Unavailable;
            }
        };

        let advisory = if geo.usable_postal_code().is_none() {
            tracing::warn!("No postal code for address; forecast will not be cached");
            Some(Advisory::NoPostalCode)
        } else {
            None
        };

        match self.get_forecast(Some(&geo), days).await {
            Some(forecast) => ForecastOutcome::Found { forecast, advisory },
            None => ForecastOutcome::Unavailable,
        }
    }

    /// Fetches the forecast for a geolocation result
    ///
    /// # Arguments
    /// * `geo` - Geolocation result; `None` or missing coordinates yield `None`
    /// * `days` - Number of forecast days to request
    ///
    /// # Returns
    /// * `Some(ForecastResponse)` - Normalized forecast, flagged with whether it came from cache
    /// * `None` - Transport failure, provider rejection or malformed payload
    #[tracing::instrument(name = "get_forecast", skip(self, geo), fields(postal_code = tracing::field::Empty))]
    pub async fn get_forecast(&self, geo: Option<&GeoResult>, days: u32) -> Option<ForecastResponse> {
        let geo = geo?;
        let Some(coordinates) = geo.coordinates else {
            tracing::debug!("Cannot fetch a forecast without coordinates");
            return None;
        };

        let postal_code = geo.usable_postal_code();
        if let Some(code) = postal_code {
            tracing::Span::current().record("postal_code", code);
        }
        let key = postal_code.map(cache_key);

        let query = [("q", coordinates.to_query()), ("days", days.to_string())];
        let fetched = self
            .cache
            .fetch_or_populate(key.as_deref(), || self.pool.post(FORECAST_PATH, &query))
            .await;

        let (payload, cache_hit) = match fetched {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::error!(error = %e, "Weather API request failed");
                return None;
            }
        };

        if !payload.is_success() {
            tracing::warn!(status = payload.status, "Weather API rejected the forecast request");
            return None;
        }

        match data::parse(payload.body.as_bytes(), cache_hit) {
            Ok(forecast) => {
                tracing::debug!(cache_hit, days = forecast.forecast_days.len(), "Forecast ready");
                Some(forecast)
            }
            Err(e) => {
                tracing::error!(error = %e, "Weather API returned an unusable forecast");
                None
            }
        }
    }
}

impl fmt::Debug for Forecaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Forecaster")
            .field("pool", &self.pool)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
