//! zipcast library
//!
//! Fetches weather forecasts for an address: geolocation, a postal-code keyed
//! read-through cache, a pooled and retrying provider client, and
//! normalization into plain value objects.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod forecast;
pub mod geo;
pub mod pool;
pub mod render;

pub use cache::{CacheManager, CacheStore, ForecastCache, MemoryStore};
pub use config::ForecastConfig;
pub use data::{ForecastResponse, GeoResult};
pub use forecast::{Advisory, ForecastOutcome, Forecaster, DEFAULT_FORECAST_DAYS};
pub use geo::{GeoResolver, OpenMeteoGeocoder};
pub use pool::{ClientPool, PoolSettings, TransportError};
