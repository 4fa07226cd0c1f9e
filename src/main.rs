//! zipcast - Weather forecast for an address
//!
//! Resolves the address, then prints the provider's multi-day forecast.
//! Forecasts are cached by postal code for 30 minutes.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use zipcast::cli::{CacheMode, Cli, LookupRequest};
use zipcast::render::render_text;
use zipcast::{
    CacheManager, CacheStore, ClientPool, ForecastCache, ForecastConfig, ForecastOutcome,
    Forecaster, MemoryStore, OpenMeteoGeocoder,
};

/// Logs go to stderr so stdout only carries the forecast
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("zipcast=warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn cache_store(mode: CacheMode) -> Arc<dyn CacheStore> {
    match mode {
        CacheMode::Disk => match CacheManager::new() {
            Some(manager) => Arc::new(manager),
            None => {
                tracing::warn!("No cache directory available; caching in memory");
                Arc::new(MemoryStore::new())
            }
        },
        CacheMode::Memory => Arc::new(MemoryStore::new()),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    let request = match LookupRequest::from_cli(&cli) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(ExitCode::from(2));
        }
    };

    let mut config = ForecastConfig::load()?;
    if let Some(pool_size) = request.pool_size {
        config.pool_size = pool_size;
        config.validate()?;
    }

    let pool = Arc::new(ClientPool::new(
        config.base_url.as_str(),
        config.api_key.as_str(),
        &config.pool_settings(),
    )?);
    let geocoder = Arc::new(OpenMeteoGeocoder::with_base_url(config.geocoding_url.as_str())?);
    let forecaster = Forecaster::new(pool, ForecastCache::new(cache_store(request.cache)), geocoder);

    match forecaster.lookup(&request.address, request.days).await {
        ForecastOutcome::Found { forecast, advisory } => {
            if let Some(advisory) = advisory {
                eprintln!("{}", advisory);
            }
            if request.json {
                println!("{}", serde_json::to_string_pretty(&forecast)?);
            } else {
                println!("{}", render_text(&forecast));
            }
            Ok(ExitCode::SUCCESS)
        }
        ForecastOutcome::AddressNotFound => {
            eprintln!("Address not found.");
            Ok(ExitCode::FAILURE)
        }
        ForecastOutcome::Unavailable => {
            eprintln!("Unable to fetch weather forecast. Please try again later.");
            Ok(ExitCode::FAILURE)
        }
    }
}
