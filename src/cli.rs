//! Command-line interface parsing for zipcast
//!
//! This module handles parsing of CLI arguments using clap and turns them
//! into a validated `LookupRequest`.

use clap::{Parser, ValueEnum};
use thiserror::Error;

use crate::forecast::DEFAULT_FORECAST_DAYS;

/// Error types for CLI argument parsing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    /// The address is empty once trimmed
    #[error("Please enter a valid address.")]
    BlankAddress,
}

/// Where forecast responses are cached
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheMode {
    /// JSON files in the user cache directory, shared between runs
    Disk,
    /// Process memory only; nothing persists between runs
    Memory,
}

/// zipcast - Weather forecasts for an address, cached by postal code
#[derive(Parser, Debug)]
#[command(name = "zipcast")]
#[command(about = "Weather forecast for an address, cached by postal code")]
#[command(version)]
pub struct Cli {
    /// Place to look up, e.g. "San Francisco"
    ///
    /// Multiple words are joined with spaces, so quoting is optional.
    ///
    /// Place names are searched; street addresses do not resolve.
    #[arg(required = true, value_name = "ADDRESS")]
    pub address: Vec<String>,

    /// Number of forecast days to request (today included)
    #[arg(long, short, default_value_t = DEFAULT_FORECAST_DAYS,
          value_parser = clap::value_parser!(u32).range(1..=14))]
    pub days: u32,

    /// Cache backend
    #[arg(long, value_enum, default_value_t = CacheMode::Disk)]
    pub cache: CacheMode,

    /// Number of pooled provider connections (overrides WEATHER_API_POOL_SIZE)
    #[arg(long, value_name = "N")]
    pub pool_size: Option<usize>,

    /// Print the forecast as JSON
    #[arg(long)]
    pub json: bool,
}

/// A validated lookup derived from CLI arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    /// Trimmed address text
    pub address: String,
    pub days: u32,
    pub cache: CacheMode,
    pub pool_size: Option<usize>,
    pub json: bool,
}

impl LookupRequest {
    /// Creates a LookupRequest from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(LookupRequest)` with the address words joined and trimmed
    /// * `Err(CliError::BlankAddress)` if nothing but whitespace was given
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let address = cli
            .address
            .iter()
            .map(|word| word.trim())
            .filter(|word| !word.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if address.is_empty() {
            return Err(CliError::BlankAddress);
        }

        Ok(LookupRequest {
            address,
            days: cli.days,
            cache: cli.cache,
            pool_size: cli.pool_size,
            json: cli.json,
        })
    }
}
