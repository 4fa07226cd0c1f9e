//! Core data models for zipcast
//!
//! This module contains the value objects produced for a forecast request:
//! geolocation results, provider conditions, locations and forecast days.
//! Everything here is built once per request and never mutated afterwards.

pub mod normalize;

pub use normalize::{parse, NormalizeError};

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair returned by geolocation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Renders the coordinates in the `<lat>,<lng>` form the provider expects
    pub fn to_query(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// Result of resolving a free-text address
///
/// Both parts may be missing. Without coordinates no forecast can be fetched;
/// without a postal code the forecast is fetched but never cached.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoResult {
    pub coordinates: Option<Coordinates>,
    pub postal_code: Option<String>,
}

impl GeoResult {
    pub fn new(coordinates: Coordinates, postal_code: Option<String>) -> Self {
        Self {
            coordinates: Some(coordinates),
            postal_code,
        }
    }

    /// The postal code, if present and not blank
    pub fn usable_postal_code(&self) -> Option<&str> {
        self.postal_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }
}

/// Weather condition as described by the provider
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Condition {
    /// Human-readable description, e.g. "Partly cloudy"
    pub text: Option<String>,
    /// Icon URL or path
    pub icon: Option<String>,
    /// Provider-defined condition code
    pub code: Option<i64>,
}

/// Daily envelope for a single calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// ISO date (YYYY-MM-DD)
    pub date: Option<String>,
    pub maxtemp_c: Option<f64>,
    pub maxtemp_f: Option<f64>,
    pub mintemp_c: Option<f64>,
    pub mintemp_f: Option<f64>,
    pub condition: Option<Condition>,
}

impl ForecastDay {
    pub fn condition_text(&self) -> Option<&str> {
        self.condition.as_ref()?.text.as_deref()
    }

    pub fn condition_icon(&self) -> Option<&str> {
        self.condition.as_ref()?.icon.as_deref()
    }

    pub fn condition_code(&self) -> Option<i64> {
        self.condition.as_ref()?.code
    }
}

/// Instant reading, enriched with today's daily envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Current {
    pub temp_c: f64,
    pub temp_f: f64,
    pub condition: Condition,
    /// Today's entry taken from the provider's day list
    pub forecast: Option<ForecastDay>,
}

impl Current {
    pub fn condition_text(&self) -> Option<&str> {
        self.condition.text.as_deref()
    }

    pub fn condition_icon(&self) -> Option<&str> {
        self.condition.icon.as_deref()
    }

    pub fn condition_code(&self) -> Option<i64> {
        self.condition.code
    }

    pub fn maxtemp_c(&self) -> Option<f64> {
        self.forecast.as_ref()?.maxtemp_c
    }

    pub fn maxtemp_f(&self) -> Option<f64> {
        self.forecast.as_ref()?.maxtemp_f
    }

    pub fn mintemp_c(&self) -> Option<f64> {
        self.forecast.as_ref()?.mintemp_c
    }

    pub fn mintemp_f(&self) -> Option<f64> {
        self.forecast.as_ref()?.mintemp_f
    }

    /// Format temperature with unit
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C / {:.1}°F", self.temp_c, self.temp_f)
    }
}

/// Location the provider resolved the coordinates to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub region: String,
    pub country: String,
    pub tz_id: String,
    pub localtime: String,
}

impl Location {
    /// Name, region and country joined with ", ", skipping blank parts
    pub fn full_name(&self) -> String {
        [&self.name, &self.region, &self.country]
            .into_iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A normalized forecast, ready for presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub location: Location,
    pub current: Current,
    /// Upcoming days in provider order, excluding today
    pub forecast_days: Vec<ForecastDay>,
    /// Whether the payload was served from the cache
    pub cache_hit: bool,
}

/// Provider response in transport-independent form
///
/// This is what the cache stores, so a cached forecast goes through the same
/// normalization as a fresh one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPayload {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
}

impl RawPayload {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(name: &str, region: &str, country: &str) -> Location {
        Location {
            name: name.to_string(),
            region: region.to_string(),
            country: country.to_string(),
            tz_id: "Europe/Paris".to_string(),
            localtime: "2025-01-01 12:00".to_string(),
        }
    }

    fn day(date: &str, max_c: f64) -> ForecastDay {
        ForecastDay {
            date: Some(date.to_string()),
            maxtemp_c: Some(max_c),
            maxtemp_f: Some(max_c * 1.8 + 32.0),
            mintemp_c: Some(max_c - 8.0),
            mintemp_f: Some((max_c - 8.0) * 1.8 + 32.0),
            condition: Some(Condition {
                text: Some("Sunny".to_string()),
                icon: Some("//cdn.weatherapi.com/113.png".to_string()),
                code: Some(1000),
            }),
        }
    }

    #[test]
    fn test_full_name_skips_blank_region() {
        assert_eq!(location("Paris", "", "France").full_name(), "Paris, France");
    }

    #[test]
    fn test_full_name_all_parts() {
        assert_eq!(
            location("San Francisco", "California", "United States of America").full_name(),
            "San Francisco, California, United States of America"
        );
    }

    #[test]
    fn test_full_name_whitespace_counts_as_blank() {
        assert_eq!(location("  ", "Ile-de-France", "France").full_name(), "Ile-de-France, France");
        assert_eq!(location("", "", "").full_name(), "");
    }

    #[test]
    fn test_coordinates_query_format() {
        let coords = Coordinates::new(37.7749, -122.4194);
        assert_eq!(coords.to_query(), "37.7749,-122.4194");
    }

    #[test]
    fn test_usable_postal_code() {
        let coords = Coordinates::new(1.0, 2.0);
        assert_eq!(
            GeoResult::new(coords, Some("94102".to_string())).usable_postal_code(),
            Some("94102")
        );
        assert_eq!(GeoResult::new(coords, Some("   ".to_string())).usable_postal_code(), None);
        assert_eq!(GeoResult::new(coords, None).usable_postal_code(), None);
    }

    #[test]
    fn test_current_delegates_to_today() {
        let current = Current {
            temp_c: 18.0,
            temp_f: 64.4,
            condition: Condition::default(),
            forecast: Some(day("2025-06-01", 21.0)),
        };

        assert_eq!(current.maxtemp_c(), Some(21.0));
        assert_eq!(current.mintemp_c(), Some(13.0));
        assert!(current.condition_text().is_none());
    }

    #[test]
    fn test_current_without_today() {
        let current = Current {
            temp_c: 18.0,
            temp_f: 64.4,
            condition: Condition::default(),
            forecast: None,
        };

        assert!(current.maxtemp_c().is_none());
        assert!(current.mintemp_f().is_none());
        assert_eq!(current.format_temperature(), "18.0°C / 64.4°F");
    }

    #[test]
    fn test_forecast_day_condition_accessors() {
        let d = day("2025-06-02", 20.0);
        assert_eq!(d.condition_text(), Some("Sunny"));
        assert_eq!(d.condition_code(), Some(1000));
        assert!(d.condition_icon().unwrap().ends_with("113.png"));
    }

    #[test]
    fn test_raw_payload_success_range() {
        assert!(RawPayload::new(200, "{}").is_success());
        assert!(RawPayload::new(204, "").is_success());
        assert!(!RawPayload::new(199, "").is_success());
        assert!(!RawPayload::new(301, "").is_success());
        assert!(!RawPayload::new(503, "").is_success());
    }
}
