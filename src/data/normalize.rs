//! Normalization of weatherapi.com forecast payloads
//!
//! The provider schema is decoded once into the typed `api` structs below and
//! then converted into the value objects of the parent module. Mandatory
//! fields (the whole `location` object, `current.temp_c`, `current.temp_f` and
//! `current.condition`) fail decoding when missing. Everything inside a
//! condition or a forecast day is optional, and malformed values there are
//! normalized to `None` instead of failing.

use thiserror::Error;

use super::{Condition, Current, ForecastDay, ForecastResponse, Location};

/// Errors that can occur when normalizing a provider payload
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The payload is not valid JSON or misses a mandatory field
    #[error("Malformed forecast payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Parses a raw provider payload into a `ForecastResponse`
///
/// The first forecast day becomes `current.forecast`; the remaining days, in
/// provider order, become `forecast_days`.
///
/// # Arguments
/// * `raw` - The response body as returned by the provider
/// * `cache_hit` - Whether the payload came from the cache
pub fn parse(raw: &[u8], cache_hit: bool) -> Result<ForecastResponse, NormalizeError> {
    let payload: api::ForecastPayload = serde_json::from_slice(raw)?;

    let mut days = payload
        .forecast
        .and_then(|forecast| forecast.forecastday)
        .unwrap_or_default()
        .into_iter()
        .map(ForecastDay::from);

    let today = days.next();
    let forecast_days: Vec<ForecastDay> = days.collect();

    Ok(ForecastResponse {
        location: payload.location.into(),
        current: Current {
            temp_c: payload.current.temp_c,
            temp_f: payload.current.temp_f,
            condition: payload.current.condition.into(),
            forecast: today,
        },
        forecast_days,
        cache_hit,
    })
}

/// weatherapi.com response structures
mod api {
    use serde::{de::DeserializeOwned, Deserialize, Deserializer};

    /// Deserializes a value, mapping nulls and wrong types to `None`
    fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(serde_json::from_value(value).ok())
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastPayload {
        pub location: LocationData,
        pub current: CurrentData,
        #[serde(default)]
        pub forecast: Option<ForecastData>,
    }

    #[derive(Debug, Deserialize)]
    pub struct LocationData {
        pub name: String,
        pub region: String,
        pub country: String,
        pub tz_id: String,
        pub localtime: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct CurrentData {
        pub temp_c: f64,
        pub temp_f: f64,
        pub condition: ConditionData,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct ConditionData {
        #[serde(default, deserialize_with = "lenient")]
        pub text: Option<String>,
        #[serde(default, deserialize_with = "lenient")]
        pub icon: Option<String>,
        #[serde(default, deserialize_with = "lenient")]
        pub code: Option<i64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastData {
        #[serde(default)]
        pub forecastday: Option<Vec<ForecastDayData>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastDayData {
        #[serde(default, deserialize_with = "lenient")]
        pub date: Option<String>,
        #[serde(default, deserialize_with = "lenient")]
        pub day: Option<DayData>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct DayData {
        #[serde(default, deserialize_with = "lenient")]
        pub maxtemp_c: Option<f64>,
        #[serde(default, deserialize_with = "lenient")]
        pub maxtemp_f: Option<f64>,
        #[serde(default, deserialize_with = "lenient")]
        pub mintemp_c: Option<f64>,
        #[serde(default, deserialize_with = "lenient")]
        pub mintemp_f: Option<f64>,
        #[serde(default, deserialize_with = "lenient")]
        pub condition: Option<ConditionData>,
    }
}

impl From<api::LocationData> for Location {
    fn from(data: api::LocationData) -> Self {
        Self {
            name: data.name,
            region: data.region,
            country: data.country,
            tz_id: data.tz_id,
            localtime: data.localtime,
        }
    }
}

impl From<api::ConditionData> for Condition {
    fn from(data: api::ConditionData) -> Self {
        Self {
            text: data.text,
            icon: data.icon,
            code: data.code,
        }
    }
}

impl From<api::ForecastDayData> for ForecastDay {
    fn from(data: api::ForecastDayData) -> Self {
        let day = data.day.unwrap_or_default();
        Self {
            date: data.date,
            maxtemp_c: day.maxtemp_c,
            maxtemp_f: day.maxtemp_f,
            mintemp_c: day.mintemp_c,
            mintemp_f: day.mintemp_f,
            condition: day.condition.map(Condition::from),
        }
    }
}
