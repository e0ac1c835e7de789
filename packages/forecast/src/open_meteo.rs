//! Open-Meteo hourly forecast client.
//!
//! The feed reports local wall-clock times in the requested timezone
//! together with that timezone's UTC offset. Times are converted to UTC
//! here so nothing downstream has to know about the feed's timezone.

use std::time::Duration;

use chrono::{FixedOffset, NaiveDateTime, Utc};
use rain_map_forecast_models::{ForecastConfig, ForecastSample};
use rain_map_source::retry::{self, DEFAULT_MAX_RETRIES};
use serde::Deserialize;

use crate::ForecastError;

const HOURLY_FIELDS: &str = "precipitation,cloudcover,temperature_2m";

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    #[serde(default)]
    utc_offset_seconds: i32,
    hourly: Option<HourlyBlock>,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    time: Vec<String>,
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
    #[serde(default, alias = "cloud_cover")]
    cloudcover: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
}

/// HTTP client for the Open-Meteo forecast API.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: reqwest::Client,
    max_retries: u32,
}

impl OpenMeteoClient {
    /// Creates a client with a 15 second request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::Source`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, ForecastError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(rain_map_source::SourceError::from)?;
        Ok(Self {
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Creates a client using the retry count from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::Source`] if the HTTP client cannot be built.
    pub fn from_config(config: &ForecastConfig) -> Result<Self, ForecastError> {
        Ok(Self::new()?.with_max_retries(config.max_retries))
    }

    /// Overrides the number of retries after the first attempt.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Retries after the first attempt.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Fetches the hourly series for the configured point.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError`] if the request fails or the response has
    /// an unexpected shape.
    pub async fn fetch_hourly(
        &self,
        config: &ForecastConfig,
    ) -> Result<Vec<ForecastSample>, ForecastError> {
        let params = [
            ("latitude", config.latitude.to_string()),
            ("longitude", config.longitude.to_string()),
            ("hourly", HOURLY_FIELDS.to_string()),
            ("timezone", config.timezone.clone()),
            ("forecast_days", config.forecast_days.to_string()),
        ];

        log::debug!(
            "Fetching forecast for ({}, {}) from {}",
            config.latitude,
            config.longitude,
            config.api_url
        );

        let body = retry::send_json(
            || self.client.get(&config.api_url).query(&params),
            self.max_retries,
        )
        .await?;

        let samples = parse_hourly(body)?;
        log::info!("Fetched {} hourly forecast samples", samples.len());
        Ok(samples)
    }
}

/// Parses an Open-Meteo forecast response into UTC samples.
///
/// Missing hourly values count as 0; a missing temperature stays absent.
/// Precipitation is clamped to be non-negative and cloud cover to 0..=100.
///
/// # Errors
///
/// Returns [`ForecastError::Parse`] if the body or a time value is
/// malformed, or [`ForecastError::Unavailable`] if there is no hourly block.
pub fn parse_hourly(body: serde_json::Value) -> Result<Vec<ForecastSample>, ForecastError> {
    let response: OpenMeteoResponse =
        serde_json::from_value(body).map_err(|e| ForecastError::Parse {
            message: e.to_string(),
        })?;

    let hourly = response.hourly.ok_or_else(|| ForecastError::Unavailable {
        message: "response has no hourly block".to_string(),
    })?;

    let offset =
        FixedOffset::east_opt(response.utc_offset_seconds).ok_or_else(|| ForecastError::Parse {
            message: format!("invalid utc_offset_seconds {}", response.utc_offset_seconds),
        })?;

    let mut samples = hourly
        .time
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let local = parse_local_time(raw).ok_or_else(|| ForecastError::Parse {
                message: format!("invalid hourly time '{raw}'"),
            })?;
            let time = local
                .and_local_timezone(offset)
                .single()
                .ok_or_else(|| ForecastError::Parse {
                    message: format!("ambiguous hourly time '{raw}'"),
                })?
                .with_timezone(&Utc);

            Ok(ForecastSample {
                time,
                precipitation_mm: value_at(&hourly.precipitation, i).unwrap_or(0.0).max(0.0),
                cloud_cover_pct: value_at(&hourly.cloudcover, i)
                    .unwrap_or(0.0)
                    .clamp(0.0, 100.0),
                temperature_c: value_at(&hourly.temperature_2m, i),
            })
        })
        .collect::<Result<Vec<_>, ForecastError>>()?;

    samples.sort_by_key(|s| s.time);
    Ok(samples)
}

fn parse_local_time(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

fn value_at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}
