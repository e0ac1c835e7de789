#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hourly weather forecast types for the rain map.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One hour of forecast data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSample {
    /// Start of the hour.
    pub time: DateTime<Utc>,
    /// Precipitation in millimeters, never negative.
    pub precipitation_mm: f64,
    /// Cloud cover percentage, 0 to 100.
    pub cloud_cover_pct: f64,
    /// Air temperature at 2 m, when the feed reports it.
    pub temperature_c: Option<f64>,
}

/// A forecast series with the sample for the current hour picked out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedForecast {
    /// Latest sample at or before "now", or the first sample when the whole
    /// series lies in the future.
    pub current: ForecastSample,
    /// The full series, chronological.
    pub series: Vec<ForecastSample>,
}

impl MergedForecast {
    /// The first `n` samples of the series, unaltered.
    #[must_use]
    pub fn next_window(&self, n: usize) -> &[ForecastSample] {
        &self.series[..n.min(self.series.len())]
    }
}

/// Where and how to query the hourly forecast feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Forecast endpoint.
    pub api_url: String,
    /// Latitude of the forecast point.
    pub latitude: f64,
    /// Longitude of the forecast point.
    pub longitude: f64,
    /// IANA timezone name the feed reports local times in.
    pub timezone: String,
    /// Number of forecast days to request.
    pub forecast_days: u8,
    /// Number of hourly samples exposed as the forecast window.
    pub window_hours: usize,
    /// Retries after a failed forecast request.
    pub max_retries: u32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            latitude: -7.79,
            longitude: 110.36,
            timezone: "Asia/Jakarta".to_string(),
            forecast_days: 1,
            window_hours: 12,
            max_retries: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample(hour: u32) -> ForecastSample {
        ForecastSample {
            time: Utc.with_ymd_and_hms(2024, 1, 15, hour, 0, 0).unwrap(),
            precipitation_mm: f64::from(hour),
            cloud_cover_pct: 50.0,
            temperature_c: None,
        }
    }

    #[test]
    fn next_window_is_prefix() {
        let merged = MergedForecast {
            current: sample(0),
            series: (0..5).map(sample).collect(),
        };
        assert_eq!(merged.next_window(2), &merged.series[..2]);
        assert_eq!(merged.next_window(10).len(), 5);
        assert!(merged.next_window(0).is_empty());
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config: ForecastConfig = serde_json::from_str(r#"{"latitude": -6.2}"#).unwrap();
        assert!((config.latitude - -6.2).abs() < f64::EPSILON);
        assert_eq!(config.timezone, "Asia/Jakarta");
        assert_eq!(config.window_hours, 12);
        assert_eq!(config.max_retries, 3);
    }
}
