//! Picks the current hour out of a forecast series.

use chrono::{DateTime, Utc};
use rain_map_forecast_models::{ForecastSample, MergedForecast};

/// Pairs a chronological series with the sample for `now`.
///
/// The current sample is the latest one whose time is at or before `now`.
/// When every sample lies in the future the first one is used. Returns
/// `None` only for an empty series.
#[must_use]
pub fn merge_forecast(series: Vec<ForecastSample>, now: DateTime<Utc>) -> Option<MergedForecast> {
    let first = *series.first()?;
    let current = series
        .iter()
        .take_while(|sample| sample.time <= now)
        .last()
        .copied()
        .unwrap_or(first);

    Some(MergedForecast { current, series })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, hour, 0, 0).unwrap()
    }

    fn sample(hour: u32, precipitation_mm: f64) -> ForecastSample {
        ForecastSample {
            time: at(hour),
            precipitation_mm,
            cloud_cover_pct: 40.0,
            temperature_c: Some(27.0),
        }
    }

    fn series() -> Vec<ForecastSample> {
        vec![
            sample(0, 0.0),
            sample(1, 1.5),
            sample(2, 6.0),
            sample(3, 0.2)
        ]
    }

    #[test]
    fn empty_series_has_no_forecast() {
        assert!(merge_forecast(Vec::new(), at(0)).is_none());
    }

    #[test]
    fn picks_latest_past_sample() {
        let now = at(2) + chrono::Duration::minutes(30);
        let merged = merge_forecast(series(), now).unwrap();
        assert_eq!(merged.current.time, at(2));
        assert!((merged.current.precipitation_mm - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn exact_hour_counts_as_past() {
        let merged = merge_forecast(series(), at(1)).unwrap();
        assert_eq!(merged.current.time, at(1));
    }

    #[test]
    fn future_series_uses_first_sample() {
        let merged = merge_forecast(series(), at(0) - chrono::Duration::hours(5)).unwrap();
        assert_eq!(merged.current.time, at(0));
    }

    #[test]
    fn window_returns_unaltered_prefix() {
        let merged = merge_forecast(series(), at(3)).unwrap();
        assert_eq!(merged.next_window(2), &series()[..2]);
        assert_eq!(merged.next_window(12).len(), 4);
    }
}
