//! Threshold rules turning forecast and stats into advisories.

use rain_map_analytics_models::AggregateStats;
use rain_map_forecast_models::ForecastSample;
use serde::{Deserialize, Serialize};

/// Precipitation (mm) above which rain counts as high intensity.
pub const HIGH_INTENSITY_MM: f64 = 5.0;
/// Precipitation (mm) above which rain counts as moderate.
pub const MODERATE_MM: f64 = 2.0;
/// Cloud cover (%) above which skies count as heavily overcast.
pub const HEAVY_CLOUD_PCT: f64 = 80.0;
/// Temperature (°C) above which heat is flagged.
pub const HIGH_TEMPERATURE_C: f64 = 30.0;
/// Report count above which the volume advisory appears.
pub const REPORT_VOLUME_THRESHOLD: u64 = 10;

/// One advisory produced by the rule cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Advisory {
    /// Forecast precipitation above 5 mm.
    HighIntensityRain,
    /// Forecast precipitation above 2 mm.
    ModerateRain,
    /// Some forecast precipitation.
    LightRain,
    /// No forecast precipitation.
    ClearWeather,
    /// Cloud cover above 80%.
    HeavyCloudCover,
    /// Temperature above 30 °C.
    HighTemperature,
    /// More than ten reports in the current selection.
    ReportVolume {
        /// Number of reports.
        total: u64,
    },
}

impl Advisory {
    /// Text shown to the user.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::HighIntensityRain => {
                "High intensity rain detected. Avoid outdoor activities.".to_string()
            }
            Self::ModerateRain => "Moderate rain. Bring an umbrella if travelling.".to_string(),
            Self::LightRain => "Light rain. Outdoor activities remain possible.".to_string(),
            Self::ClearWeather => "Clear weather. Good time for outdoor activities.".to_string(),
            Self::HeavyCloudCover => "Heavy cloud cover. Rain may start soon.".to_string(),
            Self::HighTemperature => "High temperature. Drink plenty of water.".to_string(),
            Self::ReportVolume { total } => {
                format!("{total} rain reports in the selected period.")
            }
        }
    }
}

/// Runs the advisory cascade.
///
/// Rules are evaluated in a fixed order and each one appends
/// independently: exactly one precipitation tier, then cloud cover, then
/// temperature, then report volume. Without a forecast only the report
/// volume rule can fire.
#[must_use]
pub fn generate_insights(
    current: Option<&ForecastSample>,
    stats: &AggregateStats,
) -> Vec<Advisory> {
    let mut advisories = Vec::new();

    if let Some(sample) = current {
        advisories.push(precipitation_tier(sample.precipitation_mm));

        if sample.cloud_cover_pct > HEAVY_CLOUD_PCT {
            advisories.push(Advisory::HeavyCloudCover);
        }

        if sample.temperature_c.is_some_and(|t| t > HIGH_TEMPERATURE_C) {
            advisories.push(Advisory::HighTemperature);
        }
    }

    if stats.total > REPORT_VOLUME_THRESHOLD {
        advisories.push(Advisory::ReportVolume { total: stats.total });
    }

    advisories
}

fn precipitation_tier(precipitation_mm: f64) -> Advisory {
    if precipitation_mm > HIGH_INTENSITY_MM {
        Advisory::HighIntensityRain
    } else if precipitation_mm > MODERATE_MM {
        Advisory::ModerateRain
    } else if precipitation_mm > 0.0 {
        Advisory::LightRain
    } else {
        Advisory::ClearWeather
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn forecast(
        precipitation_mm: f64,
        cloud_cover_pct: f64,
        temperature_c: Option<f64>,
    ) -> ForecastSample {
        ForecastSample {
            time: Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
            precipitation_mm,
            cloud_cover_pct,
            temperature_c,
        }
    }

    fn stats(total: u64) -> AggregateStats {
        AggregateStats {
            total,
            ..AggregateStats::empty()
        }
    }

    #[test]
    fn heavy_precipitation_is_high_intensity() {
        let advisories = generate_insights(Some(&forecast(6.0, 10.0, None)), &stats(0));
        assert!(advisories.contains(&Advisory::HighIntensityRain));
        assert!(!advisories.contains(&Advisory::ClearWeather));
        assert_eq!(advisories.len(), 1);
    }

    #[test]
    fn exactly_one_precipitation_tier() {
        for (mm, expected) in [
            (5.0, Advisory::ModerateRain),
            (2.0, Advisory::LightRain),
            (0.1, Advisory::LightRain),
            (0.0, Advisory::ClearWeather),
        ] {
            assert_eq!(
                generate_insights(Some(&forecast(mm, 0.0, None)), &stats(0)),
                vec![expected]
            );
        }
    }

    #[test]
    fn cascade_order_is_fixed() {
        let advisories = generate_insights(Some(&forecast(3.0, 85.0, Some(31.0))), &stats(11));
        assert_eq!(
            advisories,
            vec![
                Advisory::ModerateRain,
                Advisory::HeavyCloudCover,
                Advisory::HighTemperature,
                Advisory::ReportVolume { total: 11 },
            ]
        );
    }

    #[test]
    fn thresholds_are_strict() {
        let advisories = generate_insights(Some(&forecast(0.0, 80.0, Some(30.0))), &stats(10));
        assert_eq!(advisories, vec![Advisory::ClearWeather]);
    }

    #[test]
    fn missing_forecast_keeps_volume_only() {
        assert!(generate_insights(None, &stats(3)).is_empty());
        assert_eq!(
            generate_insights(None, &stats(12)),
            vec![Advisory::ReportVolume { total: 12 }]
        );
    }

    #[test]
    fn volume_message_names_total() {
        assert_eq!(
            Advisory::ReportVolume { total: 14 }.message(),
            "14 rain reports in the selected period."
        );
    }

    #[test]
    fn serializes_with_kind_tag() {
        let value = serde_json::to_value(Advisory::ReportVolume { total: 12 }).unwrap();
        assert_eq!(value["kind"], "REPORT_VOLUME");
        assert_eq!(value["total"], 12);
    }
}
