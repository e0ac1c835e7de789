//! The derived view: everything presentation consumers read.

use chrono::{DateTime, FixedOffset, Utc};
use rain_map_analytics::{RECENT_WINDOW, aggregate, daily_trend, highest_observed, recent_outlook};
use rain_map_analytics_models::{AggregateStats, DailySeverityPoint, Outlook};
use rain_map_forecast::merge_forecast;
use rain_map_forecast_models::ForecastSample;
use rain_map_insights::{Activity, Advisory, SeverityBand, generate_insights, recommend_activities};
use rain_map_observation_models::{FilterSpec, Observation};
use rain_map_spatial::{RadiusBand, estimate_band};
use serde::Serialize;

/// Result of filtering, aggregating, estimating and advising over one
/// snapshot, filter and forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedView {
    /// Recompute sequence number; higher is newer.
    pub generation: u64,
    /// Filter the view was computed with.
    pub filter: FilterSpec,
    /// Observations passing the filter, in snapshot order.
    pub filtered: Vec<Observation>,
    /// Summary statistics over `filtered`.
    pub stats: AggregateStats,
    /// Display radius for every circle, in meters.
    pub radius: f64,
    /// Density band behind `radius`.
    pub radius_band: RadiusBand,
    /// Most severe filtered observation.
    pub highest: Option<Observation>,
    /// Daily intensity trend over `filtered`.
    pub trend: Vec<DailySeverityPoint>,
    /// Outlook from the most recent filtered reports.
    pub outlook: Outlook,
    /// Advisory cascade output.
    pub advisories: Vec<Advisory>,
    /// Severity band behind `activities`.
    pub severity_band: SeverityBand,
    /// Activity recommendations.
    pub activities: &'static [Activity],
    /// Forecast sample for the current hour.
    pub current_forecast: Option<ForecastSample>,
    /// Upcoming forecast hours.
    pub forecast_window: Vec<ForecastSample>,
}

/// Everything a view is computed from.
#[derive(Debug, Clone, Copy)]
pub struct ViewInputs<'a> {
    /// Sequence number stamped on the result.
    pub generation: u64,
    /// Full normalized snapshot.
    pub observations: &'a [Observation],
    /// Active filter.
    pub filter: &'a FilterSpec,
    /// Forecast series, if one is available.
    pub forecast: Option<&'a [ForecastSample]>,
    /// Wall clock used to pick the current forecast hour.
    pub now: DateTime<Utc>,
    /// Reference timezone for calendar days.
    pub tz: FixedOffset,
    /// Number of forecast hours to expose.
    pub forecast_window: usize,
}

impl DerivedView {
    /// Computes a view from scratch.
    #[must_use]
    pub fn compute(inputs: &ViewInputs<'_>) -> Self {
        let filtered = rain_map_analytics::filter(inputs.observations, inputs.filter);
        let stats = aggregate(&filtered, inputs.tz);
        let radius_band = estimate_band(&filtered);

        let merged = inputs
            .forecast
            .and_then(|series| merge_forecast(series.to_vec(), inputs.now));
        let current_forecast = merged.as_ref().map(|m| m.current);
        let forecast_window = merged
            .as_ref()
            .map(|m| m.next_window(inputs.forecast_window).to_vec())
            .unwrap_or_default();

        let advisories = generate_insights(current_forecast.as_ref(), &stats);
        let severity_band = current_band(current_forecast.as_ref(), &filtered);

        Self {
            generation: inputs.generation,
            filter: inputs.filter.clone(),
            highest: highest_observed(&filtered).cloned(),
            trend: daily_trend(&filtered, inputs.tz),
            outlook: recent_outlook(&filtered, RECENT_WINDOW),
            radius: radius_band.radius_m(),
            radius_band,
            stats,
            advisories,
            severity_band,
            activities: recommend_activities(severity_band),
            current_forecast,
            forecast_window,
            filtered,
        }
    }
}

/// Forecast precipitation when available, then the newest filtered
/// report, then [`SeverityBand::Low`].
fn current_band(current: Option<&ForecastSample>, filtered: &[Observation]) -> SeverityBand {
    if let Some(sample) = current {
        return SeverityBand::from_precipitation(sample.precipitation_mm);
    }
    filtered
        .iter()
        .max_by_key(|obs| obs.timestamp_ms)
        .map_or(SeverityBand::Low, |obs| SeverityBand::from_category(obs.category))
}
