#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the rain map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the engine's derived view so the API contract can evolve on its
//! own.

use chrono::{DateTime, Utc};
use rain_map_analytics_models::{AggregateStats, Outlook};
use rain_map_forecast_models::ForecastSample;
use rain_map_insights::{Activity, Advisory, SeverityBand};
use rain_map_observation_models::{DataSource, FilterSpec, HazardTag, Observation, RainCategory};
use rain_map_spatial::{DENSITY_SAMPLE_SIZE, RadiusBand};
use serde::{Deserialize, Serialize};

/// `GET /api/health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Always `true` when the server answers.
    pub healthy: bool,
    /// Server version.
    pub version: String,
    /// Generation of the published view.
    pub generation: u64,
    /// Observations in the current snapshot, before filtering.
    pub observations: usize,
    /// When the current snapshot was received.
    pub snapshot_received_at: Option<DateTime<Utc>>,
}

/// One entry of the category table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCategory {
    /// Canonical name.
    pub name: RainCategory,
    /// Report form label.
    pub label: String,
    /// Severity weight.
    pub weight: u8,
    /// Display color.
    pub color: String,
    /// Activity hint.
    pub advisory: String,
}

impl From<RainCategory> for ApiCategory {
    fn from(category: RainCategory) -> Self {
        Self {
            name: category,
            label: category.label().to_string(),
            weight: category.weight(),
            color: category.color().to_string(),
            advisory: category.advisory().to_string(),
        }
    }
}

/// An observation as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiObservation {
    /// Record key.
    pub id: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Rain category.
    pub category: RainCategory,
    /// Severity weight derived from the category.
    pub weight: u8,
    /// Display color of the category.
    pub color: String,
    /// Hazard condition.
    pub hazard: Option<HazardTag>,
    /// Hazard label as shown in the report form.
    pub hazard_label: Option<String>,
    /// When the report was made.
    pub occurred_at: Option<DateTime<Utc>>,
    /// Report time as epoch milliseconds.
    pub timestamp_ms: i64,
    /// Where the report came from.
    pub source: DataSource,
    /// GPS accuracy in meters.
    pub accuracy_m: Option<f64>,
    /// Sensor identifier.
    pub sensor_id: Option<String>,
}

impl From<&Observation> for ApiObservation {
    fn from(obs: &Observation) -> Self {
        Self {
            id: obs.id.clone(),
            latitude: obs.latitude,
            longitude: obs.longitude,
            category: obs.category,
            weight: obs.weight(),
            color: obs.category.color().to_string(),
            hazard: obs.hazard.clone(),
            hazard_label: obs.hazard.as_ref().map(|h| h.label().to_string()),
            occurred_at: obs.occurred_at(),
            timestamp_ms: obs.timestamp_ms,
            source: obs.source,
            accuracy_m: obs.accuracy_m,
            sensor_id: obs.sensor_id.clone(),
        }
    }
}

/// `GET /api/stats` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStats {
    /// Summary statistics.
    #[serde(flatten)]
    pub stats: AggregateStats,
    /// Most severe filtered observation.
    pub highest: Option<ApiObservation>,
}

/// `GET /api/radius` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRadius {
    /// Display radius in meters.
    pub radius_m: f64,
    /// Density band.
    pub band: RadiusBand,
    /// Number of filtered observations the radius applies to.
    pub observations: usize,
    /// Maximum number of points sampled for density.
    pub sample_size: usize,
}

impl ApiRadius {
    /// Builds the response for `observations` points.
    #[must_use]
    pub const fn new(radius_m: f64, band: RadiusBand, observations: usize) -> Self {
        Self {
            radius_m,
            band,
            observations,
            sample_size: DENSITY_SAMPLE_SIZE,
        }
    }
}

/// An advisory with its display text.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAdvisory {
    /// The advisory, tagged with its `kind`.
    #[serde(flatten)]
    pub advisory: Advisory,
    /// Text shown to the user.
    pub message: String,
}

impl From<Advisory> for ApiAdvisory {
    fn from(advisory: Advisory) -> Self {
        Self {
            message: advisory.message(),
            advisory,
        }
    }
}

/// `GET /api/insights` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiInsights {
    /// Advisory cascade output.
    pub advisories: Vec<ApiAdvisory>,
    /// Severity band behind `activities`.
    pub severity_band: SeverityBand,
    /// Activity recommendations.
    pub activities: &'static [Activity],
    /// Outlook from recent reports.
    pub outlook: Outlook,
    /// Outlook text.
    pub outlook_message: String,
}

/// `GET /api/forecast` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiForecast {
    /// Whether a forecast is available at all.
    pub available: bool,
    /// Sample for the current hour.
    pub current: Option<ForecastSample>,
    /// Upcoming hours.
    pub window: Vec<ForecastSample>,
}

/// `POST /api/filter` request body.
///
/// Dates are `YYYY-MM-DD` in the reference timezone. Omitted categories
/// mean all categories.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFilterRequest {
    /// First day to include.
    pub from: Option<String>,
    /// Last day to include.
    pub to: Option<String>,
    /// Category names or form labels.
    pub categories: Option<Vec<String>>,
}

/// `POST /api/filter` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFilterResponse {
    /// Generation of the view computed for this filter.
    pub generation: u64,
    /// The filter now in effect.
    pub filter: FilterSpec,
    /// Observations passing the filter.
    pub total: u64,
    /// Display radius for the filtered set.
    pub radius_m: f64,
}

/// Error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// What went wrong.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_entry_carries_display_attributes() {
        let entry = ApiCategory::from(RainCategory::Heavy);
        assert_eq!(entry.label, "Hujan Lebat");
        assert_eq!(entry.weight, 3);
        assert_eq!(entry.color, "#FF9500");
    }

    #[test]
    fn advisory_flattens_kind_and_message() {
        let value = serde_json::to_value(ApiAdvisory::from(Advisory::ReportVolume { total: 11 }))
            .unwrap();
        assert_eq!(value["kind"], "REPORT_VOLUME");
        assert_eq!(value["total"], 11);
        assert_eq!(value["message"], "11 rain reports in the selected period.");
    }

    #[test]
    fn filter_request_fields_are_optional() {
        let request: ApiFilterRequest = serde_json::from_str("{}").unwrap();
        assert!(request.from.is_none());
        assert!(request.categories.is_none());
    }

    #[test]
    fn observation_exposes_weight_and_hazard_label() {
        let obs = Observation {
            id: "a".to_string(),
            latitude: -7.79,
            longitude: 110.36,
            category: RainCategory::Storm,
            hazard: Some(HazardTag::Flood),
            timestamp_ms: 1_705_312_200_000,
            source: DataSource::Manual,
            accuracy_m: Some(12.0),
            sensor_id: None,
        };
        let api = ApiObservation::from(&obs);
        assert_eq!(api.weight, 4);
        assert_eq!(api.hazard_label.as_deref(), Some("Banjir"));
        assert!(api.occurred_at.is_some());
    }
}
