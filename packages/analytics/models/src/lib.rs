#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Summary statistics types for rain observations.
//!
//! These are plain values computed from a filtered observation set. They
//! carry no references back to the observations they summarize.

use chrono::NaiveDate;
use rain_map_observation_models::RainCategory;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

/// Summary of a filtered observation set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    /// Number of observations.
    pub total: u64,
    /// Mean weight over observations with a positive weight; 0 when none.
    pub average_severity: f64,
    /// One entry per category, in weight order, zero counts included.
    pub category_counts: Vec<CategoryCount>,
    /// Day with the strictly highest mean weight, earliest on ties.
    pub peak_day: Option<PeakDay>,
}

impl AggregateStats {
    /// Stats for an empty observation set.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            total: 0,
            average_severity: 0.0,
            category_counts: RainCategory::all()
                .iter()
                .map(|&category| CategoryCount { category, count: 0 })
                .collect(),
            peak_day: None,
        }
    }

    /// Count for a single category.
    #[must_use]
    pub fn count_for(&self, category: RainCategory) -> u64 {
        self.category_counts
            .iter()
            .find(|c| c.category == category)
            .map_or(0, |c| c.count)
    }
}

impl Default for AggregateStats {
    fn default() -> Self {
        Self::empty()
    }
}

/// Number of observations in one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// The category.
    pub category: RainCategory,
    /// Number of observations.
    pub count: u64,
}

/// The calendar day with the highest mean weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakDay {
    /// Calendar date in the reference timezone.
    pub date: NaiveDate,
    /// Mean weight of every observation on that date.
    pub average_severity: f64,
}

/// One point of the daily intensity trend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySeverityPoint {
    /// Calendar date in the reference timezone.
    pub date: NaiveDate,
    /// Mean weight of every observation on that date.
    pub average_severity: f64,
    /// Number of observations on that date.
    pub count: u64,
}

/// Short-term expectation derived from the most recent reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Outlook {
    /// Heavy rain and storms dominate recent reports.
    HeavyRainLikely,
    /// Light or moderate rain outnumbers dry reports.
    LightRainLikely,
    /// Mostly dry reports.
    ClearExpected,
    /// No recent reports.
    InsufficientData,
}

impl Outlook {
    /// Human-readable summary.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::HeavyRainLikely => "Heavy rain likely in the next few hours.",
            Self::LightRainLikely => "Light rain likely in the next few hours.",
            Self::ClearExpected => "Weather expected to stay clear.",
            Self::InsufficientData => "Not enough data for a prediction.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stats_list_every_category() {
        let stats = AggregateStats::empty();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.category_counts.len(), RainCategory::all().len());
        assert!(stats.category_counts.iter().all(|c| c.count == 0));
        assert!(stats.peak_day.is_none());
    }

    #[test]
    fn count_for_reads_matching_entry() {
        let mut stats = AggregateStats::empty();
        stats.category_counts[4].count = 3;
        assert_eq!(stats.count_for(RainCategory::Storm), 3);
        assert_eq!(stats.count_for(RainCategory::Light), 0);
    }

    #[test]
    fn stats_serialize_camel_case() {
        let value = serde_json::to_value(AggregateStats::empty()).unwrap();
        assert!(value.get("averageSeverity").is_some());
        assert!(value.get("categoryCounts").is_some());
        assert_eq!(value["categoryCounts"][0]["category"], "NONE");
    }

    #[test]
    fn outlook_serializes_kind() {
        let json = serde_json::to_string(&Outlook::HeavyRainLikely).unwrap();
        assert_eq!(json, "\"HEAVY_RAIN_LIKELY\"");
    }
}
