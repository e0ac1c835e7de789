#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Rain category taxonomy, observation and filter types.
//!
//! This crate defines the canonical rain intensity taxonomy used across the
//! entire rain-map system. Every raw report is normalized into an
//! [`Observation`] carrying one [`RainCategory`], whose ordinal weight drives
//! severity comparisons, aggregation and advisories.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Rain intensity category reported for a single observation.
///
/// Variants are declared in severity order, so the derived [`Ord`] matches
/// the ordinal [`weight`](Self::weight).
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum RainCategory {
    /// Weight 0: no precipitation
    #[default]
    None = 0,
    /// Weight 1: light rain
    Light = 1,
    /// Weight 2: moderate rain
    Moderate = 2,
    /// Weight 3: heavy rain
    Heavy = 3,
    /// Weight 4: storm
    Storm = 4,
}

impl RainCategory {
    /// Returns the ordinal severity weight of this category (0-4).
    #[must_use]
    pub const fn weight(self) -> u8 {
        self as u8
    }

    /// Creates a category from its severity weight.
    ///
    /// # Errors
    ///
    /// Returns an error if the weight is not in the range 0-4.
    pub const fn from_weight(weight: u8) -> Result<Self, InvalidWeightError> {
        match weight {
            0 => Ok(Self::None),
            1 => Ok(Self::Light),
            2 => Ok(Self::Moderate),
            3 => Ok(Self::Heavy),
            4 => Ok(Self::Storm),
            _ => Err(InvalidWeightError { weight }),
        }
    }

    /// The label reporters pick in the submission form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "Tidak Hujan",
            Self::Light => "Hujan Ringan",
            Self::Moderate => "Hujan Sedang",
            Self::Heavy => "Hujan Lebat",
            Self::Storm => "Badai",
        }
    }

    /// Display color used for map circles and chart legends.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::None => "#32D74B",
            Self::Light => "#4A9EFF",
            Self::Moderate => "#FFD60A",
            Self::Heavy => "#FF9500",
            Self::Storm => "#FF453A",
        }
    }

    /// Short outdoor-activity hint shown next to a single report.
    #[must_use]
    pub const fn advisory(self) -> &'static str {
        match self {
            Self::Moderate => "Use an umbrella or raincoat when travelling.",
            Self::Heavy => "Watch for standing water. Avoid non-urgent trips.",
            Self::Storm => "Strongly advised to stay in a safe indoor place.",
            Self::None | Self::Light => "Outdoor activities are relatively safe.",
        }
    }

    /// Resolves a raw category label from a report.
    ///
    /// Accepts the form label (e.g. `"Hujan Lebat"`) or the canonical name
    /// (e.g. `"HEAVY"`, `"heavy"`), ignoring surrounding whitespace and
    /// case. Returns `None` when the label matches nothing.
    #[must_use]
    pub fn from_label(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::all()
            .iter()
            .copied()
            .find(|cat| cat.label().eq_ignore_ascii_case(trimmed))
            .or_else(|| trimmed.parse().ok())
    }

    /// Returns all variants in weight order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::None,
            Self::Light,
            Self::Moderate,
            Self::Heavy,
            Self::Storm,
        ]
    }
}

/// Error returned when attempting to create a [`RainCategory`] from an
/// invalid weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidWeightError {
    /// The invalid weight that was provided.
    pub weight: u8,
}

impl std::fmt::Display for InvalidWeightError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid rain weight {}: expected 0-4", self.weight)
    }
}

impl std::error::Error for InvalidWeightError {}

/// Hazard condition attached to a report, independent of rain intensity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HazardTag {
    /// A tree has fallen across a road or property
    FallenTree,
    /// Active flooding
    Flood,
    /// Active landslide
    Landslide,
    /// Strong wind
    StrongWind,
    /// Road covered in mud
    MuddyRoad,
    /// Area prone to landslides
    LandslideProne,
    /// Drainage blocked
    BlockedDrainage,
    /// Area prone to flooding
    FloodProne,
    /// Free-text hazard typed by the reporter
    Other(String),
}

impl HazardTag {
    const VOCABULARY: &[(Self, &'static str)] = &[
        (Self::FallenTree, "Pohon Tumbang"),
        (Self::Flood, "Banjir"),
        (Self::Landslide, "Tanah Longsor"),
        (Self::StrongWind, "Angin Kencang"),
        (Self::MuddyRoad, "Jalan Berlumpur"),
        (Self::LandslideProne, "Rawan Tanah Longsor"),
        (Self::BlockedDrainage, "Drainase Tersumbat"),
        (Self::FloodProne, "Kawasan Rawan Banjir"),
    ];

    /// Parses a hazard label from a report.
    ///
    /// Known form labels and canonical names map to their variant; any
    /// other non-empty text becomes [`HazardTag::Other`]. Empty text means
    /// no hazard was reported.
    #[must_use]
    pub fn from_text(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let canonical = trimmed.replace([' ', '-'], "_").to_ascii_uppercase();

        Self::VOCABULARY
            .iter()
            .find(|(tag, label)| {
                label.eq_ignore_ascii_case(trimmed) || tag.canonical_name() == canonical
            })
            .map_or_else(|| Some(Self::Other(trimmed.to_string())), |(tag, _)| Some(tag.clone()))
    }

    /// The label shown in the report form, or the reporter's own text.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Other(text) => text.as_str(),
            known => Self::VOCABULARY
                .iter()
                .find(|(tag, _)| tag == known)
                .map_or("", |(_, label)| *label),
        }
    }

    const fn canonical_name(&self) -> &'static str {
        match self {
            Self::FallenTree => "FALLEN_TREE",
            Self::Flood => "FLOOD",
            Self::Landslide => "LANDSLIDE",
            Self::StrongWind => "STRONG_WIND",
            Self::MuddyRoad => "MUDDY_ROAD",
            Self::LandslideProne => "LANDSLIDE_PRONE",
            Self::BlockedDrainage => "BLOCKED_DRAINAGE",
            Self::FloodProne => "FLOOD_PRONE",
            Self::Other(_) => "OTHER",
        }
    }
}

/// Where a report came from.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DataSource {
    /// Filled in by a user at their current location
    #[default]
    Manual,
    /// Pushed by a deployed rain sensor
    IotSensor,
}

/// A single normalized rain/hazard report.
///
/// Produced only by the normalizer; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// Record key from the event store.
    pub id: String,
    /// Latitude (WGS84), within `[-90, 90]`.
    pub latitude: f64,
    /// Longitude (WGS84), within `[-180, 180]`.
    pub longitude: f64,
    /// Rain intensity category.
    pub category: RainCategory,
    /// Optional hazard condition.
    pub hazard: Option<HazardTag>,
    /// Report time as epoch milliseconds (non-negative).
    pub timestamp_ms: i64,
    /// Where the report came from.
    pub source: DataSource,
    /// GPS accuracy in meters, for manual reports.
    pub accuracy_m: Option<f64>,
    /// Sensor identifier, for IoT reports.
    pub sensor_id: Option<String>,
}

impl Observation {
    /// Severity weight derived from [`Self::category`].
    #[must_use]
    pub const fn weight(&self) -> u8 {
        self.category.weight()
    }

    /// Report time as a UTC datetime.
    #[must_use]
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_ms)
    }
}

/// Time range and category selection applied to the observation set.
///
/// Bounds are inclusive epoch milliseconds; `None` leaves that side open.
/// An empty category set selects nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    /// Inclusive lower bound.
    pub start_ms: Option<i64>,
    /// Inclusive upper bound.
    pub end_ms: Option<i64>,
    /// Categories to keep.
    pub categories: BTreeSet<RainCategory>,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            start_ms: None,
            end_ms: None,
            categories: RainCategory::all().iter().copied().collect(),
        }
    }
}

impl FilterSpec {
    /// Returns `true` if the observation falls inside this selection.
    #[must_use]
    pub fn matches(&self, observation: &Observation) -> bool {
        self.start_ms.is_none_or(|start| observation.timestamp_ms >= start)
            && self.end_ms.is_none_or(|end| observation.timestamp_ms <= end)
            && self.categories.contains(&observation.category)
    }

    /// Replaces the category selection.
    #[must_use]
    pub fn with_categories(mut self, categories: impl IntoIterator<Item = RainCategory>) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    /// Sets the time bounds.
    #[must_use]
    pub const fn with_range(mut self, start_ms: Option<i64>, end_ms: Option<i64>) -> Self {
        self.start_ms = start_ms;
        self.end_ms = end_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_from_value_roundtrip() {
        for w in 0..=4u8 {
            let category = RainCategory::from_weight(w).unwrap();
            assert_eq!(category.weight(), w);
        }
        assert!(RainCategory::from_weight(5).is_err());
    }

    #[test]
    fn ordering_follows_weight() {
        let weights: Vec<u8> = RainCategory::all().iter().map(|c| c.weight()).collect();
        assert_eq!(weights, vec![0, 1, 2, 3, 4]);
        assert!(RainCategory::Storm > RainCategory::Heavy);
        assert!(RainCategory::None < RainCategory::Light);
    }

    #[test]
    fn resolves_form_labels_and_names() {
        assert_eq!(
            RainCategory::from_label(" Hujan Lebat "),
            Some(RainCategory::Heavy)
        );
        assert_eq!(RainCategory::from_label("badai"), Some(RainCategory::Storm));
        assert_eq!(
            RainCategory::from_label("MODERATE"),
            Some(RainCategory::Moderate)
        );
        assert_eq!(RainCategory::from_label("light"), Some(RainCategory::Light));
        assert_eq!(RainCategory::from_label("Unknown"), None);
    }

    #[test]
    fn default_is_no_precipitation() {
        assert_eq!(RainCategory::default(), RainCategory::None);
        assert_eq!(RainCategory::default().weight(), 0);
    }

    #[test]
    fn serializes_screaming_snake_case() {
        let json = serde_json::to_string(&RainCategory::Storm).unwrap();
        assert_eq!(json, "\"STORM\"");
    }

    #[test]
    fn hazard_vocabulary_and_free_text() {
        assert_eq!(HazardTag::from_text("Banjir"), Some(HazardTag::Flood));
        assert_eq!(
            HazardTag::from_text("blocked drainage"),
            Some(HazardTag::BlockedDrainage)
        );
        assert_eq!(
            HazardTag::from_text("Jembatan putus"),
            Some(HazardTag::Other("Jembatan putus".to_string()))
        );
        assert_eq!(HazardTag::from_text("   "), None);
        assert_eq!(HazardTag::Flood.label(), "Banjir");
    }

    #[test]
    fn default_filter_selects_everything() {
        let spec = FilterSpec::default();
        assert_eq!(spec.categories.len(), RainCategory::all().len());
        assert!(spec.start_ms.is_none());
        assert!(spec.end_ms.is_none());
    }

    #[test]
    fn filter_bounds_are_inclusive() {
        let obs = Observation {
            id: "a".to_string(),
            latitude: -7.79,
            longitude: 110.36,
            category: RainCategory::Light,
            hazard: None,
            timestamp_ms: 1_000,
            source: DataSource::Manual,
            accuracy_m: None,
            sensor_id: None,
        };
        let spec = FilterSpec::default().with_range(Some(1_000), Some(1_000));
        assert!(spec.matches(&obs));

        let spec = FilterSpec::default().with_range(Some(1_001), None);
        assert!(!spec.matches(&obs));

        let spec = FilterSpec::default().with_categories([]);
        assert!(!spec.matches(&obs));
    }
}
