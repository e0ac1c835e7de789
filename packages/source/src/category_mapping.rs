//! Rain category mapping utilities.
//!
//! Maps the free-form intensity label stored on a raw record to the
//! canonical [`RainCategory`] taxonomy. Labels that match nothing are
//! coerced to the "no precipitation" default and reported back to the
//! caller so the coercion can be surfaced as a warning.

use rain_map_observation_models::RainCategory;

/// Outcome of resolving a raw intensity label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryMatch {
    /// The label named a known category.
    Known(RainCategory),
    /// No label was supplied; the default applies silently.
    Missing,
    /// The label was supplied but matched nothing.
    Unknown(String),
}

impl CategoryMatch {
    /// The category to store, applying the default for missing or unknown
    /// labels.
    #[must_use]
    pub fn category(&self) -> RainCategory {
        match self {
            Self::Known(category) => *category,
            Self::Missing | Self::Unknown(_) => RainCategory::default(),
        }
    }
}

/// Resolves a raw intensity label to the canonical category.
///
/// Matching is case-insensitive and whitespace-tolerant, and accepts both
/// the report form labels and canonical names.
#[must_use]
pub fn map_rain_category(raw: Option<&str>) -> CategoryMatch {
    let Some(label) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return CategoryMatch::Missing;
    };

    RainCategory::from_label(label)
        .map_or_else(|| CategoryMatch::Unknown(label.to_string()), CategoryMatch::Known)
}
