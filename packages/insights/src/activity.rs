//! Activity recommendations keyed by severity band.

use rain_map_observation_models::RainCategory;
use serde::Serialize;
use strum_macros::{AsRefStr, Display};

use crate::advisory::{HIGH_INTENSITY_MM, MODERATE_MM};

/// Coarse severity tier used to pick activity recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SeverityBand {
    /// Heavy rain or storms.
    High,
    /// Moderate rain.
    Medium,
    /// Dry or light rain.
    Low,
}

impl SeverityBand {
    /// Band for a forecast precipitation amount (mm).
    #[must_use]
    pub fn from_precipitation(precipitation_mm: f64) -> Self {
        if precipitation_mm > HIGH_INTENSITY_MM {
            Self::High
        } else if precipitation_mm > MODERATE_MM {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Band for an observed category.
    #[must_use]
    pub const fn from_category(category: RainCategory) -> Self {
        match category {
            RainCategory::Heavy | RainCategory::Storm => Self::High,
            RainCategory::Moderate => Self::Medium,
            RainCategory::None | RainCategory::Light => Self::Low,
        }
    }
}

/// A recommended (or discouraged) activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Short description.
    pub name: &'static str,
    /// `true` to do it, `false` to avoid it.
    pub suggested: bool,
}

const HIGH: &[Activity] = &[
    Activity {
        name: "Stay in a safe indoor place",
        suggested: true,
    },
    Activity {
        name: "Travel outside",
        suggested: false,
    },
    Activity {
        name: "Watch for flooding on low roads",
        suggested: true,
    },
];

const MEDIUM: &[Activity] = &[
    Activity {
        name: "Bring an umbrella or raincoat",
        suggested: true,
    },
    Activity {
        name: "Walk carefully on slippery roads",
        suggested: true,
    },
    Activity {
        name: "Allow extra travel time",
        suggested: true,
    },
];

const LOW: &[Activity] = &[
    Activity {
        name: "Outdoor activities",
        suggested: true,
    },
    Activity {
        name: "Sports",
        suggested: true,
    },
    Activity {
        name: "Outdoor photography",
        suggested: true,
    },
];

/// The fixed activity list for `band`.
#[must_use]
pub const fn recommend_activities(band: SeverityBand) -> &'static [Activity] {
    match band {
        SeverityBand::High => HIGH,
        SeverityBand::Medium => MEDIUM,
        SeverityBand::Low => LOW,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_band_has_three_activities() {
        for band in [SeverityBand::High, SeverityBand::Medium, SeverityBand::Low] {
            assert_eq!(recommend_activities(band).len(), 3);
        }
    }

    #[test]
    fn high_band_discourages_travel() {
        assert!(
            recommend_activities(SeverityBand::High)
                .iter()
                .any(|a| !a.suggested)
        );
        assert!(
            recommend_activities(SeverityBand::Low)
                .iter()
                .all(|a| a.suggested)
        );
    }

    #[test]
    fn precipitation_bands() {
        assert_eq!(SeverityBand::from_precipitation(6.0), SeverityBand::High);
        assert_eq!(SeverityBand::from_precipitation(5.0), SeverityBand::Medium);
        assert_eq!(SeverityBand::from_precipitation(2.0), SeverityBand::Low);
    }

    #[test]
    fn category_bands() {
        assert_eq!(
            SeverityBand::from_category(RainCategory::Storm),
            SeverityBand::High
        );
        assert_eq!(
            SeverityBand::from_category(RainCategory::Heavy),
            SeverityBand::High
        );
        assert_eq!(
            SeverityBand::from_category(RainCategory::Moderate),
            SeverityBand::Medium
        );
        assert_eq!(
            SeverityBand::from_category(RainCategory::None),
            SeverityBand::Low
        );
    }
}
