//! Short-term outlook from the most recent reports.

use rain_map_analytics_models::Outlook;
use rain_map_observation_models::Observation;

/// Number of most recent reports considered by default.
pub const RECENT_WINDOW: usize = 10;

/// Classifies the `window` most recent observations.
///
/// Heavy and storm reports must outnumber both other groups for
/// [`Outlook::HeavyRainLikely`]; otherwise light and moderate reports must
/// outnumber dry ones for [`Outlook::LightRainLikely`].
#[must_use]
pub fn recent_outlook(observations: &[Observation], window: usize) -> Outlook {
    let mut recent: Vec<&Observation> = observations.iter().collect();
    recent.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms));
    recent.truncate(window);

    if recent.is_empty() {
        return Outlook::InsufficientData;
    }

    let (mut severe, mut light, mut clear) = (0_usize, 0_usize, 0_usize);
    for obs in recent {
        match obs.weight() {
            0 => clear += 1,
            1 | 2 => light += 1,
            _ => severe += 1,
        }
    }

    if severe > light && severe > clear {
        Outlook::HeavyRainLikely
    } else if light > clear {
        Outlook::LightRainLikely
    } else {
        Outlook::ClearExpected
    }
}

#[cfg(test)]
mod tests {
    use rain_map_observation_models::{DataSource, RainCategory};

    use super::*;

    fn obs(category: RainCategory, timestamp_ms: i64) -> Observation {
        Observation {
            id: timestamp_ms.to_string(),
            latitude: -7.79,
            longitude: 110.36,
            category,
            hazard: None,
            timestamp_ms,
            source: DataSource::Manual,
            accuracy_m: None,
            sensor_id: None,
        }
    }

    #[test]
    fn empty_is_insufficient() {
        assert_eq!(
            recent_outlook(&[], RECENT_WINDOW),
            Outlook::InsufficientData
        );
    }

    #[test]
    fn severe_majority_is_heavy() {
        let observations = vec![
            obs(RainCategory::Storm, 3),
            obs(RainCategory::Heavy, 2),
            obs(RainCategory::Light, 1),
        ];
        assert_eq!(
            recent_outlook(&observations, RECENT_WINDOW),
            Outlook::HeavyRainLikely
        );
    }

    #[test]
    fn severe_tie_falls_through() {
        let observations = vec![
            obs(RainCategory::Storm, 3),
            obs(RainCategory::Light, 2),
            obs(RainCategory::None, 1),
        ];
        assert_eq!(
            recent_outlook(&observations, RECENT_WINDOW),
            Outlook::ClearExpected
        );
    }

    #[test]
    fn light_over_clear_is_light() {
        let observations = vec![
            obs(RainCategory::Moderate, 3),
            obs(RainCategory::Light, 2),
            obs(RainCategory::None, 1),
        ];
        assert_eq!(
            recent_outlook(&observations, RECENT_WINDOW),
            Outlook::LightRainLikely
        );
    }

    #[test]
    fn only_most_recent_reports_count() {
        let mut observations: Vec<Observation> =
            (0..20).map(|t| obs(RainCategory::Storm, t)).collect();
        observations.extend((100..110).map(|t| obs(RainCategory::None, t)));
        assert_eq!(
            recent_outlook(&observations, RECENT_WINDOW),
            Outlook::ClearExpected
        );
    }
}
