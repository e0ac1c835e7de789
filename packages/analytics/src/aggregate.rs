//! Summary statistics over a filtered observation set.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate};
use rain_map_analytics_models::{AggregateStats, CategoryCount, DailySeverityPoint, PeakDay};
use rain_map_observation_models::{Observation, RainCategory};

#[derive(Default, Clone, Copy)]
struct DayTally {
    weight_sum: u64,
    count: u64,
}

impl DayTally {
    #[allow(clippy::cast_precision_loss)]
    fn mean(self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.weight_sum as f64 / self.count as f64
        }
    }
}

/// Computes totals, category counts, mean severity and the peak day.
///
/// The mean severity only counts observations with a positive weight, so
/// dry reports do not dilute it. Per-day means count every observation on
/// that day.
#[must_use]
pub fn aggregate(observations: &[Observation], tz: FixedOffset) -> AggregateStats {
    if observations.is_empty() {
        return AggregateStats::empty();
    }

    let mut counts = [0_u64; 5];
    let mut positive = DayTally::default();

    for obs in observations {
        counts[usize::from(obs.weight())] += 1;
        if obs.weight() > 0 {
            positive.weight_sum += u64::from(obs.weight());
            positive.count += 1;
        }
    }

    let category_counts = RainCategory::all()
        .iter()
        .map(|&category| CategoryCount {
            category,
            count: counts[usize::from(category.weight())],
        })
        .collect();

    let mut peak_day: Option<PeakDay> = None;
    for (date, tally) in group_by_day(observations, tz) {
        let mean = tally.mean();
        if peak_day.is_none_or(|peak| mean > peak.average_severity) {
            peak_day = Some(PeakDay {
                date,
                average_severity: mean,
            });
        }
    }

    AggregateStats {
        total: observations.len() as u64,
        average_severity: positive.mean(),
        category_counts,
        peak_day,
    }
}

/// The observation with the highest weight; the first one wins ties.
#[must_use]
pub fn highest_observed(observations: &[Observation]) -> Option<&Observation> {
    observations.iter().fold(None, |best, obs| match best {
        Some(current) if current.weight() >= obs.weight() => Some(current),
        _ => Some(obs),
    })
}

/// Per-day mean severity and count, oldest day first.
#[must_use]
pub fn daily_trend(observations: &[Observation], tz: FixedOffset) -> Vec<DailySeverityPoint> {
    group_by_day(observations, tz)
        .into_iter()
        .map(|(date, tally)| DailySeverityPoint {
            date,
            average_severity: tally.mean(),
            count: tally.count,
        })
        .collect()
}

fn group_by_day(observations: &[Observation], tz: FixedOffset) -> BTreeMap<NaiveDate, DayTally> {
    let mut days: BTreeMap<NaiveDate, DayTally> = BTreeMap::new();
    for obs in observations {
        let Some(date) = local_date(obs.timestamp_ms, tz) else {
            log::debug!("Observation {} has an unrepresentable timestamp", obs.id);
            continue;
        };
        let tally = days.entry(date).or_default();
        tally.weight_sum += u64::from(obs.weight());
        tally.count += 1;
    }
    days
}

fn local_date(timestamp_ms: i64, tz: FixedOffset) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(timestamp_ms)?
        .naive_utc()
        .checked_add_offset(tz)
        .map(|local| local.date())
}
