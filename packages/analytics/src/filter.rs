//! Time and category filtering.

use std::collections::BTreeSet;

use chrono::{FixedOffset, NaiveDate, NaiveTime};
use rain_map_observation_models::{FilterSpec, Observation, RainCategory};

use crate::AnalyticsError;

const DAY_MS: i64 = 86_400_000;

/// Keeps the observations selected by `spec`, preserving input order.
///
/// Bounds are inclusive. An empty category set selects nothing.
#[must_use]
pub fn filter(observations: &[Observation], spec: &FilterSpec) -> Vec<Observation> {
    observations
        .iter()
        .filter(|obs| spec.matches(obs))
        .cloned()
        .collect()
}

/// Builds a [`FilterSpec`] from `YYYY-MM-DD` date strings.
///
/// `from` becomes the first millisecond of that day and `to` the last
/// millisecond of that day, both in `tz`. Blank strings leave the side
/// open.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidDate`] if a date does not parse, or
/// [`AnalyticsError::InvalidRange`] if `from` is after `to`.
pub fn filter_spec_from_dates(
    from: Option<&str>,
    to: Option<&str>,
    categories: BTreeSet<RainCategory>,
    tz: FixedOffset,
) -> Result<FilterSpec, AnalyticsError> {
    let from = non_blank(from);
    let to = non_blank(to);

    let start_ms = from.map(|s| start_of_day_ms(s, tz)).transpose()?;
    let end_ms = to
        .map(|s| start_of_day_ms(s, tz).map(|start| start + DAY_MS - 1))
        .transpose()?;

    if let (Some(start), Some(end), Some(from), Some(to)) = (start_ms, end_ms, from, to)
        && start > end
    {
        return Err(AnalyticsError::InvalidRange {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    Ok(FilterSpec::default()
        .with_range(start_ms, end_ms)
        .with_categories(categories))
}

/// Parses a comma-separated category list.
///
/// Accepts canonical names (`HEAVY`) and form labels (`Hujan Lebat`).
/// Blank entries are ignored.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidCategory`] for the first entry that
/// matches no category.
pub fn parse_categories(list: &str) -> Result<BTreeSet<RainCategory>, AnalyticsError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            RainCategory::from_label(s).ok_or_else(|| AnalyticsError::InvalidCategory {
                input: s.to_string(),
            })
        })
        .collect()
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn start_of_day_ms(s: &str, tz: FixedOffset) -> Result<i64, AnalyticsError> {
    let invalid = || AnalyticsError::InvalidDate {
        input: s.to_string(),
    };
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| invalid())?;
    date.and_time(NaiveTime::MIN)
        .and_local_timezone(tz)
        .single()
        .map(|dt| dt.timestamp_millis())
        .ok_or_else(invalid)
}
