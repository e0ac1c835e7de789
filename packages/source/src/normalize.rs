//! Snapshot normalization.
//!
//! Turns a raw event-store snapshot (record ID → raw fields) into canonical
//! [`Observation`]s. Normalization never fails as a whole: malformed records
//! are dropped and counted, unknown categories are coerced and reported.

use chrono::{DateTime, Utc};
use rain_map_observation_models::{DataSource, HazardTag, Observation};
use serde::Serialize;
use serde_json::Value;

use crate::category_mapping::{CategoryMatch, map_rain_category};
use crate::parsing::{first_str, parse_coordinate, parse_epoch_ms};

const LATITUDE_KEYS: &[&str] = &["latitude", "lat"];
const LONGITUDE_KEYS: &[&str] = &["longitude", "lng", "lon"];
const CATEGORY_KEYS: &[&str] = &["intensity", "category"];
const HAZARD_KEYS: &[&str] = &["kategori", "hazard"];

/// Timestamps within a day of the latest representable instant are
/// rejected so they still convert to a local date in any fixed offset.
const DAY_MS: i64 = 86_400_000;

/// Why a record was rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ValidationFailure {
    /// The record was not a JSON object.
    NotAnObject,
    /// Latitude or longitude was missing or not a number.
    MissingCoordinates,
    /// Coordinates were numeric but outside WGS84 bounds.
    CoordinatesOutOfRange {
        /// Parsed latitude.
        latitude: f64,
        /// Parsed longitude.
        longitude: f64,
    },
    /// Timestamp was missing or unparseable.
    MissingTimestamp,
    /// Timestamp was before the epoch.
    NegativeTimestamp {
        /// Parsed timestamp.
        timestamp_ms: i64,
    },
    /// Timestamp was too far in the future to be a calendar date.
    TimestampOutOfRange {
        /// Parsed timestamp.
        timestamp_ms: i64,
    },
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "record is not an object"),
            Self::MissingCoordinates => write!(f, "missing or malformed coordinates"),
            Self::CoordinatesOutOfRange {
                latitude,
                longitude,
            } => write!(f, "coordinates out of range: ({latitude}, {longitude})"),
            Self::MissingTimestamp => write!(f, "missing or malformed timestamp"),
            Self::NegativeTimestamp { timestamp_ms } => {
                write!(f, "negative timestamp: {timestamp_ms}")
            }
            Self::TimestampOutOfRange { timestamp_ms } => {
                write!(f, "timestamp out of range: {timestamp_ms}")
            }
        }
    }
}

/// A recoverable problem found while normalizing one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum NormalizeIssue {
    /// The record was dropped.
    Validation {
        /// Record key.
        record_id: String,
        /// What was wrong with it.
        failure: ValidationFailure,
    },
    /// The category label was unknown and coerced to the default.
    UnknownCategory {
        /// Record key.
        record_id: String,
        /// The label as supplied.
        label: String,
    },
}

/// Counts and issues collected while normalizing a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeReport {
    /// Records turned into observations.
    pub accepted: usize,
    /// Records dropped for validation failures.
    pub dropped: usize,
    /// Records whose category label was coerced to the default.
    pub coerced: usize,
    /// Records whose supplied weight disagreed with their category.
    pub weight_mismatches: usize,
    /// Every dropped record and every coercion, in record order.
    pub issues: Vec<NormalizeIssue>,
}

impl NormalizeReport {
    /// Unknown-category warnings only.
    pub fn warnings(&self) -> impl Iterator<Item = &NormalizeIssue> {
        self.issues
            .iter()
            .filter(|issue| matches!(issue, NormalizeIssue::UnknownCategory { .. }))
    }

    fn reject(&mut self, record_id: &str, failure: ValidationFailure) {
        log::debug!("Dropping record {record_id}: {failure}");
        self.dropped += 1;
        self.issues.push(NormalizeIssue::Validation {
            record_id: record_id.to_string(),
            failure,
        });
    }
}

/// Result of normalizing a whole snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedSnapshot {
    /// Accepted observations, ordered by record ID.
    pub observations: Vec<Observation>,
    /// What happened along the way.
    pub report: NormalizeReport,
}

/// One accepted record plus the signals raised while normalizing it.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    /// The canonical observation.
    pub observation: Observation,
    /// The label that was coerced to the default, if any.
    pub unknown_label: Option<String>,
    /// Whether a supplied `weight` disagreed with the category.
    pub weight_mismatch: bool,
}

/// Normalizes a full snapshot from the event store.
///
/// Accepts an object keyed by record ID, an array (index keys, `null` holes
/// skipped) or `null` (empty store). Anything else counts as one rejected
/// record.
#[must_use]
pub fn normalize_snapshot(raw: &Value) -> NormalizedSnapshot {
    let mut records: Vec<(String, &Value)> = match raw {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        Value::Null => Vec::new(),
        _ => {
            let mut report = NormalizeReport::default();
            report.reject("<snapshot>", ValidationFailure::NotAnObject);
            return NormalizedSnapshot {
                observations: Vec::new(),
                report,
            };
        }
    };
    records.sort_by(|a, b| a.0.cmp(&b.0));

    let mut observations = Vec::with_capacity(records.len());
    let mut report = NormalizeReport::default();

    for (record_id, record) in records {
        match normalize_record(&record_id, record) {
            Ok(normalized) => {
                if let Some(label) = normalized.unknown_label {
                    log::warn!(
                        "Unknown rain category \"{label}\" on record {record_id}, using {}",
                        normalized.observation.category
                    );
                    report.coerced += 1;
                    report.issues.push(NormalizeIssue::UnknownCategory {
                        record_id: record_id.clone(),
                        label,
                    });
                }
                if normalized.weight_mismatch {
                    report.weight_mismatches += 1;
                }
                report.accepted += 1;
                observations.push(normalized.observation);
            }
            Err(failure) => report.reject(&record_id, failure),
        }
    }

    log::info!(
        "Normalized snapshot: {} accepted, {} dropped, {} coerced",
        report.accepted,
        report.dropped,
        report.coerced,
    );

    NormalizedSnapshot {
        observations,
        report,
    }
}

/// Normalizes a single raw record.
///
/// # Errors
///
/// Returns [`ValidationFailure`] if the record lacks usable coordinates or
/// a non-negative timestamp.
pub fn normalize_record(
    record_id: &str,
    record: &Value,
) -> Result<NormalizedRecord, ValidationFailure> {
    if !record.is_object() {
        return Err(ValidationFailure::NotAnObject);
    }

    // ── Coordinates ──────────────────────────────────────────────
    let latitude = coordinate(record, LATITUDE_KEYS);
    let longitude = coordinate(record, LONGITUDE_KEYS);
    let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
        return Err(ValidationFailure::MissingCoordinates);
    };
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(ValidationFailure::CoordinatesOutOfRange {
            latitude,
            longitude,
        });
    }

    // ── Timestamp ────────────────────────────────────────────────
    let timestamp_ms = record
        .get("timestamp")
        .and_then(parse_epoch_ms)
        .ok_or(ValidationFailure::MissingTimestamp)?;
    if timestamp_ms < 0 {
        return Err(ValidationFailure::NegativeTimestamp { timestamp_ms });
    }
    if DateTime::from_timestamp_millis(timestamp_ms).is_none()
        || timestamp_ms > DateTime::<Utc>::MAX_UTC.timestamp_millis() - DAY_MS
    {
        return Err(ValidationFailure::TimestampOutOfRange { timestamp_ms });
    }

    // ── Category ─────────────────────────────────────────────────
    let matched = map_rain_category(first_str(record, CATEGORY_KEYS));
    let category = matched.category();
    let unknown_label = match matched {
        CategoryMatch::Unknown(label) => Some(label),
        CategoryMatch::Known(_) | CategoryMatch::Missing => None,
    };

    let supplied_weight = record.get("weight").and_then(Value::as_f64);
    let weight_mismatch =
        supplied_weight.is_some_and(|w| (w - f64::from(category.weight())).abs() > f64::EPSILON);
    if weight_mismatch {
        log::debug!(
            "Record {record_id} supplied weight {supplied_weight:?} but {category} weighs {}",
            category.weight()
        );
    }

    // ── Optional fields ──────────────────────────────────────────
    let hazard = first_str(record, HAZARD_KEYS).and_then(HazardTag::from_text);

    let source = record
        .get("source")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<DataSource>().ok())
        .unwrap_or_default();

    let accuracy_m = record
        .get("accuracy")
        .and_then(parse_coordinate)
        .filter(|a| *a >= 0.0);

    let sensor_id = first_str(record, &["sensorId", "sensor_id"]).map(String::from);

    Ok(NormalizedRecord {
        observation: Observation {
            id: record_id.to_string(),
            latitude,
            longitude,
            category,
            hazard,
            timestamp_ms,
            source,
            accuracy_m,
            sensor_id,
        },
        unknown_label,
        weight_mismatch,
    })
}

/// Reads the first of `keys` present on the record. A later key is only
/// consulted when the earlier ones are absent, never when malformed.
fn coordinate(record: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .find_map(|key| record.get(*key))
        .and_then(parse_coordinate)
}
