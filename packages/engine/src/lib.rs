#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Snapshot store and derived view for the rain map.
//!
//! [`RainMapEngine`] owns the current observation snapshot, filter and
//! forecast. Any change recomputes a [`DerivedView`] that readers pick up
//! with [`RainMapEngine::view`]. Snapshots are replaced wholesale by
//! swapping an [`Arc`], so a reader never sees a half-updated collection.

pub mod config;
pub mod ingest;
pub mod view;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, FixedOffset, Utc};
use rain_map_forecast::ForecastError;
use rain_map_forecast_models::ForecastSample;
use rain_map_observation_models::{FilterSpec, Observation};
use rain_map_source::SourceError;
use rain_map_source::normalize::{NormalizeReport, normalize_snapshot};
use thiserror::Error;

pub use config::{ConfigError, RainMapConfig};
pub use ingest::{poll_once, refresh_forecast, run_ingest_loop};
pub use view::{DerivedView, ViewInputs};

/// Errors surfaced by engine setup and polling.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration was invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The snapshot source failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The forecast feed failed.
    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

/// One normalized snapshot of the event store.
#[derive(Debug, Clone, Default)]
pub struct ObservationSnapshot {
    /// Accepted observations, ordered by record ID.
    pub observations: Vec<Observation>,
    /// Normalization counts and issues.
    pub report: NormalizeReport,
    /// When the snapshot was swapped in.
    pub received_at: Option<DateTime<Utc>>,
}

/// Holds the current inputs and the last published [`DerivedView`].
pub struct RainMapEngine {
    tz: FixedOffset,
    forecast_window: usize,
    snapshot: RwLock<Arc<ObservationSnapshot>>,
    filter: RwLock<FilterSpec>,
    forecast: RwLock<Option<Arc<[ForecastSample]>>>,
    view: RwLock<Arc<DerivedView>>,
    generation: AtomicU64,
}

impl RainMapEngine {
    /// Creates an engine with an empty snapshot and the default filter.
    #[must_use]
    pub fn new(tz: FixedOffset, forecast_window: usize) -> Self {
        let filter = FilterSpec::default();
        let initial = DerivedView::compute(&ViewInputs {
            generation: 0,
            observations: &[],
            filter: &filter,
            forecast: None,
            now: Utc::now(),
            tz,
            forecast_window,
        });

        Self {
            tz,
            forecast_window,
            snapshot: RwLock::new(Arc::new(ObservationSnapshot::default())),
            filter: RwLock::new(filter),
            forecast: RwLock::new(None),
            view: RwLock::new(Arc::new(initial)),
            generation: AtomicU64::new(0),
        }
    }

    /// Creates an engine from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if the timezone offset is invalid.
    pub fn from_config(config: &RainMapConfig) -> Result<Self, EngineError> {
        Ok(Self::new(config.timezone()?, config.forecast.window_hours))
    }

    /// The reference timezone for calendar days.
    #[must_use]
    pub const fn timezone(&self) -> FixedOffset {
        self.tz
    }

    /// The last published view.
    #[must_use]
    pub fn view(&self) -> Arc<DerivedView> {
        Arc::clone(&self.view.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// The current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ObservationSnapshot> {
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// The active filter.
    #[must_use]
    pub fn filter_spec(&self) -> FilterSpec {
        self.filter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Normalizes a raw snapshot, swaps it in and recomputes.
    pub fn replace_snapshot(&self, raw: &serde_json::Value) -> Arc<DerivedView> {
        let normalized = normalize_snapshot(raw);
        let snapshot = Arc::new(ObservationSnapshot {
            observations: normalized.observations,
            report: normalized.report,
            received_at: Some(Utc::now()),
        });

        log::debug!(
            "Swapping in snapshot with {} observations",
            snapshot.observations.len()
        );
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
        self.recompute()
    }

    /// Replaces the filter and recomputes.
    pub fn set_filter(&self, spec: FilterSpec) -> Arc<DerivedView> {
        *self.filter.write().unwrap_or_else(PoisonError::into_inner) = spec;
        self.recompute()
    }

    /// Replaces the forecast series (`None` when unavailable) and
    /// recomputes.
    pub fn set_forecast(&self, series: Option<Vec<ForecastSample>>) -> Arc<DerivedView> {
        *self.forecast.write().unwrap_or_else(PoisonError::into_inner) = series.map(Arc::from);
        self.recompute()
    }

    fn recompute(&self) -> Arc<DerivedView> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = self.snapshot();
        let filter = self.filter_spec();
        let forecast = self
            .forecast
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let view = DerivedView::compute(&ViewInputs {
            generation,
            observations: &snapshot.observations,
            filter: &filter,
            forecast: forecast.as_deref(),
            now: Utc::now(),
            tz: self.tz,
            forecast_window: self.forecast_window,
        });

        self.publish(Arc::new(view))
    }

    /// Stores `view` unless a newer generation is already published.
    /// Returns whichever view is current afterwards.
    fn publish(&self, view: Arc<DerivedView>) -> Arc<DerivedView> {
        let mut slot = self.view.write().unwrap_or_else(PoisonError::into_inner);
        if slot.generation > view.generation {
            log::debug!(
                "Discarding stale view generation {} (current {})",
                view.generation,
                slot.generation
            );
            return Arc::clone(&slot);
        }
        *slot = Arc::clone(&view);
        view
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rain_map_analytics_models::Outlook;
    use rain_map_observation_models::RainCategory;
    use serde_json::json;

    use super::*;

    fn engine() -> RainMapEngine {
        RainMapEngine::new(FixedOffset::east_opt(7 * 3600).unwrap(), 12)
    }

    fn raw() -> serde_json::Value {
        json!({
            "a": {"latitude": -7.79, "longitude": 110.36, "intensity": "Badai", "timestamp": 1_000},
            "b": {
                "latitude": -7.79,
                "longitude": 110.3605,
                "intensity": "Hujan Ringan",
                "timestamp": 2_000
            },
            "c": {"latitude": "bad", "longitude": 110.36, "timestamp": 3_000},
        })
    }

    #[test]
    fn starts_empty() {
        let engine = engine();
        let view = engine.view();
        assert_eq!(view.generation, 0);
        assert!(view.filtered.is_empty());
        assert_eq!(view.outlook, Outlook::InsufficientData);
    }

    #[test]
    fn replace_snapshot_recomputes() {
        let engine = engine();
        let view = engine.replace_snapshot(&raw());
        assert_eq!(view.generation, 1);
        assert_eq!(view.filtered.len(), 2);
        assert_eq!(engine.snapshot().report.dropped, 1);
        assert!(engine.snapshot().received_at.is_some());
        assert_eq!(engine.view().generation, 1);
    }

    #[test]
    fn replacing_snapshot_is_wholesale() {
        let engine = engine();
        engine.replace_snapshot(&raw());
        let view = engine.replace_snapshot(&json!(null));
        assert!(view.filtered.is_empty());
        assert!(engine.snapshot().observations.is_empty());
    }

    #[test]
    fn readers_keep_their_snapshot() {
        let engine = engine();
        engine.replace_snapshot(&raw());
        let held = engine.snapshot();
        engine.replace_snapshot(&json!(null));
        assert_eq!(held.observations.len(), 2);
    }

    #[test]
    fn filter_change_recomputes() {
        let engine = engine();
        engine.replace_snapshot(&raw());
        let view = engine.set_filter(FilterSpec::default().with_categories([RainCategory::Storm]));
        assert_eq!(view.filtered.len(), 1);
        assert_eq!(view.filtered[0].id, "a");
        assert_eq!(engine.filter_spec().categories.len(), 1);
    }

    #[test]
    fn forecast_change_recomputes() {
        let engine = engine();
        let series = vec![ForecastSample {
            time: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            precipitation_mm: 7.0,
            cloud_cover_pct: 10.0,
            temperature_c: Some(25.0),
        }];
        let view = engine.set_forecast(Some(series));
        assert!(view.current_forecast.is_some());
        assert_eq!(view.forecast_window.len(), 1);

        let view = engine.set_forecast(None);
        assert!(view.current_forecast.is_none());
        assert!(view.advisories.is_empty());
    }

    #[test]
    fn stale_generation_is_not_published() {
        let engine = engine();
        engine.replace_snapshot(&raw());
        engine.set_filter(FilterSpec::default());
        let current = engine.view();
        assert_eq!(current.generation, 2);

        let mut stale = (*current).clone();
        stale.generation = 1;
        stale.filtered.clear();
        let published = engine.publish(Arc::new(stale));
        assert_eq!(published.generation, 2);
        assert_eq!(engine.view().filtered.len(), 2);
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        let engine = Arc::new(engine());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || {
                    engine.replace_snapshot(&raw());
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let view = engine.view();
        assert_eq!(view.generation, 4);
        assert_eq!(view.filtered.len(), 2);
    }
}
