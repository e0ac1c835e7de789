//! Polling loop feeding the engine from a snapshot source.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rain_map_forecast::OpenMeteoClient;
use rain_map_forecast_models::ForecastConfig;
use rain_map_source::{SnapshotSource, SourceError};
use tokio::time::MissedTickBehavior;

use crate::{DerivedView, RainMapEngine};

/// Fetches one snapshot and swaps it into the engine.
///
/// # Errors
///
/// Returns [`SourceError`] if the fetch fails. The engine keeps its
/// previous snapshot in that case.
pub async fn poll_once<S: SnapshotSource + ?Sized>(
    source: &S,
    engine: &RainMapEngine,
) -> Result<Arc<DerivedView>, SourceError> {
    let raw = source.fetch_snapshot().await?;
    let view = engine.replace_snapshot(&raw);
    log::info!(
        "[{}] {} observations, {} after filter, radius {} m",
        source.name(),
        engine.snapshot().observations.len(),
        view.filtered.len(),
        view.radius,
    );
    Ok(view)
}

/// Fetches the forecast and hands it to the engine.
///
/// A failed fetch clears the forecast so stale hours are not shown as
/// current; the error is logged, never returned.
pub async fn refresh_forecast(
    client: &OpenMeteoClient,
    config: &ForecastConfig,
    engine: &RainMapEngine,
) -> Arc<DerivedView> {
    match client.fetch_hourly(config).await {
        Ok(series) => engine.set_forecast(Some(series)),
        Err(e) => {
            log::warn!("Forecast unavailable: {e}");
            engine.set_forecast(None)
        }
    }
}

/// Polls `source` every `interval` until `shutdown` resolves.
///
/// The first poll happens immediately. Failed polls are logged and leave
/// the last good snapshot in place.
pub async fn run_ingest_loop<S, F>(
    source: &S,
    engine: &RainMapEngine,
    interval: Duration,
    shutdown: F,
) where
    S: SnapshotSource + ?Sized,
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    log::info!(
        "Polling {} every {}s",
        source.name(),
        interval.as_secs_f64()
    );

    loop {
        tokio::select! {
            () = &mut shutdown => {
                log::info!("Stopping ingest loop for {}", source.name());
                break;
            }
            _ = ticker.tick() => {
                if let Err(e) = poll_once(source, engine).await {
                    log::error!("[{}] poll failed, keeping previous snapshot: {e}", source.name());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::FixedOffset;
    use serde_json::json;

    use super::*;

    /// Serves one good snapshot, then fails every time.
    struct FlakySource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SnapshotSource for FlakySource {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn fetch_snapshot(&self) -> Result<serde_json::Value, SourceError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(json!({
                    "a": {
                        "latitude": -7.79,
                        "longitude": 110.36,
                        "intensity": "Hujan Sedang",
                        "timestamp": 1_000
                    },
                }))
            } else {
                Err(SourceError::Unavailable {
                    message: "offline".to_string(),
                })
            }
        }
    }

    fn engine() -> RainMapEngine {
        RainMapEngine::new(FixedOffset::east_opt(7 * 3600).unwrap(), 12)
    }

    #[tokio::test]
    async fn poll_once_swaps_snapshot() {
        let source = FlakySource {
            calls: AtomicUsize::new(0),
        };
        let engine = engine();
        let view = poll_once(&source, &engine).await.unwrap();
        assert_eq!(view.filtered.len(), 1);
        assert!(poll_once(&source, &engine).await.is_err());
        assert_eq!(engine.view().filtered.len(), 1);
    }

    #[tokio::test]
    async fn loop_keeps_last_good_snapshot() {
        let source = FlakySource {
            calls: AtomicUsize::new(0),
        };
        let engine = engine();
        run_ingest_loop(
            &source,
            &engine,
            Duration::from_millis(5),
            tokio::time::sleep(Duration::from_millis(60)),
        )
        .await;
        assert!(source.calls.load(Ordering::SeqCst) >= 2);
        assert_eq!(engine.snapshot().observations.len(), 1);
        assert_eq!(engine.view().filtered.len(), 1);
    }

    #[tokio::test]
    async fn loop_stops_on_shutdown() {
        let source = FlakySource {
            calls: AtomicUsize::new(0),
        };
        let engine = engine();
        run_ingest_loop(&source, &engine, Duration::from_secs(3600), async {}).await;
        assert!(source.calls.load(Ordering::SeqCst) <= 1);
    }
}
