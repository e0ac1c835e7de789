//! `summary` subcommand: one-shot derived view over a snapshot file.

use std::path::PathBuf;

use rain_map_analytics::{filter_spec_from_dates, parse_categories};
use rain_map_engine::{DerivedView, RainMapConfig, RainMapEngine, refresh_forecast};
use rain_map_forecast::{OpenMeteoClient, parse_hourly};
use rain_map_observation_models::RainCategory;
use rain_map_source::SnapshotSource;
use rain_map_source::normalize::NormalizeReport;
use rain_map_source::snapshot::FileSnapshotSource;
use serde::Serialize;

/// Where the forecast for a summary comes from.
pub enum ForecastInput {
    None,
    File(PathBuf),
    Fetch,
}

pub struct SummaryOptions {
    pub snapshot: PathBuf,
    pub from: Option<String>,
    pub to: Option<String>,
    pub categories: Option<String>,
    pub forecast: ForecastInput,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryOutput {
    pub normalization: NormalizeReport,
    pub view: DerivedView,
}

/// Loads the snapshot, applies the filter and forecast, and returns the
/// resulting view.
///
/// # Errors
///
/// Returns an error if the snapshot or forecast file cannot be read, or
/// the filter arguments are invalid.
pub async fn run(
    config: &RainMapConfig,
    options: &SummaryOptions,
) -> Result<SummaryOutput, Box<dyn std::error::Error>> {
    let engine = RainMapEngine::from_config(config)?;

    let raw = FileSnapshotSource::new(&options.snapshot)
        .fetch_snapshot()
        .await?;
    engine.replace_snapshot(&raw);

    let categories = match options.categories.as_deref() {
        Some(list) => parse_categories(list)?,
        None => RainCategory::all().iter().copied().collect(),
    };
    engine.set_filter(filter_spec_from_dates(
        options.from.as_deref(),
        options.to.as_deref(),
        categories,
        engine.timezone(),
    )?);

    match &options.forecast {
        ForecastInput::None => {}
        ForecastInput::File(path) => {
            let body: serde_json::Value =
                serde_json::from_str(&tokio::fs::read_to_string(path).await?)?;
            engine.set_forecast(Some(parse_hourly(body)?));
        }
        ForecastInput::Fetch => {
            let client = OpenMeteoClient::from_config(&config.forecast)?;
            refresh_forecast(&client, &config.forecast, &engine).await;
        }
    }

    Ok(SummaryOutput {
        normalization: engine.snapshot().report.clone(),
        view: (*engine.view()).clone(),
    })
}
