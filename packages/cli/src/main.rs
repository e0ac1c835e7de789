#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the rain map toolchain.

mod summary;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use rain_map_engine::{RainMapConfig, RainMapEngine, run_ingest_loop};
use rain_map_observation_models::RainCategory;
use rain_map_source::snapshot::HttpSnapshotSource;

#[derive(Parser)]
#[command(name = "rain_map", about = "Rain observation analytics tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a snapshot file as JSON
    Summary {
        /// Snapshot exported from the event store (JSON)
        #[arg(long)]
        snapshot: PathBuf,
        /// First day to include (YYYY-MM-DD, reference timezone)
        #[arg(long)]
        from: Option<String>,
        /// Last day to include (YYYY-MM-DD, reference timezone)
        #[arg(long)]
        to: Option<String>,
        /// Comma-separated categories to keep (e.g. "HEAVY,STORM" or "Badai")
        #[arg(long)]
        categories: Option<String>,
        /// Saved Open-Meteo response to use as the forecast
        #[arg(long, conflicts_with = "fetch_forecast")]
        forecast_file: Option<PathBuf>,
        /// Fetch the forecast from Open-Meteo
        #[arg(long)]
        fetch_forecast: bool,
    },
    /// List rain categories with their weights and colors
    Categories,
    /// Poll the event store and log each recomputed view until Ctrl-C
    Watch {
        /// Snapshot endpoint (overrides `RAIN_MAP_SOURCE_URL` and the config file)
        #[arg(long)]
        url: Option<String>,
        /// Seconds between polls
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let config = RainMapConfig::load()?;

    match cli.command {
        Commands::Summary {
            snapshot,
            from,
            to,
            categories,
            forecast_file,
            fetch_forecast,
        } => {
            let options = summary::SummaryOptions {
                snapshot,
                from,
                to,
                categories,
                forecast: match (forecast_file, fetch_forecast) {
                    (Some(path), _) => summary::ForecastInput::File(path),
                    (None, true) => summary::ForecastInput::Fetch,
                    (None, false) => summary::ForecastInput::None,
                },
            };
            let output = summary::run(&config, &options).await?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Categories => {
            println!("{:<10} {:<7} {:<14} COLOR", "NAME", "WEIGHT", "LABEL");
            println!("{}", "-".repeat(42));
            for category in RainCategory::all() {
                println!(
                    "{:<10} {:<7} {:<14} {}",
                    category.as_ref(),
                    category.weight(),
                    category.label(),
                    category.color()
                );
            }
        }
        Commands::Watch { url, interval } => {
            let Some(url) = url.or_else(|| config.source.url.clone()) else {
                return Err("no snapshot URL: pass --url or set RAIN_MAP_SOURCE_URL".into());
            };
            let interval =
                Duration::from_secs(interval.unwrap_or(config.source.poll_interval_secs).max(1));

            let engine = RainMapEngine::from_config(&config)?;
            let source =
                HttpSnapshotSource::new(url)?.with_max_retries(config.source.max_retries);

            run_ingest_loop(&source, &engine, interval, async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    log::error!("Failed to listen for Ctrl-C: {e}");
                }
            })
            .await;

            let view = engine.view();
            log::info!(
                "Last view: generation {}, {} observations, {} advisories",
                view.generation,
                view.filtered.len(),
                view.advisories.len()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn forecast_sources_are_exclusive() {
        let result = Cli::try_parse_from([
            "rain_map",
            "summary",
            "--snapshot",
            "points.json",
            "--forecast-file",
            "forecast.json",
            "--fetch-forecast",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_summary_filters() {
        let cli = Cli::try_parse_from([
            "rain_map",
            "summary",
            "--snapshot",
            "points.json",
            "--from",
            "2024-01-15",
            "--categories",
            "HEAVY,STORM",
        ])
        .unwrap();
        let Commands::Summary {
            from, categories, ..
        } = cli.command
        else {
            panic!("expected summary");
        };
        assert_eq!(from.as_deref(), Some("2024-01-15"));
        assert_eq!(categories.as_deref(), Some("HEAVY,STORM"));
    }
}
