#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web JSON API server for the rain map.
//!
//! Serves the engine's derived view read-only, plus one endpoint to change
//! the active filter. A background task polls the event store and another
//! refreshes the hourly forecast.

mod handlers;

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use rain_map_engine::{RainMapConfig, RainMapEngine, refresh_forecast, run_ingest_loop};
use rain_map_forecast::OpenMeteoClient;
use rain_map_source::snapshot::HttpSnapshotSource;

/// How often the forecast is re-fetched.
const FORECAST_REFRESH: Duration = Duration::from_secs(30 * 60);

/// Shared application state.
pub struct AppState {
    /// Engine holding the current snapshot and derived view.
    pub engine: Arc<RainMapEngine>,
}

/// Registers the `/api` routes.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/categories", web::get().to(handlers::categories))
            .route("/observations", web::get().to(handlers::observations))
            .route("/stats", web::get().to(handlers::stats))
            .route("/radius", web::get().to(handlers::radius))
            .route("/insights", web::get().to(handlers::insights))
            .route("/trend", web::get().to(handlers::trend))
            .route("/forecast", web::get().to(handlers::forecast))
            .route("/filter", web::post().to(handlers::set_filter)),
    );
}

/// Starts the rain map API server.
///
/// Loads configuration, starts the snapshot polling and forecast refresh
/// tasks, and serves the API until the process is stopped. The caller
/// provides the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if configuration is invalid, the
/// HTTP clients cannot be built, or the server fails to bind.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = RainMapConfig::load().map_err(std::io::Error::other)?;
    let engine = Arc::new(RainMapEngine::from_config(&config).map_err(std::io::Error::other)?);

    spawn_ingest(&config, &engine)?;
    spawn_forecast_refresh(&config, &engine)?;

    let state = web::Data::new(AppState { engine });
    let bind_addr = config.server.bind_addr.clone();
    let port = config.server.port;

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_api)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}

fn spawn_ingest(config: &RainMapConfig, engine: &Arc<RainMapEngine>) -> std::io::Result<()> {
    let Some(url) = config.source.url.clone() else {
        log::warn!("No source URL configured; serving an empty snapshot");
        return Ok(());
    };

    let source = HttpSnapshotSource::new(url)
        .map_err(std::io::Error::other)?
        .with_max_retries(config.source.max_retries);
    let engine = Arc::clone(engine);
    let interval = Duration::from_secs(config.source.poll_interval_secs.max(1));

    actix_rt::spawn(async move {
        run_ingest_loop(&source, &engine, interval, std::future::pending()).await;
    });
    Ok(())
}

fn spawn_forecast_refresh(
    config: &RainMapConfig,
    engine: &Arc<RainMapEngine>,
) -> std::io::Result<()> {
    let client = OpenMeteoClient::from_config(&config.forecast).map_err(std::io::Error::other)?;
    let forecast_config = config.forecast.clone();
    let engine = Arc::clone(engine);

    actix_rt::spawn(async move {
        loop {
            refresh_forecast(&client, &forecast_config, &engine).await;
            tokio::time::sleep(FORECAST_REFRESH).await;
        }
    });
    Ok(())
}
