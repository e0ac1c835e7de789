#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Open-Meteo forecast fetching and merging for the rain map.
//!
//! [`open_meteo::OpenMeteoClient`] pulls an hourly precipitation and cloud
//! cover series for one fixed point. [`merge::merge_forecast`] picks out
//! the sample that applies right now. A failed fetch is never fatal:
//! callers treat it as "forecast unavailable".

pub mod merge;
pub mod open_meteo;

pub use merge::merge_forecast;
pub use open_meteo::{OpenMeteoClient, parse_hourly};

use rain_map_source::SourceError;
use thiserror::Error;

/// Errors that can occur while obtaining a forecast.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The request failed or returned something other than JSON.
    #[error("Forecast request failed: {0}")]
    Source(#[from] SourceError),

    /// The response did not have the expected shape.
    #[error("Forecast parse error: {message}")]
    Parse {
        /// Description of what went wrong.
        message: String,
    },

    /// The feed answered but had no usable samples.
    #[error("Forecast unavailable: {message}")]
    Unavailable {
        /// Description of what went wrong.
        message: String,
    },
}
