#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filtering, aggregation and trend analysis over rain observations.
//!
//! Every function here is pure: it takes an immutable observation slice
//! and returns a fresh value. Calendar-day grouping happens in a fixed
//! reference timezone supplied by the caller.

pub mod aggregate;
pub mod filter;
pub mod outlook;

pub use aggregate::{aggregate, daily_trend, highest_observed};
pub use filter::{filter, filter_spec_from_dates, parse_categories};
pub use outlook::{RECENT_WINDOW, recent_outlook};

use thiserror::Error;

/// Errors that can occur while building analytics inputs.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// A date string did not parse.
    #[error("Invalid date '{input}'. Expected format: YYYY-MM-DD")]
    InvalidDate {
        /// The rejected input.
        input: String,
    },

    /// The start of a range is after its end.
    #[error("Invalid range: {from} is after {to}")]
    InvalidRange {
        /// Range start as given.
        from: String,
        /// Range end as given.
        to: String,
    },

    /// A category name did not match any known category.
    #[error("Unknown rain category '{input}'")]
    InvalidCategory {
        /// The rejected input.
        input: String,
    },
}
