#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Rule-based advisories and activity recommendations.
//!
//! Advisories come from a fixed cascade of threshold rules over the
//! current forecast hour and the summary statistics. Activity
//! recommendations are a static lookup keyed by [`SeverityBand`].

pub mod activity;
pub mod advisory;

pub use activity::{Activity, SeverityBand, recommend_activities};
pub use advisory::{Advisory, generate_insights};
