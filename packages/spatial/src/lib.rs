#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Density-adaptive radius estimation.
//!
//! Picks one circle radius for every observation on the map from how
//! tightly the observations cluster: the mean nearest-neighbor distance
//! over a fixed-size sample is bucketed into three discrete bands. No
//! zoom or viewport information is involved.

use rain_map_observation_models::Observation;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

/// Mean Earth radius used for great-circle distances, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Maximum number of points whose nearest neighbor is measured.
pub const DENSITY_SAMPLE_SIZE: usize = 30;

/// Radius returned when density cannot be measured.
pub const DEFAULT_RADIUS_M: f64 = 1000.0;

/// Anything with a WGS84 position.
pub trait GeoPoint {
    /// Latitude in degrees.
    fn latitude(&self) -> f64;
    /// Longitude in degrees.
    fn longitude(&self) -> f64;
}

impl GeoPoint for Observation {
    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl GeoPoint for (f64, f64) {
    fn latitude(&self) -> f64 {
        self.0
    }

    fn longitude(&self) -> f64 {
        self.1
    }
}

impl<T: GeoPoint> GeoPoint for &T {
    fn latitude(&self) -> f64 {
        (*self).latitude()
    }

    fn longitude(&self) -> f64 {
        (*self).longitude()
    }
}

/// Discrete density tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RadiusBand {
    /// Mean nearest-neighbor distance under 300 m.
    Dense,
    /// Mean nearest-neighbor distance under 500 m.
    Moderate,
    /// Everything else, including unmeasurable input.
    Sparse,
}

impl RadiusBand {
    /// Buckets a mean nearest-neighbor distance (meters).
    #[must_use]
    pub fn from_mean_distance(mean_m: f64) -> Self {
        if mean_m < 300.0 {
            Self::Dense
        } else if mean_m < 500.0 {
            Self::Moderate
        } else {
            Self::Sparse
        }
    }

    /// Circle radius for this band, in meters.
    #[must_use]
    pub const fn radius_m(self) -> f64 {
        match self {
            Self::Dense => 500.0,
            Self::Moderate => 700.0,
            Self::Sparse => DEFAULT_RADIUS_M,
        }
    }
}

/// Great-circle distance between two points, in meters.
#[must_use]
pub fn haversine_distance_m(a: &impl GeoPoint, b: &impl GeoPoint) -> f64 {
    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let dlat = (b.latitude() - a.latitude()).to_radians();
    let dlon = (b.longitude() - a.longitude()).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Mean nearest-neighbor distance over the first [`DENSITY_SAMPLE_SIZE`]
/// points, measured against the full set.
///
/// Zero distances (the point itself or a co-located duplicate) are not
/// neighbors. Samples without any positive distance are skipped. Returns
/// `None` when no sample produced a distance.
#[must_use]
pub fn mean_nearest_neighbor_m<P: GeoPoint>(points: &[P]) -> Option<f64> {
    let mut sum = 0.0;
    let mut measured = 0_u32;

    for sample in points.iter().take(DENSITY_SAMPLE_SIZE) {
        let nearest = points
            .iter()
            .map(|other| haversine_distance_m(sample, other))
            .filter(|d| *d > 0.0)
            .fold(f64::INFINITY, f64::min);

        if nearest.is_finite() {
            sum += nearest;
            measured += 1;
        }
    }

    (measured > 0).then(|| sum / f64::from(measured))
}

/// Band for a set of points; [`RadiusBand::Sparse`] when density cannot be
/// measured.
#[must_use]
pub fn estimate_band<P: GeoPoint>(points: &[P]) -> RadiusBand {
    mean_nearest_neighbor_m(points).map_or(RadiusBand::Sparse, RadiusBand::from_mean_distance)
}

/// Single display radius (meters) for every point in `points`.
///
/// Empty input, or input where every point is co-located, yields
/// [`DEFAULT_RADIUS_M`].
#[must_use]
pub fn estimate_radius<P: GeoPoint>(points: &[P]) -> f64 {
    let band = estimate_band(points);
    log::debug!(
        "Estimated radius {} m ({band}) from {} points",
        band.radius_m(),
        points.len()
    );
    band.radius_m()
}
