//! Map projections used to lay a uniform grid over the globe.

use std::fmt::Debug;

/// Axis-aligned rectangle in projected coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedRect {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

/// Maps latitude/longitude (degrees) onto a plane suitable for grid tiling.
pub trait Projector: Debug + Send + Sync {
    /// Project a single position. Must be pure and must not panic, even for
    /// out-of-range input.
    fn project(&self, latitude: f64, longitude: f64) -> (f64, f64);

    /// Smallest projected rectangle containing every position with latitude in
    /// `[min_lat, max_lat]` and longitude in `[min_lon, max_lon]`.
    fn project_rect(&self, min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64)
    -> ProjectedRect;
}

/// Sinusoidal projection: `x = lon · cos(lat)`, `y = lat`, in degrees.
///
/// # Examples
///
/// ```
/// use tiergrid::compute::projection::{Projector, SinusoidalProjector};
///
/// let (x, y) = SinusoidalProjector.project(60.0, 100.0);
/// assert!((x - 50.0).abs() < 1e-9);
/// assert_eq!(y, 60.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinusoidalProjector;

impl Projector for SinusoidalProjector {
    fn project(&self, latitude: f64, longitude: f64) -> (f64, f64) {
        (longitude * latitude.to_radians().cos(), latitude)
    }

    fn project_rect(
        &self,
        min_lat: f64,
        max_lat: f64,
        min_lon: f64,
        max_lon: f64,
    ) -> ProjectedRect {
        // x is linear in lon for a fixed cos(lat), so the extremes sit at the
        // extreme cosines of the latitude band.
        let cos_a = min_lat.to_radians().cos();
        let cos_b = max_lat.to_radians().cos();
        let cos_min = cos_a.min(cos_b);
        let cos_max = if min_lat <= 0.0 && max_lat >= 0.0 {
            1.0
        } else {
            cos_a.max(cos_b)
        };

        ProjectedRect {
            min_x: (min_lon * cos_min).min(min_lon * cos_max),
            max_x: (max_lon * cos_min).max(max_lon * cos_max),
            min_y: min_lat,
            max_y: max_lat,
        }
    }
}
