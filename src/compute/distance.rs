//! Distance measures and the geographic bounds of a search circle.

use super::projection::{ProjectedRect, Projector};
use geo::{Distance, Haversine, Point};
use smallvec::SmallVec;
use std::f64::consts::{FRAC_PI_2, PI};
use tiergrid_types::units::{MEAN_EARTH_RADIUS_METERS, METERS_PER_MILE};

// Widens the angular radius so points exactly on the circle survive rounding.
const RADIUS_SLACK: f64 = 1e-9;

/// Straight-line distance in degree space, ignoring earth curvature.
pub fn planar_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    (lon2 - lon1).hypot(lat2 - lat1)
}

/// Great-circle distance in miles.
pub fn haversine_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    Haversine.distance(Point::new(lon1, lat1), Point::new(lon2, lat2)) / METERS_PER_MILE
}

/// Latitude/longitude box enclosing a search circle.
///
/// A circle crossing the antimeridian yields two longitude intervals; one
/// reaching a pole covers every longitude.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub lon_intervals: SmallVec<[(f64, f64); 2]>,
}

impl SearchBounds {
    /// Bounds of every point within `radius_miles` great-circle distance of the center.
    pub fn around(latitude: f64, longitude: f64, radius_miles: f64) -> Self {
        let delta = radius_miles * METERS_PER_MILE / MEAN_EARTH_RADIUS_METERS * (1.0 + RADIUS_SLACK);
        let lat = latitude.to_radians();
        let lon = longitude.to_radians();

        let min_lat = lat - delta;
        let max_lat = lat + delta;

        if min_lat <= -FRAC_PI_2 || max_lat >= FRAC_PI_2 {
            return Self {
                min_lat: min_lat.max(-FRAC_PI_2).to_degrees(),
                max_lat: max_lat.min(FRAC_PI_2).to_degrees(),
                lon_intervals: SmallVec::from_slice(&[(-180.0, 180.0)]),
            };
        }

        let delta_lon = (delta.sin() / lat.cos()).asin();
        let west = lon - delta_lon;
        let east = lon + delta_lon;

        let mut lon_intervals = SmallVec::new();
        if east - west >= 2.0 * PI {
            lon_intervals.push((-180.0, 180.0));
        } else if west < -PI {
            lon_intervals.push(((west + 2.0 * PI).to_degrees(), 180.0));
            lon_intervals.push((-180.0, east.to_degrees()));
        } else if east > PI {
            lon_intervals.push((west.to_degrees(), 180.0));
            lon_intervals.push((-180.0, (east - 2.0 * PI).to_degrees()));
        } else {
            lon_intervals.push((west.to_degrees(), east.to_degrees()));
        }

        Self {
            min_lat: min_lat.to_degrees(),
            max_lat: max_lat.to_degrees(),
            lon_intervals,
        }
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&latitude)
            && self
                .lon_intervals
                .iter()
                .any(|(west, east)| (*west..=*east).contains(&longitude))
    }

    /// Projected rectangles covering these bounds, one per longitude interval.
    pub fn project<P: Projector + ?Sized>(&self, projector: &P) -> SmallVec<[ProjectedRect; 2]> {
        self.lon_intervals
            .iter()
            .map(|(west, east)| projector.project_rect(self.min_lat, self.max_lat, *west, *east))
            .collect()
    }
}
