use serde::{Deserialize, Serialize};

/// Mean earth radius used for great-circle distances, in meters.
pub const MEAN_EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Meters in one statute mile.
pub const METERS_PER_MILE: f64 = 1_609.344;

/// Distance unit for radii and tier fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Miles,
    Kilometers,
}

impl DistanceUnit {
    /// Equatorial circumference used to size tier grids.
    pub const fn earth_circumference(self) -> f64 {
        match self {
            DistanceUnit::Miles => 24_902.0,
            DistanceUnit::Kilometers => 40_076.0,
        }
    }

    pub const fn meters_per_unit(self) -> f64 {
        match self {
            DistanceUnit::Miles => METERS_PER_MILE,
            DistanceUnit::Kilometers => 1_000.0,
        }
    }

    pub fn from_meters(self, meters: f64) -> f64 {
        meters / self.meters_per_unit()
    }

    pub fn to_meters(self, value: f64) -> f64 {
        value * self.meters_per_unit()
    }

    /// Convert `value` expressed in `self` into `target`.
    pub fn convert(self, value: f64, target: DistanceUnit) -> f64 {
        target.from_meters(self.to_meters(value))
    }
}
