//! Configuration for a tiergrid proximity index.
//!
//! The two search radii fix the tier range once, when the index is opened.
//! Changing them for an index that already holds documents requires a full
//! reindex, because documents only carry box ids for the tiers that were
//! configured when they were written.
use crate::compute::tier::{self, DEFAULT_TIER_PREFIX};
use serde::de::Error;
use std::ops::RangeInclusive;
use std::path::PathBuf;

pub use tiergrid_types::units::DistanceUnit;

/// Index configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory holding the segment snapshot and commit log. `None` keeps everything in memory.
    #[serde(default)]
    pub storage_path: Option<PathBuf>,

    /// Largest radius the grid is tuned for; picks the coarsest tier.
    #[serde(default = "Config::default_max_search_radius")]
    pub max_search_radius_miles: f64,

    /// Smallest radius the grid is tuned for; picks the finest tier.
    #[serde(default = "Config::default_min_search_radius")]
    pub min_search_radius_miles: f64,

    /// Result-count ceiling for a single radius query.
    #[serde(default = "Config::default_max_results")]
    pub max_results: usize,

    /// First radius tried by nearest-neighbor search.
    #[serde(default = "Config::default_nearest_initial_radius")]
    pub nearest_initial_radius_miles: f64,

    /// Nearest-neighbor search gives up once the radius reaches this value.
    #[serde(default = "Config::default_nearest_radius_ceiling")]
    pub nearest_radius_ceiling_miles: f64,

    /// Prefix of the per-tier box id fields.
    #[serde(default = "Config::default_tier_field_prefix")]
    pub tier_field_prefix: String,
}

impl Config {
    const fn default_max_search_radius() -> f64 {
        10.0
    }

    const fn default_min_search_radius() -> f64 {
        1.0
    }

    const fn default_max_results() -> usize {
        100
    }

    const fn default_nearest_initial_radius() -> f64 {
        1.0
    }

    const fn default_nearest_radius_ceiling() -> f64 {
        20_000.0
    }

    fn default_tier_field_prefix() -> String {
        DEFAULT_TIER_PREFIX.to_string()
    }

    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = Some(path.into());
        self
    }

    pub fn in_memory(mut self) -> Self {
        self.storage_path = None;
        self
    }

    pub fn with_search_radii(mut self, min_miles: f64, max_miles: f64) -> Self {
        assert!(
            min_miles > 0.0 && min_miles <= max_miles,
            "Search radii must satisfy 0 < min <= max"
        );
        self.min_search_radius_miles = min_miles;
        self.max_search_radius_miles = max_miles;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        assert!(max_results > 0, "Max results must be greater than zero");
        self.max_results = max_results;
        self
    }

    pub fn with_nearest_search(mut self, initial_miles: f64, ceiling_miles: f64) -> Self {
        assert!(
            initial_miles > 0.0 && initial_miles <= ceiling_miles,
            "Nearest search radii must satisfy 0 < initial <= ceiling"
        );
        self.nearest_initial_radius_miles = initial_miles;
        self.nearest_radius_ceiling_miles = ceiling_miles;
        self
    }

    pub fn with_tier_field_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tier_field_prefix = prefix.into();
        self
    }

    /// Coarsest tier, fitted to the maximum search radius.
    pub fn start_tier(&self) -> u32 {
        tier::best_fit(self.max_search_radius_miles)
    }

    /// Finest tier, fitted to the minimum search radius.
    pub fn end_tier(&self) -> u32 {
        tier::best_fit(self.min_search_radius_miles)
    }

    pub fn tier_range(&self) -> RangeInclusive<u32> {
        self.start_tier()..=self.end_tier()
    }

    pub fn validate(&self) -> Result<(), String> {
        let radii = [
            ("max_search_radius_miles", self.max_search_radius_miles),
            ("min_search_radius_miles", self.min_search_radius_miles),
            ("nearest_initial_radius_miles", self.nearest_initial_radius_miles),
            ("nearest_radius_ceiling_miles", self.nearest_radius_ceiling_miles),
        ];
        for (name, value) in radii {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{} must be finite and positive, got {}", name, value));
            }
        }

        if self.min_search_radius_miles > self.max_search_radius_miles {
            return Err(format!(
                "min_search_radius_miles ({}) must be <= max_search_radius_miles ({})",
                self.min_search_radius_miles, self.max_search_radius_miles
            ));
        }

        if self.nearest_initial_radius_miles > self.nearest_radius_ceiling_miles {
            return Err(format!(
                "nearest_initial_radius_miles ({}) must be <= nearest_radius_ceiling_miles ({})",
                self.nearest_initial_radius_miles, self.nearest_radius_ceiling_miles
            ));
        }

        if self.max_results == 0 {
            return Err("max_results must be greater than zero".to_string());
        }

        if self.tier_field_prefix.is_empty() {
            return Err("tier_field_prefix must not be empty".to_string());
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_path: None,
            max_search_radius_miles: Self::default_max_search_radius(),
            min_search_radius_miles: Self::default_min_search_radius(),
            max_results: Self::default_max_results(),
            nearest_initial_radius_miles: Self::default_nearest_initial_radius(),
            nearest_radius_ceiling_miles: Self::default_nearest_radius_ceiling(),
            tier_field_prefix: Self::default_tier_field_prefix(),
        }
    }
}
