//! Cartesian tier grid.
//!
//! A tier is one zoom level of a uniform grid laid over the projected plane.
//! Tier `n` splits every 180 projected degrees into `2^n` cells, so each step
//! up halves the cell size and every cell at tier `n + 1` nests inside exactly
//! one cell at tier `n`. Documents carry one box id per configured tier, which
//! lets a radius query test grid membership at a handful of tiers instead of
//! measuring distance to every stored point.
//!
//! ```text
//! tier 1 (cell = 90°)        tier 2 (cell = 45°)
//! ┌────────┬────────┐        ┌────┬────┬────┬────┐
//! │ (-1,0) │ (0,0)  │        │    │    │(0,1)│(1,1)│
//! │        │        │   ->   ├────┼────┼────┼────┤
//! │        │        │        │    │    │(0,0)│(1,0)│
//! └────────┴────────┘        └────┴────┴────┴────┘
//! ```

use super::projection::{ProjectedRect, Projector, SinusoidalProjector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use tiergrid_types::units::DistanceUnit;

/// Field name prefix used when none is configured.
pub const DEFAULT_TIER_PREFIX: &str = "_localTier";

/// `best_fit` never returns a tier finer than this (about one mile of granularity).
pub const MAX_BEST_FIT_TIER: u32 = 15;

/// Finest tier whose column indices still fit in an `i32`.
pub const MAX_TIER_LEVEL: u32 = 29;

const GRID_SPAN_DEGREES: f64 = 180.0;

/// Identifier of one grid cell at one tier.
///
/// Ordering is column-major, which lets a store answer a column of cells with
/// a single range scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoxId {
    pub column: i32,
    pub row: i32,
}

impl BoxId {
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Pack into a single integer: column in the high half, row in the low half.
    pub const fn packed(self) -> i64 {
        ((self.column as i64) << 32) | (self.row as u32 as i64)
    }

    pub const fn from_packed(packed: i64) -> Self {
        Self {
            column: (packed >> 32) as i32,
            row: packed as i32,
        }
    }
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.column, self.row)
    }
}

impl FromStr for BoxId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, row) = s
            .split_once(':')
            .ok_or_else(|| format!("box id '{}' is not of the form column:row", s))?;
        let column = column
            .parse()
            .map_err(|e| format!("invalid box column in '{}': {}", s, e))?;
        let row = row
            .parse()
            .map_err(|e| format!("invalid box row in '{}': {}", s, e))?;
        Ok(Self { column, row })
    }
}

/// Rectangular block of cells at one tier, inclusive on both axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxRange {
    pub columns: RangeInclusive<i32>,
    pub rows: RangeInclusive<i32>,
}

impl BoxRange {
    pub fn new(columns: RangeInclusive<i32>, rows: RangeInclusive<i32>) -> Self {
        Self { columns, rows }
    }

    pub fn contains(&self, id: &BoxId) -> bool {
        self.columns.contains(&id.column) && self.rows.contains(&id.row)
    }

    pub fn column_count(&self) -> u64 {
        span(&self.columns)
    }

    pub fn box_count(&self) -> u64 {
        span(&self.columns) * span(&self.rows)
    }

    /// Every box in the range, column by column.
    pub fn iter(&self) -> impl Iterator<Item = BoxId> + '_ {
        self.columns
            .clone()
            .flat_map(move |column| self.rows.clone().map(move |row| BoxId { column, row }))
    }
}

fn span(range: &RangeInclusive<i32>) -> u64 {
    if range.is_empty() {
        0
    } else {
        (*range.end() as i64 - *range.start() as i64 + 1) as u64
    }
}

/// Tier whose grid suits a search of `radius_miles`.
///
/// This is the coarsest tier whose cells are no wider than the radius,
/// `ceil(log2(circumference / (2 * radius)))`. A cell spans
/// `circumference / 2^(tier + 1)` at the equator, so one tier coarser the
/// cells are wider than the radius. The query covers the circle's whole
/// bounding box at every tier, so the cell width never drops a match.
///
/// Larger radii give coarser (smaller) tiers. The result is capped at
/// [`MAX_BEST_FIT_TIER`], whose cells can be wider than a very small radius.
///
/// ```
/// use tiergrid::compute::tier::best_fit;
///
/// assert_eq!(best_fit(10.0), 11);
/// assert_eq!(best_fit(1.0), 14);
/// assert!(best_fit(100.0) < best_fit(10.0));
/// ```
pub fn best_fit(radius_miles: f64) -> u32 {
    best_fit_in(radius_miles, DistanceUnit::Miles)
}

/// [`best_fit`] for a radius expressed in `unit`: the coarsest tier whose
/// cells are no wider than `range` in that unit.
pub fn best_fit_in(range: f64, unit: DistanceUnit) -> u32 {
    let times = unit.earth_circumference() / (2.0 * range);
    let fit = times.log2().ceil();
    if fit.is_nan() {
        return MAX_BEST_FIT_TIER;
    }
    fit.clamp(0.0, MAX_BEST_FIT_TIER as f64) as u32
}

/// Name of the document field that holds the box id for `tier`.
pub fn field_name_for(prefix: &str, tier: u32) -> String {
    format!("{}{}", prefix, tier)
}

/// Computes box ids for one tier level.
#[derive(Debug, Clone)]
pub struct TierPlotter<P = SinusoidalProjector> {
    tier_level: u32,
    tier_length: u32,
    cell_size: f64,
    projector: P,
    field_name: String,
}

impl TierPlotter<SinusoidalProjector> {
    /// Plotter for `tier_level` with the sinusoidal projection and default prefix.
    pub fn sinusoidal(tier_level: u32) -> Self {
        Self::new(tier_level, SinusoidalProjector, DEFAULT_TIER_PREFIX)
    }
}

impl<P: Projector> TierPlotter<P> {
    /// # Panics
    ///
    /// Panics if `tier_level` exceeds [`MAX_TIER_LEVEL`].
    pub fn new(tier_level: u32, projector: P, field_prefix: &str) -> Self {
        assert!(
            tier_level <= MAX_TIER_LEVEL,
            "Tier level must be at most {}",
            MAX_TIER_LEVEL
        );

        let tier_length = 1u32 << tier_level;
        Self {
            tier_level,
            tier_length,
            cell_size: GRID_SPAN_DEGREES / tier_length as f64,
            projector,
            field_name: field_name_for(field_prefix, tier_level),
        }
    }

    pub fn tier_level(&self) -> u32 {
        self.tier_level
    }

    /// Cells per 180 projected degrees.
    pub fn tier_length(&self) -> u32 {
        self.tier_length
    }

    /// Edge length of one cell in projected degrees.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn projector(&self) -> &P {
        &self.projector
    }

    pub fn tier_field_name(&self) -> &str {
        &self.field_name
    }

    /// Box containing the given position at this tier.
    pub fn tier_box_id(&self, latitude: f64, longitude: f64) -> BoxId {
        let (x, y) = self.projector.project(latitude, longitude);
        BoxId {
            column: self.cell_index(x),
            row: self.cell_index(y),
        }
    }

    /// Block of boxes touching a projected rectangle.
    pub fn covering(&self, rect: &ProjectedRect) -> BoxRange {
        BoxRange {
            columns: self.cell_index(rect.min_x)..=self.cell_index(rect.max_x),
            rows: self.cell_index(rect.min_y)..=self.cell_index(rect.max_y),
        }
    }

    // `as` saturates and maps NaN to zero, so garbage input still lands in a cell.
    fn cell_index(&self, coord: f64) -> i32 {
        (coord / self.cell_size).floor() as i32
    }
}
