//! Proximity search over point-located entities using a cartesian tier grid.
//!
//! Entities are projected with a sinusoidal projection and assigned one grid
//! box per tier. Radius queries become exact-match filters over box ids, so
//! they never scan every stored point.
//!
//! ```rust
//! use tiergrid::{Entity, ProximityIndex};
//!
//! let index: ProximityIndex = ProximityIndex::memory()?;
//! index.insert(&Entity::new("1", "Jakarta", -6.2088, 106.8456))?;
//!
//! let nearby = index.find_within_radius(-6.2, 106.84, 5.0)?;
//! assert_eq!(nearby.len(), 1);
//! # Ok::<(), tiergrid::TierGridError>(())
//! ```

pub mod builder;
pub mod compute;
pub mod config;
pub mod db;
pub mod error;
pub mod storage;

pub use builder::IndexBuilder;
pub use config::{Config, DistanceUnit};
pub use db::{EntityWriter, ProximityIndex, ProximityQuery};
pub use error::{Result, TierGridError};

pub use compute::{
    BoxId, BoxRange, ProjectedRect, Projector, SearchBounds, SinusoidalProjector, TierPlotter,
    best_fit, best_fit_in, haversine_miles, planar_distance,
};

pub use storage::{Document, FieldValue, Filter, IndexStore, StoreStats};

pub use tiergrid_types::entity::{Entity, Locatable};

pub use geo::Point;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{IndexBuilder, ProximityIndex, Result, TierGridError};

    pub use crate::{Config, DistanceUnit};

    pub use crate::{Entity, Locatable};

    pub use crate::compute::{best_fit, haversine_miles};

    pub use geo::Point;
}
